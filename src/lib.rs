//! shimgen scans annotated C++ headers and emits a JavaScript `ffi()` wrapper
//! table together with a C++ export shim that registers every wrapper in a
//! hashed name to pointer map.

pub mod cli;
pub mod emit;
pub mod generator;
pub mod normalize;
pub mod scanner;
pub mod sink;
pub mod source;

pub use generator::{ExportSummary, GenerateError, GeneratedArtifacts, Generator};
pub use scanner::{HeaderScan, ScanError, Scanner};
pub use sink::{ArtifactSink, FsSink, MemorySink};
pub use source::{FsHeaderSource, HeaderFile, HeaderSource, MemoryHeaderSource};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
