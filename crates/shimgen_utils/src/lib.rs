//! Shared plumbing for the shimgen workspace: source spans, diagnostics,
//! logging setup and phase timing.

pub mod errors;
pub mod logger;
pub mod profiler;
pub mod span;

pub use errors::{Diagnostic, DiagnosticSeverity, emit_diagnostic, emit_diagnostics};
pub use profiler::{PhaseTiming, Profiler};
pub use span::Span;
