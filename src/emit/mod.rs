//! Renderers for the two generated artifacts.

pub mod native;
pub mod registry;
pub mod script;

pub use native::NativeEmitter;
pub use registry::{RegistryAssembler, include_path};
pub use script::ScriptEmitter;
