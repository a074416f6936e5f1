//! Binding model shared by the shimgen scanner and emitters.
//!
//! A scanned header declaration is classified once into a normalized C++
//! type and then mapped twice: once for the script-side `ffi("...")`
//! signature and once for the flat native export signature.

pub mod metadata;
pub mod policy;
pub mod symbol_registry;
pub mod types;

pub use metadata::{
    BindingConfig, MarkerConfig, VectorConfig, VectorShape, load_binding_config,
    validate_identifier,
};
pub use policy::{NativePolicy, ScriptPolicy, TypePolicy};
pub use symbol_registry::{ExportCollision, ExportRegistry};
pub use types::{
    CppType, DeclOrigin, Decoration, HeaderDeclaration, MappedParameter, NormalizedParameter,
    RawParameter, TypeClassifier, TypeKind,
};
