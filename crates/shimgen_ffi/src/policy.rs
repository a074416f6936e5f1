//! The two type mapping policies.
//!
//! Both are total over [`TypeKind`]. The script policy is intentionally lossy:
//! it only describes the calling convention the `ffi()` bridge must use. The
//! native policy has to produce types that are legal in a flat exported
//! function signature and still convert back at the call site.

use crate::types::{CppType, MappedParameter, TypeKind};

/// Suffix appended to parameters that must be rewrapped in their owning
/// pointer before the real call.
pub const OWNING_SUFFIX: &str = "_sp";

pub trait TypePolicy {
    fn map_type(&self, ty: &CppType) -> String;

    fn map_return(&self, ty: &CppType) -> String {
        self.map_type(ty)
    }

    fn map_parameter(&self, ty: &CppType, name: &str) -> MappedParameter {
        MappedParameter {
            mapped_type: self.map_type(ty),
            call_value: name.to_string(),
            reconstruct: None,
        }
    }
}

/// Policy A: the `ffi("ret name(args)")` signature vocabulary.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScriptPolicy;

impl ScriptPolicy {
    pub const VOCABULARY: [&'static str; 3] = ["char*", "void*", "int"];
}

impl TypePolicy for ScriptPolicy {
    fn map_type(&self, ty: &CppType) -> String {
        match &ty.kind {
            TypeKind::StdString | TypeKind::CString => "char*".to_string(),
            TypeKind::Pointer { .. }
            | TypeKind::OwningPointer { .. }
            | TypeKind::Opaque { .. } => "void*".to_string(),
            TypeKind::Integer | TypeKind::IntLike => "int".to_string(),
            TypeKind::Void | TypeKind::Scalar => ty.spelling.clone(),
        }
    }
}

/// Policy B: types for the generated C++ export function.
#[derive(Clone, Copy, Debug, Default)]
pub struct NativePolicy;

impl NativePolicy {
    fn collapse_pointer(ty: &CppType) -> Option<String> {
        match &ty.kind {
            TypeKind::OwningPointer { pointee, .. } => Some(format!("{pointee}*")),
            TypeKind::Opaque {
                by_value: false, ..
            } => Some("void*".to_string()),
            TypeKind::Pointer { pointee, is_const } if *is_const && pointee == "void" => {
                Some("void*".to_string())
            }
            _ => None,
        }
    }
}

impl TypePolicy for NativePolicy {
    fn map_type(&self, ty: &CppType) -> String {
        if let Some(collapsed) = Self::collapse_pointer(ty) {
            return collapsed;
        }
        match ty.kind {
            TypeKind::StdString => "char*".to_string(),
            TypeKind::Opaque { .. } => "void*".to_string(),
            _ => ty.spelling.clone(),
        }
    }

    /// Returns only go through the pointer collapse; strings are returned as
    /// declared.
    fn map_return(&self, ty: &CppType) -> String {
        Self::collapse_pointer(ty).unwrap_or_else(|| ty.spelling.clone())
    }

    fn map_parameter(&self, ty: &CppType, name: &str) -> MappedParameter {
        let mapped_type = self.map_type(ty);
        match &ty.kind {
            TypeKind::OwningPointer { wrapper, .. } => MappedParameter {
                mapped_type,
                call_value: format!("{name}{OWNING_SUFFIX}"),
                reconstruct: Some(wrapper.clone()),
            },
            TypeKind::Opaque { target, by_value } => MappedParameter {
                mapped_type,
                call_value: name.to_string(),
                reconstruct: Some(format!(
                    "{}static_cast<{target}>",
                    if *by_value { "*" } else { "" }
                )),
            },
            _ => MappedParameter {
                mapped_type,
                call_value: name.to_string(),
                reconstruct: None,
            },
        }
    }
}
