use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::Serialize;

/// Pointer or reference marker written against the parameter name
/// (`int *out`, `Foo &foo`) rather than the type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Decoration {
    None,
    Pointer,
    Reference,
}

impl Decoration {
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Pointer => "*",
            Self::Reference => "&",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawParameter {
    pub declared_type: String,
    pub name: String,
    pub decoration: Decoration,
}

impl RawParameter {
    /// Folds the decoration into the type, yielding e.g. `const std::string&`.
    pub fn normalize(self) -> NormalizedParameter {
        let mut ty = self.declared_type;
        ty.push_str(self.decoration.suffix());
        NormalizedParameter::new(ty, self.name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NormalizedParameter {
    #[serde(rename = "type")]
    pub ty: String,
    pub name: String,
}

pub const VECTOR_LANES: [&str; 3] = ["vec_x", "vec_y", "vec_z"];

impl NormalizedParameter {
    pub fn new(ty: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            ty: ty.into(),
            name: name.into(),
        }
    }

    /// Lane index (x = 0, y = 1, z = 2) when this is a scalar produced by
    /// vector expansion.
    pub fn vector_lane(&self) -> Option<usize> {
        if self.ty != "float" {
            return None;
        }
        VECTOR_LANES.iter().position(|lane| *lane == self.name)
    }
}

/// A parameter as seen by one policy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MappedParameter {
    pub mapped_type: String,
    pub call_value: String,
    /// Owning-pointer wrapper to rebuild around `call_value` at the call site.
    pub reconstruct: Option<String>,
}

impl MappedParameter {
    /// `type name` as written in a parameter list.
    pub fn declaration(&self) -> String {
        format!("{} {}", self.mapped_type, self.call_value)
    }

    /// The expression forwarded to the wrapped native call.
    pub fn call_argument(&self) -> String {
        match &self.reconstruct {
            Some(wrapper) => format!("{wrapper}({})", self.call_value),
            None => self.call_value.clone(),
        }
    }
}

/// Where a declaration came from, for diagnostics and dumps.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DeclOrigin {
    pub header: PathBuf,
    pub line: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HeaderDeclaration {
    pub class_name: Option<String>,
    pub is_static: bool,
    pub return_type: String,
    /// Export name: `Class_method` for instance methods, bare otherwise.
    pub function_name: String,
    /// Name of the native function or method being forwarded to.
    pub method_name: String,
    pub parameters: Vec<NormalizedParameter>,
    pub origin: DeclOrigin,
}

impl HeaderDeclaration {
    pub fn export_name(class_name: Option<&str>, method_name: &str, is_static: bool) -> String {
        match class_name {
            Some(class) if !is_static => format!("{class}_{method_name}"),
            _ => method_name.to_string(),
        }
    }

    pub const fn is_instance_method(&self) -> bool {
        self.class_name.is_some() && !self.is_static
    }

    /// The implicit `Class* ptr` parameter of an instance method.
    pub fn receiver(&self) -> Option<&NormalizedParameter> {
        if self.is_instance_method() {
            self.parameters.first()
        } else {
            None
        }
    }

    /// Parameters forwarded to the native call, i.e. all but the receiver.
    pub fn forwarded_parameters(&self) -> &[NormalizedParameter] {
        if self.is_instance_method() && !self.parameters.is_empty() {
            &self.parameters[1..]
        } else {
            &self.parameters
        }
    }
}

/// Classification of a normalized C++ type spelling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeKind {
    Void,
    /// `std::string` by value or reference.
    StdString,
    /// `char*` and `const char*`.
    CString,
    Integer,
    /// A designated enum-like name passed as an integer on the script side.
    IntLike,
    /// `FooPtr` or `SharedPtr<Foo>`, with the wrapper spelling to rebuild and
    /// the raw pointee.
    OwningPointer { wrapper: String, pointee: String },
    Pointer { pointee: String, is_const: bool },
    /// A spelling that embeds an owning pointer without being one
    /// (`TexturePtr*`, `std::vector<TexturePtr>`). Crosses both boundaries
    /// as `void*` and is cast back to `target` at the call site.
    Opaque { target: String, by_value: bool },
    Scalar,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CppType {
    pub spelling: String,
    pub kind: TypeKind,
}

impl CppType {
    pub const fn is_void(&self) -> bool {
        matches!(self.kind, TypeKind::Void)
    }
}

const INTEGER_WORDS: &[&str] = &["signed", "unsigned", "short", "long", "int"];

const INTEGER_ALIASES: &[&str] = &[
    "size_t", "ssize_t", "ptrdiff_t", "intptr_t", "uintptr_t", "int8_t", "int16_t", "int32_t",
    "int64_t", "uint8_t", "uint16_t", "uint32_t", "uint64_t",
];

pub const DEFAULT_INT_LIKE_TYPES: &[&str] = &["Layer2D", "LightType", "BlendMode"];

/// Turns type spellings into [`CppType`]s. Owns the set of enum-like names
/// that cross the script boundary as integers.
#[derive(Clone, Debug)]
pub struct TypeClassifier {
    int_like: BTreeSet<String>,
}

impl Default for TypeClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_INT_LIKE_TYPES.iter().copied())
    }
}

impl TypeClassifier {
    pub fn new<I, S>(int_like: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            int_like: int_like.into_iter().map(Into::into).collect(),
        }
    }

    pub fn classify(&self, spelling: &str) -> CppType {
        let spelling = tidy_type(spelling);
        let kind = self.kind_of(&spelling);
        CppType { spelling, kind }
    }

    fn kind_of(&self, spelling: &str) -> TypeKind {
        if spelling == "void" {
            return TypeKind::Void;
        }

        let unqualified = spelling.trim_end_matches('&').trim();
        let is_const = unqualified.starts_with("const ");
        let unqualified = unqualified.strip_prefix("const ").unwrap_or(unqualified);
        let base = unqualified.trim_end_matches('*').trim();
        let depth = unqualified.len() - unqualified.trim_end_matches('*').len();

        if depth == 0 && base == "std::string" {
            return TypeKind::StdString;
        }
        if depth == 1 && base == "char" {
            return TypeKind::CString;
        }
        if depth > 0 && embeds_owning_pointer(base) {
            return TypeKind::Opaque {
                target: unqualified.to_string(),
                by_value: false,
            };
        }
        if depth > 0 {
            let pointee = unqualified[..unqualified.len() - 1].trim().to_string();
            return TypeKind::Pointer { pointee, is_const };
        }
        if let Some(kind) = owning_pointer(base) {
            return kind;
        }
        if embeds_owning_pointer(base) {
            return TypeKind::Opaque {
                target: format!("{base}*"),
                by_value: true,
            };
        }
        if is_integer(base) {
            return TypeKind::Integer;
        }
        if self.int_like.contains(base) {
            return TypeKind::IntLike;
        }
        TypeKind::Scalar
    }
}

fn owning_pointer(base: &str) -> Option<TypeKind> {
    if let Some((wrapper, rest)) = base.split_once('<') {
        let pointee = rest.strip_suffix('>')?.trim();
        if wrapper.ends_with("Ptr") && !pointee.is_empty() {
            return Some(TypeKind::OwningPointer {
                wrapper: base.to_string(),
                pointee: pointee.to_string(),
            });
        }
        return None;
    }
    let pointee = base.strip_suffix("Ptr")?;
    if pointee.is_empty() || pointee.ends_with("::") {
        return None;
    }
    Some(TypeKind::OwningPointer {
        wrapper: base.to_string(),
        pointee: pointee.to_string(),
    })
}

fn embeds_owning_pointer(spelling: &str) -> bool {
    spelling
        .split(|ch: char| !(ch.is_ascii_alphanumeric() || ch == '_'))
        .any(|word| word.len() > "Ptr".len() && word.ends_with("Ptr"))
}

fn is_integer(base: &str) -> bool {
    let base = base.strip_prefix("std::").unwrap_or(base);
    if INTEGER_ALIASES.contains(&base) {
        return true;
    }
    let mut words = base.split_whitespace().peekable();
    words.peek().is_some() && words.all(|word| INTEGER_WORDS.contains(&word))
}

/// Collapses whitespace and glues `*`/`&` to the preceding token, so
/// `const char *` and `const char*` compare equal.
pub fn tidy_type(spelling: &str) -> String {
    let mut out = String::with_capacity(spelling.len());
    for word in spelling.split_whitespace() {
        let glue = word.starts_with(['*', '&']) || out.is_empty();
        if !glue {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}
