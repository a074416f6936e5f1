use std::fmt::Write as _;

use shimgen_ffi::{HeaderDeclaration, ScriptPolicy, TypeClassifier, TypePolicy};

/// Renders the JavaScript wrapper table, one `ffi()` call per entry.
#[derive(Clone, Debug)]
pub struct ScriptEmitter<'a> {
    namespace: &'a str,
    classifier: &'a TypeClassifier,
}

impl<'a> ScriptEmitter<'a> {
    pub const fn new(namespace: &'a str, classifier: &'a TypeClassifier) -> Self {
        Self {
            namespace,
            classifier,
        }
    }

    const fn namespaced(&self) -> bool {
        !self.namespace.is_empty()
    }

    pub fn render_prologue(&self, out: &mut String) {
        if self.namespaced() {
            let _ = writeln!(out, "let {} = {{", self.namespace);
        }
    }

    pub fn render_epilogue(&self, out: &mut String) {
        if self.namespaced() {
            out.push_str("};\n");
        }
    }

    /// The signature string handed to `ffi()`, e.g.
    /// `void Foo_setX(void*, float)`.
    pub fn ffi_signature(&self, decl: &HeaderDeclaration) -> String {
        let return_type = ScriptPolicy.map_return(&self.classifier.classify(&decl.return_type));
        let param_types = decl
            .parameters
            .iter()
            .map(|param| ScriptPolicy.map_type(&self.classifier.classify(&param.ty)))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{return_type} {}({param_types})", decl.function_name)
    }

    pub fn render_entry(&self, decl: &HeaderDeclaration, out: &mut String) {
        let values = decl
            .parameters
            .iter()
            .map(|param| param.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        let _ = writeln!(out, "{}: function({values}) {{", decl.function_name);
        let _ = writeln!(out, "    let f = ffi(\"{}\");", self.ffi_signature(decl));
        let _ = writeln!(out, "    return f({values});");
        out.push_str(if self.namespaced() { "},\n" } else { "}\n" });
    }
}
