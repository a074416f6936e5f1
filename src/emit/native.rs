use std::fmt::Write as _;

use std::collections::BTreeSet;

use shimgen_ffi::{HeaderDeclaration, NativePolicy, TypeClassifier, TypePolicy, VectorConfig};
use tracing::{debug, warn};

/// Renders one flat C++ export function per class member declaration. Free
/// functions get no wrapper: their registry entry points at the native
/// function itself.
#[derive(Clone, Debug)]
pub struct NativeEmitter<'a> {
    classifier: &'a TypeClassifier,
    vectors: &'a VectorConfig,
}

impl<'a> NativeEmitter<'a> {
    pub const fn new(classifier: &'a TypeClassifier, vectors: &'a VectorConfig) -> Self {
        Self {
            classifier,
            vectors,
        }
    }

    pub fn render_function(&self, decl: &HeaderDeclaration, out: &mut String) {
        let Some(callee) = Self::callee(decl) else {
            debug!(export = %decl.function_name, "free function registered without a wrapper");
            return;
        };

        let repeated = repeated_parameter_names(decl);
        if !repeated.is_empty() {
            warn!(
                export = %decl.function_name,
                names = ?repeated,
                "parameter names repeat; the exported signature will not compile"
            );
        }

        let return_type = self.classifier.classify(&decl.return_type);
        let params = decl
            .parameters
            .iter()
            .map(|param| {
                NativePolicy
                    .map_parameter(&self.classifier.classify(&param.ty), &param.name)
                    .declaration()
            })
            .collect::<Vec<_>>()
            .join(", ");
        let return_kw = if return_type.is_void() { "" } else { "return " };

        let _ = writeln!(
            out,
            "{} {}({params}) {{",
            NativePolicy.map_return(&return_type),
            decl.function_name
        );
        let _ = writeln!(
            out,
            "    {return_kw}{callee}({});",
            self.call_arguments(decl).join(", ")
        );
        out.push_str("}\n");
    }

    fn callee(decl: &HeaderDeclaration) -> Option<String> {
        let class = decl.class_name.as_ref()?;
        Some(match decl.receiver() {
            Some(receiver) => format!("{}->{}", receiver.name, decl.method_name),
            None => format!("{class}::{}", decl.method_name),
        })
    }

    /// Arguments forwarded to the native call. The receiver is excluded,
    /// vector lanes are folded back into one constructor call and owning
    /// pointers are rewrapped.
    pub fn call_arguments(&self, decl: &HeaderDeclaration) -> Vec<String> {
        let mut args = Vec::new();
        let mut lanes: Vec<&str> = Vec::new();

        for param in decl.forwarded_parameters() {
            match param.vector_lane() {
                Some(0) => {
                    self.flush_vector(decl, &mut lanes, &mut args);
                    lanes.push(&param.name);
                }
                Some(_) => lanes.push(&param.name),
                None => {
                    self.flush_vector(decl, &mut lanes, &mut args);
                    let mapped =
                        NativePolicy.map_parameter(&self.classifier.classify(&param.ty), &param.name);
                    args.push(mapped.call_argument());
                }
            }
        }
        self.flush_vector(decl, &mut lanes, &mut args);

        args
    }

    fn flush_vector(&self, decl: &HeaderDeclaration, lanes: &mut Vec<&str>, args: &mut Vec<String>) {
        if lanes.is_empty() {
            return;
        }
        match self.vectors.constructor_for(lanes.len()) {
            Some(constructor) => args.push(format!("{constructor}({})", lanes.join(", "))),
            None => warn!(
                export = %decl.function_name,
                lanes = lanes.len(),
                "vector type not supported; dropping the argument"
            ),
        }
        lanes.clear();
    }
}

/// Parameter names used more than once, e.g. by two expanded vectors.
pub fn repeated_parameter_names(decl: &HeaderDeclaration) -> Vec<&str> {
    let mut seen = BTreeSet::new();
    let mut repeated = BTreeSet::new();
    for param in &decl.parameters {
        if !seen.insert(param.name.as_str()) {
            repeated.insert(param.name.as_str());
        }
    }
    repeated.into_iter().collect()
}
