use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use shimgen_ffi::{BindingConfig, ExportRegistry};

const MAP_TYPE: &str = "std::unordered_map<uint32_t, void*>";

/// Wraps the rendered export bodies in the includes and the registration
/// routine that fills the runtime's hashed name to pointer map.
#[derive(Clone, Debug)]
pub struct RegistryAssembler<'a> {
    config: &'a BindingConfig,
}

impl<'a> RegistryAssembler<'a> {
    pub const fn new(config: &'a BindingConfig) -> Self {
        Self { config }
    }

    pub fn assemble(&self, registry: &ExportRegistry, bodies: &str) -> String {
        let mut out = String::with_capacity(bodies.len() + 512);
        let symbol = &self.config.registry_symbol;

        let _ = writeln!(out, "{}", self.config.banner);
        out.push_str("#include <unordered_map>\n");
        let shim_dir = absolute(&self.config.native_output_dir);
        for header in registry.headers() {
            let _ = writeln!(out, "#include \"{}\"", include_path(header, &shim_dir));
        }
        let _ = writeln!(out, "extern {MAP_TYPE}* {symbol};");

        out.push_str(bodies);

        let _ = writeln!(out, "void {}() {{", self.config.registration_fn_name());
        let _ = writeln!(out, "    {MAP_TYPE}& apiMap = *{symbol};");
        for function in registry.functions() {
            let _ = writeln!(
                out,
                "    apiMap[std::hash<std::string>()(\"{function}\")] = (void*){function};"
            );
        }
        out.push_str("}\n");

        out
    }
}

/// Header path as seen from the directory holding the generated shim, with
/// forward slashes so the include is portable.
pub fn include_path(header: &Path, shim_dir: &Path) -> String {
    let header = absolute(header);
    let relative = pathdiff::diff_paths(&header, shim_dir).unwrap_or(header);
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
