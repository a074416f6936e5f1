use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::types::{DEFAULT_INT_LIKE_TYPES, TypeClassifier};

pub const DEFAULT_BEGIN_MARKER: &str = "[JS_BINDING_BEGIN]";
pub const DEFAULT_END_MARKER: &str = "[JS_BINDING_END]";
pub const DEFAULT_REGISTRY_SYMBOL: &str = "g_APIMap";
pub const DEFAULT_BANNER: &str = "// Generated by shimgen";

#[derive(Clone, Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    api: Option<String>,
    #[serde(default)]
    namespace: Option<String>,
    #[serde(default)]
    headers: RawHeaders,
    #[serde(default)]
    output: RawOutput,
    #[serde(default)]
    markers: Option<MarkerConfig>,
    #[serde(default)]
    vectors: Option<VectorConfig>,
    #[serde(default)]
    int_like_types: Option<Vec<String>>,
    #[serde(default)]
    registry_symbol: Option<String>,
    #[serde(default)]
    banner: Option<String>,
    #[serde(default)]
    strict: bool,
}

#[derive(Clone, Debug, Deserialize, Default)]
struct RawHeaders {
    root: Option<String>,
    #[serde(default)]
    exclude: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, Default)]
struct RawOutput {
    script: Option<String>,
    native_dir: Option<String>,
}

/// Begin and end annotations bounding an export region. Matched as bare
/// substrings anywhere in a line.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct MarkerConfig {
    pub begin: String,
    pub end: String,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            begin: DEFAULT_BEGIN_MARKER.to_string(),
            end: DEFAULT_END_MARKER.to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct VectorShape {
    /// Substring identifying the aggregate parameter type (`Vector3`).
    #[serde(rename = "match")]
    pub pattern: String,
    /// Constructor used to rebuild it in the native shim (`Vector3f`).
    pub constructor: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct VectorConfig {
    pub vec2: VectorShape,
    pub vec3: VectorShape,
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            vec2: VectorShape {
                pattern: "Vector2".to_string(),
                constructor: "Vector2f".to_string(),
            },
            vec3: VectorShape {
                pattern: "Vector3".to_string(),
                constructor: "Vector3f".to_string(),
            },
        }
    }
}

impl VectorConfig {
    /// Number of scalar lanes for an aggregate parameter, if it is one.
    pub fn arity_of(&self, parameter: &str) -> Option<usize> {
        if parameter.contains(&self.vec2.pattern) {
            Some(2)
        } else if parameter.contains(&self.vec3.pattern) {
            Some(3)
        } else {
            None
        }
    }

    pub fn constructor_for(&self, arity: usize) -> Option<&str> {
        match arity {
            2 => Some(&self.vec2.constructor),
            3 => Some(&self.vec3.constructor),
            _ => None,
        }
    }
}

/// Everything one generation run needs to know.
#[derive(Clone, Debug)]
pub struct BindingConfig {
    pub api_name: String,
    /// Empty disables the wrapping object literal in the script output.
    pub namespace: String,
    pub header_root: PathBuf,
    pub excludes: Vec<PathBuf>,
    /// Either a `.js` file or the directory that receives `<api>.js`.
    pub script_output: PathBuf,
    pub native_output_dir: PathBuf,
    pub markers: MarkerConfig,
    pub vectors: VectorConfig,
    pub int_like_types: Vec<String>,
    pub registry_symbol: String,
    pub banner: String,
    pub strict: bool,
}

impl BindingConfig {
    pub fn new(api_name: impl Into<String>) -> Self {
        Self {
            api_name: api_name.into(),
            namespace: String::new(),
            header_root: PathBuf::from("."),
            excludes: Vec::new(),
            script_output: PathBuf::from("."),
            native_output_dir: PathBuf::from("."),
            markers: MarkerConfig::default(),
            vectors: VectorConfig::default(),
            int_like_types: DEFAULT_INT_LIKE_TYPES
                .iter()
                .map(ToString::to_string)
                .collect(),
            registry_symbol: DEFAULT_REGISTRY_SYMBOL.to_string(),
            banner: DEFAULT_BANNER.to_string(),
            strict: false,
        }
    }

    fn from_raw(raw: RawConfig, base_dir: &Path) -> Result<Self> {
        let Some(api_name) = raw.api.filter(|name| !name.trim().is_empty()) else {
            bail!("binding config is missing the `api` identifier");
        };
        validate_identifier(&api_name).context("invalid `api` identifier")?;

        let mut config = Self::new(api_name);
        if let Some(namespace) = raw.namespace {
            config.namespace = namespace;
        }
        if let Some(root) = raw.headers.root {
            config.header_root = resolve_path(base_dir, &root);
        }
        config.excludes = raw
            .headers
            .exclude
            .iter()
            .map(|dir| resolve_path(base_dir, dir))
            .collect();
        if let Some(script) = raw.output.script {
            config.script_output = resolve_path(base_dir, &script);
        }
        if let Some(native_dir) = raw.output.native_dir {
            config.native_output_dir = resolve_path(base_dir, &native_dir);
        }
        if let Some(markers) = raw.markers {
            if markers.begin.is_empty() || markers.end.is_empty() {
                bail!("binding markers must not be empty");
            }
            config.markers = markers;
        }
        if let Some(vectors) = raw.vectors {
            config.vectors = vectors;
        }
        if let Some(int_like) = raw.int_like_types {
            config.int_like_types = int_like;
        }
        if let Some(symbol) = raw.registry_symbol {
            validate_identifier(&symbol).context("invalid `registry_symbol`")?;
            config.registry_symbol = symbol;
        }
        if let Some(banner) = raw.banner {
            config.banner = banner;
        }
        config.strict = raw.strict;

        Ok(config)
    }

    pub fn script_output_path(&self) -> PathBuf {
        if self
            .script_output
            .extension()
            .is_some_and(|ext| ext == "js")
        {
            self.script_output.clone()
        } else {
            self.script_output.join(format!("{}.js", self.api_name))
        }
    }

    pub fn native_output_path(&self) -> PathBuf {
        self.native_output_dir
            .join(format!("{}_export.cpp", self.api_name))
    }

    pub fn registration_fn_name(&self) -> String {
        format!("Register_{}", self.api_name.to_uppercase())
    }

    pub fn classifier(&self) -> TypeClassifier {
        TypeClassifier::new(self.int_like_types.iter().cloned())
    }
}

/// Load a binding configuration from a YAML file. Relative paths inside it
/// resolve against the file's directory.
pub fn load_binding_config(path: &Path) -> Result<BindingConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read binding config at {}", path.display()))?;

    let parsed: RawConfig = serde_yaml::from_str(&raw)
        .with_context(|| format!("failed to parse binding config at {}", path.display()))?;

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    BindingConfig::from_raw(parsed, base_dir)
        .with_context(|| format!("invalid binding config at {}", path.display()))
}

fn resolve_path(base_dir: &Path, path: &str) -> PathBuf {
    let candidate = PathBuf::from(path);
    if candidate.is_absolute() {
        candidate
    } else {
        base_dir.join(candidate)
    }
}

/// Rejects names that cannot be spliced into generated C++ as identifiers.
pub fn validate_identifier(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|ch| ch.is_ascii_alphabetic() || ch == '_');
    if !valid_start || !chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_') {
        bail!("`{name}` is not a valid C identifier");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_and_resolves_relative_paths() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config_path = dir.path().join("bindings.yaml");
        fs::write(
            &config_path,
            "api: spine_api\n\
             namespace: spine\n\
             headers:\n  root: port\n  exclude: [port/dist]\n\
             output:\n  script: out\n  native_dir: js_binding\n\
             int_like_types: [Layer2D]\n",
        )?;

        let config = load_binding_config(&config_path)?;
        assert_eq!(config.api_name, "spine_api");
        assert_eq!(config.namespace, "spine");
        assert_eq!(config.header_root, dir.path().join("port"));
        assert_eq!(config.excludes, vec![dir.path().join("port/dist")]);
        assert_eq!(
            config.script_output_path(),
            dir.path().join("out").join("spine_api.js")
        );
        assert_eq!(
            config.native_output_path(),
            dir.path().join("js_binding").join("spine_api_export.cpp")
        );
        assert_eq!(config.registration_fn_name(), "Register_SPINE_API");
        assert_eq!(config.markers, MarkerConfig::default());
        assert_eq!(config.int_like_types, vec!["Layer2D".to_string()]);
        Ok(())
    }

    #[test]
    fn explicit_js_path_is_kept() {
        let mut config = BindingConfig::new("api");
        config.script_output = PathBuf::from("/tmp/custom.js");
        assert_eq!(config.script_output_path(), PathBuf::from("/tmp/custom.js"));
    }

    #[test]
    fn rejects_missing_api() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config_path = dir.path().join("bindings.yaml");
        fs::write(&config_path, "namespace: spine\n")?;

        let err = load_binding_config(&config_path).unwrap_err();
        assert!(format!("{err:#}").contains("missing the `api` identifier"));
        Ok(())
    }

    #[test]
    fn vector_arity_by_substring() {
        let vectors = VectorConfig::default();
        assert_eq!(vectors.arity_of("const Vector2f& pos"), Some(2));
        assert_eq!(vectors.arity_of("Vector3 v"), Some(3));
        assert_eq!(vectors.arity_of("float x"), None);
        assert_eq!(vectors.constructor_for(3), Some("Vector3f"));
        assert_eq!(vectors.constructor_for(4), None);
    }
}
