use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::types::DeclOrigin;

/// A second declaration that derived an export name already in use.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportCollision {
    pub name: String,
    pub first: DeclOrigin,
    pub second: DeclOrigin,
}

/// Accumulates the headers and export names seen during one run. Both sets
/// are ordered so the generated include list and registration body are
/// stable across runs.
#[derive(Clone, Debug, Default)]
pub struct ExportRegistry {
    headers: BTreeSet<PathBuf>,
    functions: BTreeSet<String>,
    origins: Vec<(String, DeclOrigin)>,
}

impl ExportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_header(&mut self, header: &Path) {
        self.headers.insert(header.to_path_buf());
    }

    /// Records an export name. A repeated name keeps a single registry slot;
    /// the collision is returned so the caller can decide how loud to be.
    pub fn record(&mut self, name: &str, origin: &DeclOrigin) -> Option<ExportCollision> {
        if self.functions.insert(name.to_string()) {
            self.origins.push((name.to_string(), origin.clone()));
            return None;
        }

        let first = self
            .origins
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, first)| first.clone())
            .unwrap_or_else(|| origin.clone());
        warn!(
            export = name,
            first = %first.header.display(),
            second = %origin.header.display(),
            "export name collision; registry keeps a single slot"
        );
        Some(ExportCollision {
            name: name.to_string(),
            first,
            second: origin.clone(),
        })
    }

    pub fn headers(&self) -> impl Iterator<Item = &Path> {
        self.headers.iter().map(PathBuf::as_path)
    }

    pub fn functions(&self) -> impl Iterator<Item = &str> {
        self.functions.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
