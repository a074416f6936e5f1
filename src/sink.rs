use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

/// Receives each finished artifact exactly once.
pub trait ArtifactSink {
    fn write(&mut self, path: &Path, contents: &str) -> Result<()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FsSink;

impl ArtifactSink for FsSink {
    fn write(&mut self, path: &Path, contents: &str) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create output directory {}", parent.display())
            })?;
        }
        fs::write(path, contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(artifact = %path.display(), bytes = contents.len(), "wrote artifact");
        Ok(())
    }
}

/// Keeps artifacts in memory, keyed by their target path.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    artifacts: BTreeMap<PathBuf, String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Path) -> Option<&str> {
        self.artifacts.get(path).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

impl ArtifactSink for MemorySink {
    fn write(&mut self, path: &Path, contents: &str) -> Result<()> {
        self.artifacts
            .insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }
}
