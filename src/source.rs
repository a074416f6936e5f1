//! Header discovery. The generator only needs a deterministic list of header
//! paths and contents; where they come from is up to the implementation.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderFile {
    pub path: PathBuf,
    pub contents: String,
}

impl HeaderFile {
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }
}

pub trait HeaderSource {
    fn headers(&self) -> Result<Vec<HeaderFile>>;
}

/// Every `*.h` below `root`, minus the excluded directories, sorted by path.
#[derive(Debug, Clone)]
pub struct FsHeaderSource {
    root: PathBuf,
    excludes: Vec<PathBuf>,
}

impl FsHeaderSource {
    pub fn new(root: impl Into<PathBuf>, excludes: Vec<PathBuf>) -> Self {
        Self {
            root: root.into(),
            excludes,
        }
    }

    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        let root = fs::canonicalize(&self.root)
            .with_context(|| format!("header root {} does not exist", self.root.display()))?;
        let excludes: Vec<PathBuf> = self
            .excludes
            .iter()
            .map(|dir| fs::canonicalize(dir).unwrap_or_else(|_| dir.clone()))
            .collect();

        let pattern = format!("{}/**/*.h", glob::Pattern::escape(&root.to_string_lossy()));
        let mut paths = Vec::new();
        for entry in glob::glob(&pattern).context("invalid header search pattern")? {
            let path = entry.context("failed to walk header directory")?;
            if excludes.iter().any(|dir| path.starts_with(dir)) {
                debug!(header = %path.display(), "excluded");
                continue;
            }
            if path.is_file() {
                paths.push(path);
            }
        }

        paths.sort();
        Ok(paths)
    }
}

impl HeaderSource for FsHeaderSource {
    fn headers(&self) -> Result<Vec<HeaderFile>> {
        self.discover()?
            .into_iter()
            .map(|path| {
                let contents = fs::read_to_string(&path)
                    .with_context(|| format!("failed to read header {}", path.display()))?;
                Ok(HeaderFile { path, contents })
            })
            .collect()
    }
}

/// Headers held in memory, yielded in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryHeaderSource {
    files: Vec<HeaderFile>,
}

impl MemoryHeaderSource {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_header(mut self, path: impl AsRef<Path>, contents: impl Into<String>) -> Self {
        self.files
            .push(HeaderFile::new(path.as_ref(), contents));
        self
    }
}

impl HeaderSource for MemoryHeaderSource {
    fn headers(&self) -> Result<Vec<HeaderFile>> {
        Ok(self.files.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovers_sorted_headers_and_skips_excluded_dirs() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let root = dir.path();
        fs::create_dir_all(root.join("node"))?;
        fs::create_dir_all(root.join("dist"))?;
        fs::write(root.join("node/b.h"), "// b")?;
        fs::write(root.join("a.h"), "// a")?;
        fs::write(root.join("a.cpp"), "// not a header")?;
        fs::write(root.join("dist/copy.h"), "// excluded")?;

        let source = FsHeaderSource::new(root, vec![root.join("dist")]);
        let headers = source.headers()?;
        let names: Vec<_> = headers
            .iter()
            .map(|h| h.path.strip_prefix(fs::canonicalize(root).unwrap()).unwrap().to_path_buf())
            .collect();

        assert_eq!(names, [PathBuf::from("a.h"), PathBuf::from("node/b.h")]);
        assert_eq!(headers[0].contents, "// a");
        Ok(())
    }

    #[test]
    fn missing_root_is_an_error() {
        let source = FsHeaderSource::new("/definitely/not/here", Vec::new());
        assert!(source.headers().is_err());
    }
}
