//! One generation run: scan every header, render both artifacts in lockstep
//! into memory, then hand each finished artifact to the sink once.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;
use shimgen_ffi::{
    BindingConfig, ExportCollision, ExportRegistry, HeaderDeclaration, TypeClassifier,
};
use thiserror::Error;
use tracing::{debug, info};

use crate::emit::{NativeEmitter, RegistryAssembler, ScriptEmitter};
use crate::scanner::{ScanError, Scanner};
use crate::sink::ArtifactSink;
use crate::source::{HeaderFile, HeaderSource};

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("script output directory {} does not exist; binding export aborted", .0.display())]
    MissingOutputRoot(PathBuf),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(
        "export name `{}` at {}:{} collides with {}:{}",
        .0.name,
        .0.second.header.display(),
        .0.second.line,
        .0.first.header.display(),
        .0.first.line
    )]
    DuplicateExport(ExportCollision),
}

/// Both rendered artifacts plus what went into them.
#[derive(Debug, Clone)]
pub struct GeneratedArtifacts {
    pub script_path: PathBuf,
    pub script: String,
    pub native_path: PathBuf,
    pub native: String,
    pub declarations: Vec<HeaderDeclaration>,
    pub collisions: Vec<ExportCollision>,
}

/// Machine-readable description of one export, used by `shimgen list`.
#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    pub export: String,
    pub class: Option<String>,
    pub is_static: bool,
    pub header: PathBuf,
    pub line: usize,
    pub ffi_signature: String,
}

#[derive(Debug, Clone)]
pub struct Generator<'a> {
    config: &'a BindingConfig,
    classifier: TypeClassifier,
}

impl<'a> Generator<'a> {
    pub fn new(config: &'a BindingConfig) -> Self {
        Self {
            config,
            classifier: config.classifier(),
        }
    }

    pub const fn config(&self) -> &BindingConfig {
        self.config
    }

    /// The script artifact's directory must already exist; the native
    /// output directory is created on write.
    pub fn check_preconditions(&self) -> Result<(), GenerateError> {
        let script_path = self.config.script_output_path();
        let script_dir = script_path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        if script_dir.is_dir() {
            Ok(())
        } else {
            Err(GenerateError::MissingOutputRoot(script_dir.to_path_buf()))
        }
    }

    pub fn generate(&self, headers: &[HeaderFile]) -> Result<GeneratedArtifacts, GenerateError> {
        let config = self.config;
        let scanner = Scanner::new(&config.markers, &config.vectors);
        let script_emitter = ScriptEmitter::new(&config.namespace, &self.classifier);
        let native_emitter = NativeEmitter::new(&self.classifier, &config.vectors);

        let mut registry = ExportRegistry::new();
        let mut declarations = Vec::new();
        let mut collisions = Vec::new();
        let mut script = String::new();
        let mut bodies = String::new();

        script_emitter.render_prologue(&mut script);
        for header in headers {
            let scan = scanner.scan(&header.path, &header.contents)?;
            if scan.exported {
                registry.record_header(&header.path);
            }
            debug!(
                header = %header.path.display(),
                declarations = scan.declarations.len(),
                "scanned header"
            );

            for decl in scan.declarations {
                if let Some(collision) = registry.record(&decl.function_name, &decl.origin) {
                    if config.strict {
                        return Err(GenerateError::DuplicateExport(collision));
                    }
                    collisions.push(collision);
                }
                script_emitter.render_entry(&decl, &mut script);
                native_emitter.render_function(&decl, &mut bodies);
                declarations.push(decl);
            }
        }
        script_emitter.render_epilogue(&mut script);

        let native = RegistryAssembler::new(config).assemble(&registry, &bodies);
        info!(
            exports = registry.len(),
            headers = registry.headers().count(),
            "generated bindings"
        );

        Ok(GeneratedArtifacts {
            script_path: config.script_output_path(),
            script,
            native_path: config.native_output_path(),
            native,
            declarations,
            collisions,
        })
    }

    /// Writes the native shim first so a failing script write never leaves a
    /// registry referencing wrappers that do not exist.
    pub fn write(&self, artifacts: &GeneratedArtifacts, sink: &mut dyn ArtifactSink) -> Result<()> {
        sink.write(&artifacts.native_path, &artifacts.native)?;
        sink.write(&artifacts.script_path, &artifacts.script)?;
        Ok(())
    }

    /// Preconditions, discovery, generation and output in one call.
    pub fn run(
        &self,
        source: &dyn HeaderSource,
        sink: &mut dyn ArtifactSink,
    ) -> Result<GeneratedArtifacts> {
        self.check_preconditions()?;
        let headers = source.headers()?;
        let artifacts = self.generate(&headers)?;
        self.write(&artifacts, sink)?;
        Ok(artifacts)
    }

    pub fn summarize(&self, decl: &HeaderDeclaration) -> ExportSummary {
        let script_emitter = ScriptEmitter::new(&self.config.namespace, &self.classifier);
        ExportSummary {
            export: decl.function_name.clone(),
            class: decl.class_name.clone(),
            is_static: decl.is_static,
            header: decl.origin.header.clone(),
            line: decl.origin.line,
            ffi_signature: script_emitter.ffi_signature(decl),
        }
    }
}
