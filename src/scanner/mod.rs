//! Declaration scanner: finds exportable declarations between the binding
//! markers of a header.

pub mod declaration;
pub mod line;

use std::path::{Path, PathBuf};

use shimgen_ffi::{DeclOrigin, HeaderDeclaration, MarkerConfig, NormalizedParameter, VectorConfig};
use shimgen_utils::{Diagnostic, Span};
use thiserror::Error;
use tracing::{debug, trace};

use crate::normalize::normalize_parameters;
use declaration::{LineShape, class_name, is_deleted, parse_line};
use line::{CommentStripper, source_lines};

pub use declaration::DeclarationParts;
pub use line::SourceLine;

/// Name of the implicit receiver parameter of instance methods.
pub const RECEIVER_NAME: &str = "ptr";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("only function declarations can be exported ({}:{line}): `{text}`", header.display())]
    MalformedDeclaration {
        header: PathBuf,
        line: usize,
        text: String,
        span: Span,
    },
}

impl ScanError {
    pub fn header(&self) -> &Path {
        match self {
            Self::MalformedDeclaration { header, .. } => header,
        }
    }

    pub fn to_diagnostic(&self, source_id: &str) -> Diagnostic {
        match self {
            Self::MalformedDeclaration { span, .. } => {
                Diagnostic::error(source_id, *span, self.to_string())
                    .with_label("no parameter list found on this line")
                    .with_help(
                        "Lines between the binding markers must be single-line function \
                         declarations; move fields and other members outside the region.",
                    )
            }
        }
    }
}

pub type ScanResult<T> = Result<T, ScanError>;

/// What one header contributed.
#[derive(Debug, Default, Clone)]
pub struct HeaderScan {
    pub declarations: Vec<HeaderDeclaration>,
    /// A begin marker was seen, so the header belongs in the include list.
    pub exported: bool,
}

/// Per-header state machine. Reset for every file.
#[derive(Debug, Default)]
struct ScanState {
    active: bool,
    comments: CommentStripper,
    class_name: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct Scanner<'a> {
    markers: &'a MarkerConfig,
    vectors: &'a VectorConfig,
}

impl<'a> Scanner<'a> {
    pub const fn new(markers: &'a MarkerConfig, vectors: &'a VectorConfig) -> Self {
        Self { markers, vectors }
    }

    pub fn scan(&self, header: &Path, source: &str) -> ScanResult<HeaderScan> {
        let mut state = ScanState::default();
        let mut scan = HeaderScan::default();

        for line in source_lines(source) {
            let code = state.comments.strip(line.text);

            if let Some(name) = class_name(&code) {
                state.class_name = Some(name.to_string());
            }

            if line.text.contains(&self.markers.begin) {
                state.active = true;
                scan.exported = true;
                continue;
            }
            if line.text.contains(&self.markers.end) {
                state.active = false;
                continue;
            }
            if !state.active {
                continue;
            }

            let code = code.trim();
            if code.is_empty() || code.starts_with('#') || is_deleted(code) {
                continue;
            }
            if code.split_whitespace().nth(1).is_none() {
                trace!(line = line.number, code, "skipping single-token line");
                continue;
            }

            match parse_line(code) {
                LineShape::Declaration(parts) => {
                    let origin = DeclOrigin {
                        header: header.to_path_buf(),
                        line: line.number,
                    };
                    let decl = self.build(parts, state.class_name.as_deref(), origin);
                    debug!(
                        export = %decl.function_name,
                        header = %header.display(),
                        line = line.number,
                        "scanned declaration"
                    );
                    scan.declarations.push(decl);
                }
                LineShape::Ignored => {
                    trace!(line = line.number, code, "not an exportable function");
                }
                LineShape::Malformed => {
                    return Err(ScanError::MalformedDeclaration {
                        header: header.to_path_buf(),
                        line: line.number,
                        text: line.text.trim().to_string(),
                        span: line.content_span(),
                    });
                }
            }
        }

        Ok(scan)
    }

    fn build(
        &self,
        parts: DeclarationParts,
        class_name: Option<&str>,
        origin: DeclOrigin,
    ) -> HeaderDeclaration {
        let mut parameters = normalize_parameters(&parts.raw_parameters, self.vectors);
        let function_name =
            HeaderDeclaration::export_name(class_name, &parts.name, parts.is_static);

        if let Some(class) = class_name.filter(|_| !parts.is_static) {
            parameters.insert(0, NormalizedParameter::new(format!("{class}*"), RECEIVER_NAME));
        }

        HeaderDeclaration {
            class_name: class_name.map(ToString::to_string),
            is_static: parts.is_static,
            return_type: parts.return_type,
            function_name,
            method_name: parts.name,
            parameters,
            origin,
        }
    }
}
