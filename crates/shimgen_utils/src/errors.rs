use ariadne::{Color, Label, Report, ReportKind, Source};

use crate::span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticSeverity {
    Error,
    Warning,
    Info,
}

/// A message anchored to a span of one header file.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    severity: DiagnosticSeverity,
    source_id: String,
    span: Span,
    message: String,
    label: Option<String>,
    help: Option<String>,
}

impl Diagnostic {
    pub fn new(
        severity: DiagnosticSeverity,
        source_id: impl Into<String>,
        span: Span,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            source_id: source_id.into(),
            span,
            message: message.into(),
            label: None,
            help: None,
        }
    }

    pub fn error(source_id: impl Into<String>, span: Span, message: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Error, source_id, span, message)
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub const fn severity(&self) -> DiagnosticSeverity {
        self.severity
    }

    pub const fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub const fn report_kind(&self) -> ReportKind<'static> {
        match self.severity {
            DiagnosticSeverity::Error => ReportKind::Error,
            DiagnosticSeverity::Warning => ReportKind::Warning,
            DiagnosticSeverity::Info => ReportKind::Advice,
        }
    }
}

pub fn emit_diagnostics(diagnostics: &[Diagnostic], source: &str) {
    for diagnostic in diagnostics {
        let color = match diagnostic.severity {
            DiagnosticSeverity::Error => Color::Red,
            DiagnosticSeverity::Warning => Color::Yellow,
            DiagnosticSeverity::Info => Color::Blue,
        };

        let span: std::ops::Range<usize> = diagnostic.span().into();
        let mut report = Report::build(
            diagnostic.report_kind(),
            diagnostic.source_id().to_string(),
            span.start,
        )
        .with_message(diagnostic.message());

        let label = Label::new((diagnostic.source_id().to_string(), span)).with_color(color);
        report = match diagnostic.label() {
            Some(text) => report.with_label(label.with_message(text)),
            None => report.with_label(label),
        };

        if let Some(help) = diagnostic.help() {
            report = report.with_note(help);
        } else if diagnostic.severity == DiagnosticSeverity::Error {
            report = report.with_note(
                "Re-run with SHIMGEN_LOG=debug to trace every declaration scanned before this one.",
            );
        }

        let _ = report
            .finish()
            .eprint((diagnostic.source_id().to_string(), Source::from(source)));
    }
}

pub fn emit_diagnostic(diagnostic: &Diagnostic, source: &str) {
    emit_diagnostics(std::slice::from_ref(diagnostic), source);
}
