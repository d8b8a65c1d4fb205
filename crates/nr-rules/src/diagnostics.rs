use ariadne::{Color, Label, Report, ReportKind, Source};
use std::fmt;

use crate::guard::Violation;
use crate::lexer::LexError;
use crate::parser::ParseError;

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The expression cannot be used.
    Error,
    /// The expression works but is probably not what the author meant.
    Warning,
}

/// A diagnostic message with source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// How bad it is.
    pub severity: Severity,
    /// Byte range in the expression source.
    pub span: std::ops::Range<usize>,
    /// Headline message.
    pub message: String,
    /// Optional text attached to the highlighted span.
    pub label: Option<String>,
}

impl Diagnostic {
    /// An error diagnostic.
    pub fn error(span: std::ops::Range<usize>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            span,
            message: message.into(),
            label: None,
        }
    }

    /// A warning diagnostic.
    pub fn warning(span: std::ops::Range<usize>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            span,
            message: message.into(),
            label: None,
        }
    }

    /// Attach a label to the highlighted span.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// True for errors.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl From<Violation> for Diagnostic {
    fn from(v: Violation) -> Self {
        let label = v.kind.to_string();
        Diagnostic::error(v.span.clone(), v.to_string()).with_label(label)
    }
}

impl From<LexError> for Diagnostic {
    fn from(e: LexError) -> Self {
        Diagnostic::error(e.span, e.message)
    }
}

impl From<ParseError> for Diagnostic {
    fn from(e: ParseError) -> Self {
        Diagnostic::error(e.span, e.message)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{prefix}: {}", self.message)
    }
}

/// Render diagnostics for one expression using ariadne.
///
/// `name` identifies the expression in the report header, typically the
/// condition id.
pub fn render_diagnostics(source: &str, name: &str, diagnostics: &[Diagnostic]) -> String {
    let mut output = Vec::new();

    for diag in diagnostics {
        let (kind, color) = match diag.severity {
            Severity::Error => (ReportKind::Error, Color::Red),
            Severity::Warning => (ReportKind::Warning, Color::Yellow),
        };

        let span = (name, diag.span.clone());
        let label_text = diag.label.as_deref().unwrap_or(&diag.message);

        Report::build(kind, span.clone())
            .with_message(&diag.message)
            .with_label(Label::new(span).with_message(label_text).with_color(color))
            .finish()
            .write((name, Source::from(source)), &mut output)
            .ok();
    }

    String::from_utf8(output).unwrap_or_default()
}
