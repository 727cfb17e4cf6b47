use crate::source_map::Range;

pub const W_HIGHLIGHT_FAILED: &str = "W_HIGHLIGHT_FAILED";
pub const W_ANNOTATION_OVERLAP: &str = "W_ANNOTATION_OVERLAP";
pub const W_INTRALINE_SKIPPED: &str = "W_INTRALINE_SKIPPED";
pub const I_HEADING_FALLBACK: &str = "I_HEADING_FALLBACK";

/// A note that one block of the document was rendered in a degraded way.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Diagnostic {
    pub range: Range,
    pub severity: DiagnosticSeverity,
    pub code: &'static str,
    pub message: String,
}

impl Diagnostic {
    pub fn new(
        range: Range,
        severity: DiagnosticSeverity,
        code: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            range,
            severity,
            code,
            message: message.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DiagnosticSeverity {
    Warning,
    Info,
}

impl DiagnosticSeverity {
    pub fn label(self) -> &'static str {
        match self {
            DiagnosticSeverity::Warning => "warning",
            DiagnosticSeverity::Info => "info",
        }
    }
}
