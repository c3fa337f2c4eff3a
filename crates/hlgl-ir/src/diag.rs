//! Diagnostic channel.
//!
//! The engines report internal inconsistencies (and, later passes, warnings
//! and notes) through a [`DiagSink`]. Ordinary build failures are *not*
//! reported here; they surface as error returns and the parser decides how
//! to phrase them. The sink only carries what the parser could not know.
//!
//! Tests use the `Vec<Diagnostic>` impl as a capturing stub.

use std::fmt;

use hlgl_ast::Span;

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Info,
    Warning,
    Error,
    /// A state the builder considers unreachable; a bug in the translator
    InternalError,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::InternalError => "internal error",
        };
        write!(f, "{}", name)
    }
}

/// One categorized message with its source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub span: Span,
    pub message: String,
}

impl Diagnostic {
    pub fn new(severity: Severity, span: Span, message: impl Into<String>) -> Self {
        Self {
            severity,
            span,
            message: message.into(),
        }
    }

    pub fn internal_error(span: Span, message: impl Into<String>) -> Self {
        Self::new(Severity::InternalError, span, message)
    }

    pub fn error(span: Span, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, span, message)
    }

    pub fn warning(span: Span, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, span, message)
    }

    pub fn info(span: Span, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, span, message)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} (line {})", self.severity, self.message, self.span.line)
    }
}

/// Where diagnostics go.
///
/// Writes are ordered by call sequence; the sink must not reorder them.
pub trait DiagSink {
    fn push(&mut self, diagnostic: Diagnostic);
}

impl DiagSink for Vec<Diagnostic> {
    fn push(&mut self, diagnostic: Diagnostic) {
        Vec::push(self, diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_sink_preserves_order() {
        let mut sink: Vec<Diagnostic> = Vec::new();
        DiagSink::push(&mut sink, Diagnostic::warning(Span::at_line(1), "first"));
        DiagSink::push(&mut sink, Diagnostic::error(Span::at_line(2), "second"));
        assert_eq!(sink.len(), 2);
        assert_eq!(sink[0].message, "first");
        assert_eq!(sink[1].severity, Severity::Error);
    }

    #[test]
    fn test_display() {
        let d = Diagnostic::internal_error(Span::at_line(7), "bad promotion node");
        assert_eq!(d.to_string(), "internal error: bad promotion node (line 7)");
    }
}
