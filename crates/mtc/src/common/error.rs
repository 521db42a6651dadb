//! Error types and diagnostic reporting

use codespan_reporting::diagnostic::{Diagnostic as CsDiagnostic, Label};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream, WriteColor};
use thiserror::Error;
use super::Span;
use crate::diagnostics::{Diagnostic, Severity};

/// Fatal error that stops checking of a file
///
/// Type errors are never reported through this type; they are collected as
/// [`Diagnostic`]s so checking can continue.
#[derive(Error, Debug)]
pub enum CheckError {
    #[error("{message}")]
    Lexer { message: String, span: Span, line: usize },

    #[error("{message}")]
    Parser { message: String, span: Span, line: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CheckError {
    pub fn lexer(message: impl Into<String>, span: Span, line: usize) -> Self {
        Self::Lexer {
            message: message.into(),
            span,
            line,
        }
    }

    pub fn parser(message: impl Into<String>, span: Span, line: usize) -> Self {
        Self::Parser {
            message: message.into(),
            span,
            line,
        }
    }

    /// Line the failure was detected on, if it came from the source text
    pub fn line(&self) -> Option<usize> {
        match self {
            CheckError::Lexer { line, .. } | CheckError::Parser { line, .. } => Some(*line),
            CheckError::Io(_) => None,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            CheckError::Lexer { span, .. } | CheckError::Parser { span, .. } => Some(*span),
            CheckError::Io(_) => None,
        }
    }

    /// Whether this is a syntax failure (lexer or parser)
    pub fn is_syntax(&self) -> bool {
        matches!(self, CheckError::Lexer { .. } | CheckError::Parser { .. })
    }
}

pub type CheckResult<T> = Result<T, CheckError>;

/// Renders errors and diagnostics with source context (`--pretty`)
pub struct DiagnosticReporter {
    files: SimpleFiles<String, String>,
    writer: StandardStream,
    config: term::Config,
}

impl DiagnosticReporter {
    pub fn new() -> Self {
        Self::with_color(ColorChoice::Auto)
    }

    pub fn with_color(choice: ColorChoice) -> Self {
        Self {
            files: SimpleFiles::new(),
            writer: StandardStream::stderr(choice),
            config: term::Config::default(),
        }
    }

    pub fn add_file(&mut self, name: impl Into<String>, source: impl Into<String>) -> usize {
        self.files.add(name.into(), source.into())
    }

    pub fn report_error(&self, file_id: usize, error: &CheckError) {
        let diagnostic = Self::error_to_codespan(file_id, error);
        self.emit(&mut self.writer.lock(), &diagnostic);
    }

    pub fn report_diagnostic(&self, file_id: usize, diagnostic: &Diagnostic) {
        let diagnostic = Self::diagnostic_to_codespan(file_id, diagnostic);
        self.emit(&mut self.writer.lock(), &diagnostic);
    }

    /// Render a diagnostic into an arbitrary writer
    pub fn write_diagnostic(&self, writer: &mut dyn WriteColor, file_id: usize, diagnostic: &Diagnostic) {
        let diagnostic = Self::diagnostic_to_codespan(file_id, diagnostic);
        self.emit(writer, &diagnostic);
    }

    fn emit(&self, writer: &mut dyn WriteColor, diagnostic: &CsDiagnostic<usize>) {
        if let Err(err) = term::emit(writer, &self.config, &self.files, diagnostic) {
            tracing::warn!(%err, "failed to render diagnostic");
        }
    }

    fn error_to_codespan(file_id: usize, error: &CheckError) -> CsDiagnostic<usize> {
        match error {
            CheckError::Lexer { message, span, .. } => CsDiagnostic::error()
                .with_message("Lexer error")
                .with_labels(vec![
                    Label::primary(file_id, span.range()).with_message(message)
                ]),

            CheckError::Parser { message, span, .. } => CsDiagnostic::error()
                .with_message("Syntax error")
                .with_labels(vec![
                    Label::primary(file_id, span.range()).with_message(message)
                ]),

            CheckError::Io(err) => {
                CsDiagnostic::error().with_message(format!("IO error: {}", err))
            }
        }
    }

    fn diagnostic_to_codespan(file_id: usize, diagnostic: &Diagnostic) -> CsDiagnostic<usize> {
        let base = match diagnostic.severity {
            Severity::Error => CsDiagnostic::error(),
            Severity::Note => CsDiagnostic::note(),
        };
        let base = match diagnostic.code {
            Some(code) => base.with_code(code.as_str()),
            None => base,
        };
        base.with_message(diagnostic.message.clone())
            .with_labels(vec![Label::primary(file_id, diagnostic.span.range())])
    }
}

impl Default for DiagnosticReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::ErrorCode;
    use codespan_reporting::term::termcolor::NoColor;

    #[test]
    fn test_parse_error_carries_line() {
        let err = CheckError::parser("invalid syntax", Span::new(3, 4), 2);
        assert_eq!(err.line(), Some(2));
        assert!(err.is_syntax());
        assert_eq!(err.to_string(), "invalid syntax");
    }

    #[test]
    fn test_pretty_rendering_includes_source() {
        let mut reporter = DiagnosticReporter::with_color(ColorChoice::Never);
        let file_id = reporter.add_file("t.py", "x: int = \"a\"\n");
        let diagnostic = Diagnostic::error(
            1,
            Span::new(9, 12),
            "Incompatible types in assignment",
            Some(ErrorCode::Assignment),
        );

        let mut out = NoColor::new(Vec::new());
        reporter.write_diagnostic(&mut out, file_id, &diagnostic);
        let text = String::from_utf8(out.into_inner()).unwrap();

        assert!(text.contains("error[assignment]: Incompatible types in assignment"));
        assert!(text.contains("x: int = \"a\""));
    }
}
