//! Diagnostic records produced by the checker

use crate::common::Span;
use std::fmt;

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Note => f.write_str("note"),
        }
    }
}

/// Error codes shown as `[code]` after a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Assignment,
    ArgType,
    ReturnValue,
    Operator,
    AttrDefined,
    NoRedef,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Assignment => "assignment",
            ErrorCode::ArgType => "arg-type",
            ErrorCode::ReturnValue => "return-value",
            ErrorCode::Operator => "operator",
            ErrorCode::AttrDefined => "attr-defined",
            ErrorCode::NoRedef => "no-redef",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single note or error tied to a source line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 1-based line number
    pub line: usize,
    pub span: Span,
    pub severity: Severity,
    pub message: String,
    pub code: Option<ErrorCode>,
}

impl Diagnostic {
    pub fn error(line: usize, span: Span, message: impl Into<String>, code: Option<ErrorCode>) -> Self {
        Self {
            line,
            span,
            severity: Severity::Error,
            message: message.into(),
            code,
        }
    }

    pub fn note(line: usize, span: Span, message: impl Into<String>) -> Self {
        Self {
            line,
            span,
            severity: Severity::Note,
            message: message.into(),
            code: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}
