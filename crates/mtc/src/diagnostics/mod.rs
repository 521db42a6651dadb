//! Diagnostic records and the mypy-compatible text report

mod diagnostic;
mod formatter;

pub use diagnostic::{Diagnostic, ErrorCode, Severity};
pub use formatter::{Formatter, Summary};
