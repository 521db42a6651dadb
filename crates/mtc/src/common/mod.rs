//! Common infrastructure shared across the pipeline

mod error;
mod span;

pub use error::{CheckError, CheckResult, DiagnosticReporter};
pub use span::Span;
