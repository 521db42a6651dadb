//! mini-type-checker - a minimal static type checker for annotated Python
//!
//! Checks a small subset of Python (annotated assignments, functions,
//! classes, calls and `reveal_type`) and reports problems in the same text
//! format as mypy.
//!
//! ## Architecture
//!
//! - **Frontend** (`frontend/`): indentation-aware lexer, parser and AST
//! - **Types** (`types/`): semantic types and the compatibility relation
//! - **Sema** (`sema/`): scopes, inference and checking
//! - **Diagnostics** (`diagnostics/`): diagnostic records and report rendering
//! - **Driver** (`driver/`): per-file pipeline and exit status
//! - **Common** (`common/`): errors, spans and source-context rendering

pub mod common;
pub mod config;
pub mod diagnostics;
pub mod driver;
pub mod frontend;
pub mod sema;
pub mod types;

// Re-exports for convenience
pub use common::{CheckError, CheckResult, DiagnosticReporter, Span};
pub use config::CheckerConfig;
pub use diagnostics::{Diagnostic, ErrorCode, Formatter, Severity};
pub use driver::{FileReport, Pipeline, RunOutcome, SourceFile, check_files, check_source};
