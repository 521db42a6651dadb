//! Report rendering
//!
//! Output mirrors mypy's default text format:
//!
//! ```text
//! t.py:2: error: Incompatible types in assignment (expression has type "str", variable has type "int")  [assignment]
//! t.py:3: note: Revealed type is "int"
//! Found 1 error in 1 file (checked 1 source file)
//! ```

use super::Diagnostic;
use crate::common::CheckError;

/// Renders diagnostics as report lines
#[derive(Debug, Clone, Copy)]
pub struct Formatter {
    show_error_codes: bool,
}

impl Formatter {
    pub fn new(show_error_codes: bool) -> Self {
        Self { show_error_codes }
    }

    /// `<path>:<line>: <severity>: <message>  [<code>]`
    pub fn format_diagnostic(&self, path: &str, diagnostic: &Diagnostic) -> String {
        let mut line = format!(
            "{}:{}: {}: {}",
            path, diagnostic.line, diagnostic.severity, diagnostic.message
        );
        if let (true, Some(code)) = (self.show_error_codes, diagnostic.code) {
            line.push_str("  [");
            line.push_str(code.as_str());
            line.push(']');
        }
        line
    }

    /// All lines for one file, ordered by line number
    ///
    /// The sort is stable so diagnostics on the same line keep their
    /// emission order.
    pub fn format_file(&self, path: &str, diagnostics: &[Diagnostic]) -> Vec<String> {
        let mut ordered: Vec<&Diagnostic> = diagnostics.iter().collect();
        ordered.sort_by_key(|d| d.line);
        ordered
            .into_iter()
            .map(|d| self.format_diagnostic(path, d))
            .collect()
    }

    /// A fatal error that stopped checking of a file
    pub fn format_fatal(&self, path: &str, error: &CheckError) -> String {
        match error.line() {
            Some(line) => format!("{}:{}: error: {}", path, line, error),
            None => format!("{}: error: {}", path, error),
        }
    }
}

/// Totals for the closing summary line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub errors: usize,
    pub files_with_errors: usize,
    pub checked_files: usize,
    /// A fatal error stopped checking
    pub blocked: bool,
}

impl Summary {
    /// The `Found ...` line, or `None` when there is nothing to report
    pub fn render(&self) -> Option<String> {
        if self.errors == 0 {
            return None;
        }
        let found = format!(
            "Found {} in {}",
            plural(self.errors, "error"),
            plural(self.files_with_errors, "file")
        );
        if self.blocked {
            Some(format!("{} (errors prevented further checking)", found))
        } else {
            Some(format!(
                "{} (checked {})",
                found,
                plural(self.checked_files, "source file")
            ))
        }
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}
