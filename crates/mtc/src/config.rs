//! Checker configuration

/// Options controlling output and debugging dumps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckerConfig {
    /// Append `  [code]` to coded errors
    pub show_error_codes: bool,
    /// Print the closing `Found ...` line
    pub error_summary: bool,
    /// Also render diagnostics with source context on stderr
    pub pretty: bool,
    pub dump_tokens: bool,
    pub dump_ast: bool,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            show_error_codes: true,
            error_summary: true,
            pretty: false,
            dump_tokens: false,
            dump_ast: false,
        }
    }
}
