//! Python frontend
//!
//! The frontend turns source text into a [`Module`] AST:
//! 1. Lexing with indentation tracking
//! 2. Recursive descent parsing of the supported subset
//!
//! Anything outside the subset is reported as a syntax error rather than
//! silently skipped, so the checker only ever sees constructs it understands.

pub mod ast;
pub mod lexer;
pub mod parser;

pub use lexer::{PyLexer, PyToken, PyTokenKind};
pub use parser::PyParser;

use crate::common::CheckResult;
use ast::Module;

/// Parse a complete source file
#[tracing::instrument(level = "debug", skip(source), fields(len = source.len()))]
pub fn parse(source: &str) -> CheckResult<Module> {
    let module = PyParser::new(source).parse_module()?;
    tracing::debug!(statements = module.body.len(), "parsed module");
    Ok(module)
}

/// Render the token stream, one token per line
pub fn dump_tokens(source: &str) -> CheckResult<String> {
    let tokens = PyLexer::new(source).tokenize_all()?;
    let mut out = String::new();
    for token in &tokens {
        out.push_str(&format!("{:>4}: {:?} {}\n", token.line, token.span.range(), token.kind));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dump_tokens_lists_lines() {
        let dump = dump_tokens("x = 1\n").unwrap();
        assert!(dump.contains("1: 0..1 x"));
        assert!(dump.lines().count() >= 4);
    }

    #[test]
    fn test_parse_reports_syntax_errors() {
        let err = parse("def f(:\n").unwrap_err();
        assert!(err.is_syntax());
    }
}
