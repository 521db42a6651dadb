//! Python lexer implementation using logos
//!
//! Logos produces the raw token stream; this layer turns line structure into
//! `Newline`/`Indent`/`Dedent` tokens the way the Python tokenizer does:
//! blank and comment-only lines are dropped, newlines inside brackets are
//! ignored, and every line's indentation is compared against a stack of the
//! enclosing block indentations.

use super::token::{PyToken, PyTokenKind};
use crate::common::{CheckError, CheckResult, Span};
use logos::Logos;
use std::collections::VecDeque;

/// Lexer for Python source code
pub struct PyLexer<'a> {
    inner: logos::Lexer<'a, PyTokenKind>,
    /// Buffer for synthesized and peeked tokens
    pending: VecDeque<PyToken>,
    /// Indentation strings of the enclosing blocks; the root level is `""`
    indent_stack: Vec<&'a str>,
    /// Open bracket nesting; newlines are insignificant while non-zero
    group_depth: usize,
    at_line_start: bool,
    line_start: usize,
    line: usize,
    at_eof: bool,
}

impl<'a> PyLexer<'a> {
    /// Create a new lexer for the given source code
    pub fn new(source: &'a str) -> Self {
        Self {
            inner: PyTokenKind::lexer(source),
            pending: VecDeque::new(),
            indent_stack: vec![""],
            group_depth: 0,
            at_line_start: true,
            line_start: 0,
            line: 1,
            at_eof: false,
        }
    }

    /// Get the next token
    pub fn next_token(&mut self) -> CheckResult<PyToken> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Ok(token);
            }
            self.scan_token()?;
        }
    }

    /// Peek at the next token without consuming it
    pub fn peek(&mut self) -> CheckResult<&PyToken> {
        self.peek_at(0)
    }

    /// Peek at the token at offset (0 = next, 1 = after next, etc.)
    pub fn peek_at(&mut self, offset: usize) -> CheckResult<&PyToken> {
        while self.pending.len() <= offset {
            self.scan_token()?;
        }
        Ok(&self.pending[offset])
    }

    /// Check if the next token matches the expected kind
    pub fn check(&mut self, expected: &PyTokenKind) -> CheckResult<bool> {
        Ok(std::mem::discriminant(&self.peek()?.kind) == std::mem::discriminant(expected))
    }

    /// Check if the token after the next one matches the expected kind
    pub fn check_lookahead(&mut self, expected: &PyTokenKind) -> CheckResult<bool> {
        let token = self.peek_at(1)?;
        Ok(std::mem::discriminant(&token.kind) == std::mem::discriminant(expected))
    }

    /// Consume the next token if it matches, return true if consumed
    pub fn match_token(&mut self, expected: &PyTokenKind) -> CheckResult<bool> {
        if self.check(expected)? {
            self.next_token()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Expect a specific token kind, error if not found
    pub fn expect(&mut self, expected: PyTokenKind) -> CheckResult<PyToken> {
        let token = self.next_token()?;
        if std::mem::discriminant(&token.kind) == std::mem::discriminant(&expected) {
            Ok(token)
        } else {
            Err(CheckError::parser("invalid syntax", token.span, token.line))
        }
    }

    /// Tokenize the entire source and return all tokens
    pub fn tokenize_all(mut self) -> CheckResult<Vec<PyToken>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_eof = matches!(token.kind, PyTokenKind::Eof);
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    /// Get the source being lexed
    pub fn source(&self) -> &'a str {
        self.inner.source()
    }

    /// Scan at least one more token into the pending buffer
    fn scan_token(&mut self) -> CheckResult<()> {
        loop {
            if self.at_eof {
                let len = self.inner.source().len();
                self.pending
                    .push_back(PyToken::new(PyTokenKind::Eof, Span::new(len, len), self.line));
                return Ok(());
            }

            match self.inner.next() {
                Some(Ok(PyTokenKind::Newline)) => {
                    let span = Span::from(self.inner.span());
                    let line = self.line;
                    self.line += 1;
                    self.line_start = span.end;

                    // Blank lines and line breaks inside brackets carry no structure
                    if self.at_line_start || self.group_depth > 0 {
                        continue;
                    }
                    self.at_line_start = true;
                    self.pending.push_back(PyToken::new(PyTokenKind::Newline, span, line));
                    return Ok(());
                }
                Some(Ok(kind)) => {
                    let span = Span::from(self.inner.span());
                    if self.at_line_start {
                        self.at_line_start = false;
                        self.handle_indentation(span)?;
                    }
                    if kind.opens_group() {
                        self.group_depth += 1;
                    } else if kind.closes_group() {
                        self.group_depth = self.group_depth.saturating_sub(1);
                    }
                    self.pending.push_back(PyToken::new(kind, span, self.line));
                    return Ok(());
                }
                Some(Err(())) => {
                    let span = Span::from(self.inner.span());
                    return Err(self.invalid_token(span));
                }
                None => {
                    self.finish();
                    return Ok(());
                }
            }
        }
    }

    /// Compare the indentation of the line starting at `first` against the stack
    fn handle_indentation(&mut self, first: Span) -> CheckResult<()> {
        let source = self.inner.source();
        let indent = &source[self.line_start..first.start];
        let current = self.indent_stack.last().copied().unwrap_or("");

        if indent == current {
            return Ok(());
        }

        if indent.len() > current.len() {
            if !indent.starts_with(current) {
                return Err(CheckError::lexer(
                    "inconsistent use of tabs and spaces in indentation",
                    Span::new(self.line_start, first.start),
                    self.line,
                ));
            }
            self.indent_stack.push(indent);
            self.pending.push_back(PyToken::new(
                PyTokenKind::Indent,
                Span::new(self.line_start, first.start),
                self.line,
            ));
            return Ok(());
        }

        while let Some(&top) = self.indent_stack.last() {
            if top.len() <= indent.len() {
                break;
            }
            self.indent_stack.pop();
            self.pending
                .push_back(PyToken::new(PyTokenKind::Dedent, Span::new(first.start, first.start), self.line));
        }

        if self.indent_stack.last().copied() != Some(indent) {
            return Err(CheckError::lexer(
                "unindent does not match any outer indentation level",
                Span::new(self.line_start, first.start),
                self.line,
            ));
        }
        Ok(())
    }

    /// Close the logical line and every open block at end of input
    fn finish(&mut self) {
        let len = self.inner.source().len();
        let end = Span::new(len, len);
        if !self.at_line_start {
            self.at_line_start = true;
            self.pending.push_back(PyToken::new(PyTokenKind::Newline, end, self.line));
        }
        while self.indent_stack.len() > 1 {
            self.indent_stack.pop();
            self.pending.push_back(PyToken::new(PyTokenKind::Dedent, end, self.line));
        }
        self.at_eof = true;
    }

    fn invalid_token(&self, span: Span) -> CheckError {
        let slice = self.inner.slice();
        let unprefixed = slice.trim_start_matches(|c: char| c.is_ascii_alphabetic());
        let message = if unprefixed.starts_with(['"', '\'']) {
            format!("unterminated string literal (detected at line {})", self.line)
        } else if let Some(c) = slice.chars().next() {
            format!("invalid character '{}' (U+{:04X})", c, u32::from(c))
        } else {
            "invalid syntax".to_string()
        };
        CheckError::lexer(message, span, self.line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<PyTokenKind> {
        PyLexer::new(source)
            .tokenize_all()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_keywords() {
        let source = "def class return pass import from True False None";
        let mut lexer = PyLexer::new(source);

        assert!(matches!(lexer.next_token().unwrap().kind, PyTokenKind::Def));
        assert!(matches!(lexer.next_token().unwrap().kind, PyTokenKind::Class));
        assert!(matches!(lexer.next_token().unwrap().kind, PyTokenKind::Return));
        assert!(matches!(lexer.next_token().unwrap().kind, PyTokenKind::Pass));
        assert!(matches!(lexer.next_token().unwrap().kind, PyTokenKind::Import));
        assert!(matches!(lexer.next_token().unwrap().kind, PyTokenKind::From));
        assert!(matches!(lexer.next_token().unwrap().kind, PyTokenKind::True));
        assert!(matches!(lexer.next_token().unwrap().kind, PyTokenKind::False));
        assert!(matches!(lexer.next_token().unwrap().kind, PyTokenKind::NoneLit));
    }

    #[test]
    fn test_literals() {
        let source = "42 0xFF 0o17 0b101 3.14 1e9 \"hi\" 'x' b\"raw\" reveal_type";
        let mut lexer = PyLexer::new(source);

        assert!(matches!(lexer.next_token().unwrap().kind, PyTokenKind::IntLiteral(s) if s == "42"));
        assert!(matches!(lexer.next_token().unwrap().kind, PyTokenKind::HexLiteral(s) if s == "0xFF"));
        assert!(matches!(lexer.next_token().unwrap().kind, PyTokenKind::OctLiteral(s) if s == "0o17"));
        assert!(matches!(lexer.next_token().unwrap().kind, PyTokenKind::BinLiteral(s) if s == "0b101"));
        assert!(matches!(lexer.next_token().unwrap().kind, PyTokenKind::FloatLiteral(s) if s == "3.14"));
        assert!(matches!(lexer.next_token().unwrap().kind, PyTokenKind::FloatLiteral(s) if s == "1e9"));
        assert!(matches!(lexer.next_token().unwrap().kind, PyTokenKind::StringLiteral(s) if s == "\"hi\""));
        assert!(matches!(lexer.next_token().unwrap().kind, PyTokenKind::StringLiteral(s) if s == "'x'"));
        assert!(matches!(lexer.next_token().unwrap().kind, PyTokenKind::BytesLiteral(_)));
        assert!(matches!(lexer.next_token().unwrap().kind, PyTokenKind::Identifier(s) if s == "reveal_type"));
    }

    #[test]
    fn test_indent_and_dedent() {
        let source = "def f():\n    pass\nx = 1\n";
        assert_eq!(
            kinds(source),
            vec![
                PyTokenKind::Def,
                PyTokenKind::Identifier("f".to_string()),
                PyTokenKind::LParen,
                PyTokenKind::RParen,
                PyTokenKind::Colon,
                PyTokenKind::Newline,
                PyTokenKind::Indent,
                PyTokenKind::Pass,
                PyTokenKind::Newline,
                PyTokenKind::Dedent,
                PyTokenKind::Identifier("x".to_string()),
                PyTokenKind::Eq,
                PyTokenKind::IntLiteral("1".to_string()),
                PyTokenKind::Newline,
                PyTokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_blank_lines_and_comments_are_skipped() {
        let source = "# header\n\nx = 1  # trailing\n\n   \n";
        assert_eq!(
            kinds(source),
            vec![
                PyTokenKind::Identifier("x".to_string()),
                PyTokenKind::Eq,
                PyTokenKind::IntLiteral("1".to_string()),
                PyTokenKind::Newline,
                PyTokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_newlines_inside_brackets_are_ignored() {
        let source = "f(1,\n  2)\n";
        let tokens = PyLexer::new(source).tokenize_all().unwrap();
        let newlines = tokens.iter().filter(|t| t.kind == PyTokenKind::Newline).count();
        assert_eq!(newlines, 1);
        // the `2` sits on the second physical line
        assert_eq!(tokens[4].line, 2);
    }

    #[test]
    fn test_dedents_closed_at_eof() {
        let source = "class A:\n    def f(self):\n        pass";
        let tokens = kinds(source);
        let dedents = tokens.iter().filter(|k| **k == PyTokenKind::Dedent).count();
        assert_eq!(dedents, 2);
        assert_eq!(tokens.last(), Some(&PyTokenKind::Eof));
    }

    #[test]
    fn test_bad_dedent_is_an_error() {
        let source = "def f():\n        pass\n    pass\n";
        let err = PyLexer::new(source).tokenize_all().unwrap_err();
        assert_eq!(err.to_string(), "unindent does not match any outer indentation level");
        assert_eq!(err.line(), Some(3));
    }

    #[test]
    fn test_tab_space_mix_is_an_error() {
        let source = "def f():\n\tx = 1\n\t    y = 2\n        z = 3\n";
        let err = PyLexer::new(source).tokenize_all().unwrap_err();
        assert!(err.is_syntax());
    }

    #[test]
    fn test_invalid_character() {
        let err = PyLexer::new("x = $").tokenize_all().unwrap_err();
        assert_eq!(err.to_string(), "invalid character '$' (U+0024)");
    }

    #[test]
    fn test_unterminated_string() {
        let err = PyLexer::new("x = \"abc\n").tokenize_all().unwrap_err();
        assert_eq!(err.to_string(), "unterminated string literal (detected at line 1)");
    }
}
