//! Python token definitions using logos

use crate::common::Span;
use logos::Logos;
use std::fmt;

/// A token with its kind, byte span and 1-based line
#[derive(Debug, Clone)]
pub struct PyToken {
    pub kind: PyTokenKind,
    pub span: Span,
    pub line: usize,
}

impl PyToken {
    pub fn new(kind: PyTokenKind, span: Span, line: usize) -> Self {
        Self { kind, span, line }
    }
}

/// Token kinds
///
/// `Indent`, `Dedent` and `Eof` are never produced by logos; the scanner
/// synthesizes them from line structure.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\f]+")]
#[logos(skip r"#[^\r\n]*")]
pub enum PyTokenKind {
    #[regex(r"\r?\n")]
    Newline,

    // Keywords - supported
    #[token("def")]
    Def,
    #[token("class")]
    Class,
    #[token("return")]
    Return,
    #[token("pass")]
    Pass,
    #[token("import")]
    Import,
    #[token("from")]
    From,
    #[token("as")]
    As,
    #[token("and")]
    And,
    #[token("or")]
    Or,
    #[token("not")]
    Not,
    #[token("True")]
    True,
    #[token("False")]
    False,
    #[token("None")]
    NoneLit,

    // Keywords - recognized so they can be rejected with a clear message
    #[token("if")]
    If,
    #[token("elif")]
    Elif,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("for")]
    For,
    #[token("in")]
    In,
    #[token("is")]
    Is,
    #[token("with")]
    With,
    #[token("try")]
    Try,
    #[token("except")]
    Except,
    #[token("finally")]
    Finally,
    #[token("raise")]
    Raise,
    #[token("assert")]
    Assert,
    #[token("del")]
    Del,
    #[token("global")]
    Global,
    #[token("nonlocal")]
    Nonlocal,
    #[token("lambda")]
    Lambda,
    #[token("yield")]
    Yield,
    #[token("async")]
    Async,
    #[token("await")]
    Await,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,

    // Numeric literals
    #[regex(r"0[xX][0-9a-fA-F][0-9a-fA-F_]*", priority = 3, callback = |lex| lex.slice().to_string())]
    HexLiteral(String),
    #[regex(r"0[oO][0-7][0-7_]*", priority = 3, callback = |lex| lex.slice().to_string())]
    OctLiteral(String),
    #[regex(r"0[bB][01][01_]*", priority = 3, callback = |lex| lex.slice().to_string())]
    BinLiteral(String),
    #[regex(r"[0-9][0-9_]*", priority = 2, callback = |lex| lex.slice().to_string())]
    IntLiteral(String),
    #[regex(r"[0-9][0-9_]*\.[0-9][0-9_]*([eE][+-]?[0-9]+)?", priority = 3, callback = |lex| lex.slice().to_string())]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9]+", priority = 3, callback = |lex| lex.slice().to_string())]
    FloatLiteral(String),

    // String literals (single line only), optional r/u/f prefix
    #[regex(r#"[rRuUfF]?"([^"\\\r\n]|\\.)*""#, callback = |lex| lex.slice().to_string())]
    #[regex(r#"[rRuUfF]?'([^'\\\r\n]|\\.)*'"#, callback = |lex| lex.slice().to_string())]
    StringLiteral(String),

    #[regex(r#"[bB]"([^"\\\r\n]|\\.)*""#, callback = |lex| lex.slice().to_string())]
    #[regex(r#"[bB]'([^'\\\r\n]|\\.)*'"#, callback = |lex| lex.slice().to_string())]
    BytesLiteral(String),

    // Identifiers
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", priority = 1, callback = |lex| lex.slice().to_string())]
    Identifier(String),

    // Multi-character operators (order matters - longer first)
    #[token("...")]
    Ellipsis,
    #[token("->")]
    Arrow,
    #[token("**")]
    StarStar,
    #[token("//")]
    SlashSlash,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("%=")]
    PercentEq,
    #[token(":=")]
    Walrus,

    // Single-character operators
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("|")]
    Pipe,
    #[token("&")]
    Amp,
    #[token("^")]
    Caret,
    #[token("~")]
    Tilde,
    #[token("=")]
    Eq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("@")]
    At,

    // Delimiters
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,

    // Punctuation
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,
    #[token(";")]
    Semi,

    // Synthesized by the scanner
    Indent,
    Dedent,
    Eof,
}

impl PyTokenKind {
    /// Opening bracket: newlines are not significant until it closes
    pub fn opens_group(&self) -> bool {
        matches!(self, PyTokenKind::LParen | PyTokenKind::LBracket | PyTokenKind::LBrace)
    }

    pub fn closes_group(&self) -> bool {
        matches!(self, PyTokenKind::RParen | PyTokenKind::RBracket | PyTokenKind::RBrace)
    }

    /// Keywords this checker recognizes but does not support
    pub fn is_unsupported_keyword(&self) -> bool {
        matches!(
            self,
            PyTokenKind::If
                | PyTokenKind::Elif
                | PyTokenKind::Else
                | PyTokenKind::While
                | PyTokenKind::For
                | PyTokenKind::In
                | PyTokenKind::Is
                | PyTokenKind::With
                | PyTokenKind::Try
                | PyTokenKind::Except
                | PyTokenKind::Finally
                | PyTokenKind::Raise
                | PyTokenKind::Assert
                | PyTokenKind::Del
                | PyTokenKind::Global
                | PyTokenKind::Nonlocal
                | PyTokenKind::Lambda
                | PyTokenKind::Yield
                | PyTokenKind::Async
                | PyTokenKind::Await
                | PyTokenKind::Break
                | PyTokenKind::Continue
        )
    }
}

impl fmt::Display for PyTokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PyTokenKind::Newline => write!(f, "NEWLINE"),

            // Keywords
            PyTokenKind::Def => write!(f, "def"),
            PyTokenKind::Class => write!(f, "class"),
            PyTokenKind::Return => write!(f, "return"),
            PyTokenKind::Pass => write!(f, "pass"),
            PyTokenKind::Import => write!(f, "import"),
            PyTokenKind::From => write!(f, "from"),
            PyTokenKind::As => write!(f, "as"),
            PyTokenKind::And => write!(f, "and"),
            PyTokenKind::Or => write!(f, "or"),
            PyTokenKind::Not => write!(f, "not"),
            PyTokenKind::True => write!(f, "True"),
            PyTokenKind::False => write!(f, "False"),
            PyTokenKind::NoneLit => write!(f, "None"),
            PyTokenKind::If => write!(f, "if"),
            PyTokenKind::Elif => write!(f, "elif"),
            PyTokenKind::Else => write!(f, "else"),
            PyTokenKind::While => write!(f, "while"),
            PyTokenKind::For => write!(f, "for"),
            PyTokenKind::In => write!(f, "in"),
            PyTokenKind::Is => write!(f, "is"),
            PyTokenKind::With => write!(f, "with"),
            PyTokenKind::Try => write!(f, "try"),
            PyTokenKind::Except => write!(f, "except"),
            PyTokenKind::Finally => write!(f, "finally"),
            PyTokenKind::Raise => write!(f, "raise"),
            PyTokenKind::Assert => write!(f, "assert"),
            PyTokenKind::Del => write!(f, "del"),
            PyTokenKind::Global => write!(f, "global"),
            PyTokenKind::Nonlocal => write!(f, "nonlocal"),
            PyTokenKind::Lambda => write!(f, "lambda"),
            PyTokenKind::Yield => write!(f, "yield"),
            PyTokenKind::Async => write!(f, "async"),
            PyTokenKind::Await => write!(f, "await"),
            PyTokenKind::Break => write!(f, "break"),
            PyTokenKind::Continue => write!(f, "continue"),

            // Literals
            PyTokenKind::HexLiteral(s) => write!(f, "{}", s),
            PyTokenKind::OctLiteral(s) => write!(f, "{}", s),
            PyTokenKind::BinLiteral(s) => write!(f, "{}", s),
            PyTokenKind::IntLiteral(s) => write!(f, "{}", s),
            PyTokenKind::FloatLiteral(s) => write!(f, "{}", s),
            PyTokenKind::StringLiteral(s) => write!(f, "{}", s),
            PyTokenKind::BytesLiteral(s) => write!(f, "{}", s),
            PyTokenKind::Identifier(s) => write!(f, "{}", s),

            // Operators
            PyTokenKind::Ellipsis => write!(f, "..."),
            PyTokenKind::Arrow => write!(f, "->"),
            PyTokenKind::StarStar => write!(f, "**"),
            PyTokenKind::SlashSlash => write!(f, "//"),
            PyTokenKind::EqEq => write!(f, "=="),
            PyTokenKind::NotEq => write!(f, "!="),
            PyTokenKind::LtEq => write!(f, "<="),
            PyTokenKind::GtEq => write!(f, ">="),
            PyTokenKind::PlusEq => write!(f, "+="),
            PyTokenKind::MinusEq => write!(f, "-="),
            PyTokenKind::StarEq => write!(f, "*="),
            PyTokenKind::SlashEq => write!(f, "/="),
            PyTokenKind::PercentEq => write!(f, "%="),
            PyTokenKind::Walrus => write!(f, ":="),
            PyTokenKind::Plus => write!(f, "+"),
            PyTokenKind::Minus => write!(f, "-"),
            PyTokenKind::Star => write!(f, "*"),
            PyTokenKind::Slash => write!(f, "/"),
            PyTokenKind::Percent => write!(f, "%"),
            PyTokenKind::Pipe => write!(f, "|"),
            PyTokenKind::Amp => write!(f, "&"),
            PyTokenKind::Caret => write!(f, "^"),
            PyTokenKind::Tilde => write!(f, "~"),
            PyTokenKind::Eq => write!(f, "="),
            PyTokenKind::Lt => write!(f, "<"),
            PyTokenKind::Gt => write!(f, ">"),
            PyTokenKind::At => write!(f, "@"),

            // Delimiters
            PyTokenKind::LParen => write!(f, "("),
            PyTokenKind::RParen => write!(f, ")"),
            PyTokenKind::LBracket => write!(f, "["),
            PyTokenKind::RBracket => write!(f, "]"),
            PyTokenKind::LBrace => write!(f, "{{"),
            PyTokenKind::RBrace => write!(f, "}}"),

            // Punctuation
            PyTokenKind::Comma => write!(f, ","),
            PyTokenKind::Colon => write!(f, ":"),
            PyTokenKind::Dot => write!(f, "."),
            PyTokenKind::Semi => write!(f, ";"),

            PyTokenKind::Indent => write!(f, "INDENT"),
            PyTokenKind::Dedent => write!(f, "DEDENT"),
            PyTokenKind::Eof => write!(f, "EOF"),
        }
    }
}
