//! Python AST definitions

mod types;
mod expr;
mod stmt;

pub use types::*;
pub use expr::*;
pub use stmt::*;

use crate::common::Span;

/// A complete source file
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub body: Vec<Stmt>,
    pub span: Span,
}

impl Module {
    pub fn new(body: Vec<Stmt>, span: Span) -> Self {
        Self { body, span }
    }
}
