//! Statement AST nodes

use super::{Annotation, Expr};
use crate::common::Span;

/// A statement
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
    pub line: usize,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span, line: usize) -> Self {
        Self { kind, span, line }
    }
}

/// Statement kinds
#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// Class definition
    ClassDef(ClassDef),
    /// Function or method definition
    FunctionDef(FunctionDef),
    /// Plain assignment: x = 1, obj.attr = 1
    Assign { target: Expr, value: Expr },
    /// Annotated assignment: x: int = 1, x: int
    AnnAssign {
        target: Expr,
        annotation: Annotation,
        value: Option<Expr>,
    },
    /// return / return expr
    Return(Option<Expr>),
    /// Expression statement: f(x)
    Expr(Expr),
    /// import a.b / from a import b as c
    Import(Vec<ImportedName>),
    /// pass
    Pass,
}

/// A `def` statement
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<Param>,
    pub returns: Option<Annotation>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// A function parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub annotation: Option<Annotation>,
    pub default: Option<Expr>,
    pub span: Span,
    pub line: usize,
}

/// A `class` statement
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDef {
    pub name: String,
    pub bases: Vec<Expr>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// A name bound by an import statement
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedName {
    /// Dotted path being imported, e.g. `typing.Optional`
    pub path: String,
    /// Local name the import binds
    pub binding: String,
}
