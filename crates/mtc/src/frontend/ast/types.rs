//! Type annotation AST nodes

use crate::common::Span;
use std::fmt;

/// A type annotation as written in the source
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Raw source text, e.g. `Optional[int]`
    pub text: String,
    pub expr: TypeExpr,
    pub span: Span,
}

/// Parsed annotation syntax
///
/// Resolution to semantic types happens in the checker, since names such as
/// class names depend on the scope the annotation appears in.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    /// int, A, typing.Optional
    Name(String),
    /// None
    None,
    /// Optional[int], Union[int, None], list[str]
    Subscript { base: String, args: Vec<TypeExpr> },
    /// int | None
    Union(Vec<TypeExpr>),
    /// "A" (forward reference)
    Str(String),
    /// Anything else the annotation grammar accepts but the checker ignores
    Other,
}

impl TypeExpr {
    /// Last segment of a dotted name: `typing.Optional` -> `Optional`
    pub fn base_name(name: &str) -> &str {
        name.rsplit('.').next().unwrap_or(name)
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Name(name) => write!(f, "{}", name),
            TypeExpr::None => write!(f, "None"),
            TypeExpr::Subscript { base, args } => {
                write!(f, "{}[", base)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, "]")
            }
            TypeExpr::Union(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{}", member)?;
                }
                Ok(())
            }
            TypeExpr::Str(s) => write!(f, "{:?}", s),
            TypeExpr::Other => write!(f, "..."),
        }
    }
}
