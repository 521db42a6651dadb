//! Semantic types
//!
//! Types print the way mypy prints them in diagnostics, minus module
//! qualification: `int`, `A`, `int | None`, `def (x: int) -> int`.

use std::fmt;

/// A semantic type
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    /// Built-in scalar type
    Primitive(PrimitiveType),
    /// Instance of a user-defined class
    Class(ClassType),
    /// Function, method or class constructor
    Function(FunctionType),
    /// `Optional[T]` / `T | None`
    Optional(Box<Type>),
    /// Could not be determined; compatible with everything
    Unknown,
    /// The type of `None`
    NoneType,
}

/// Built-in scalar types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Int,
    Float,
    Str,
    Bool,
    Bytes,
}

impl PrimitiveType {
    /// Look up a builtin by its annotation name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "int" => Some(PrimitiveType::Int),
            "float" => Some(PrimitiveType::Float),
            "str" => Some(PrimitiveType::Str),
            "bool" => Some(PrimitiveType::Bool),
            "bytes" => Some(PrimitiveType::Bytes),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PrimitiveType::Int => "int",
            PrimitiveType::Float => "float",
            PrimitiveType::Str => "str",
            PrimitiveType::Bool => "bool",
            PrimitiveType::Bytes => "bytes",
        }
    }

    /// int, float and bool take part in arithmetic
    pub fn is_numeric(self) -> bool {
        matches!(self, PrimitiveType::Int | PrimitiveType::Float | PrimitiveType::Bool)
    }
}

/// A class instance type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassType {
    pub name: String,
    /// Names of all base classes, nearest first
    pub ancestors: Vec<String>,
}

impl ClassType {
    pub fn new(name: impl Into<String>, ancestors: Vec<String>) -> Self {
        Self { name: name.into(), ancestors }
    }

    /// True if this class is `name` or inherits from it
    pub fn is_subclass_of(&self, name: &str) -> bool {
        self.name == name || self.ancestors.iter().any(|a| a == name)
    }
}

/// A callable signature
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionType {
    /// Name used in call diagnostics
    pub name: Option<String>,
    /// Owning class for methods
    pub owner: Option<String>,
    pub params: Vec<Parameter>,
    pub ret: Box<Type>,
}

/// A parameter of a callable signature
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub ty: Type,
    pub has_default: bool,
}

impl FunctionType {
    pub fn new(name: impl Into<String>, params: Vec<Parameter>, ret: Type) -> Self {
        Self {
            name: Some(name.into()),
            owner: None,
            params,
            ret: Box::new(ret),
        }
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// How diagnostics refer to the callee: `"f"` or `"m" of "A"`
    pub fn describe(&self) -> Option<String> {
        let name = self.name.as_ref()?;
        Some(match &self.owner {
            Some(owner) => format!("\"{}\" of \"{}\"", name, owner),
            None => format!("\"{}\"", name),
        })
    }

    /// Number of parameters without a default value
    pub fn required_count(&self) -> usize {
        self.params.iter().filter(|p| !p.has_default).count()
    }

    /// Signature as seen through a bound instance, without `self`
    pub fn bound(&self) -> FunctionType {
        let mut bound = self.clone();
        if !bound.params.is_empty() {
            bound.params.remove(0);
        }
        bound
    }
}

impl Type {
    pub fn int() -> Self {
        Type::Primitive(PrimitiveType::Int)
    }

    pub fn float() -> Self {
        Type::Primitive(PrimitiveType::Float)
    }

    pub fn str() -> Self {
        Type::Primitive(PrimitiveType::Str)
    }

    pub fn bool() -> Self {
        Type::Primitive(PrimitiveType::Bool)
    }

    pub fn bytes() -> Self {
        Type::Primitive(PrimitiveType::Bytes)
    }

    pub fn class(name: impl Into<String>) -> Self {
        Type::Class(ClassType::new(name, Vec::new()))
    }

    /// Wrap in `Optional`, collapsing `Optional[None]` and nested optionals
    pub fn optional(inner: Type) -> Self {
        match inner {
            Type::NoneType | Type::Optional(_) | Type::Unknown => inner,
            other => Type::Optional(Box::new(other)),
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Type::Unknown)
    }

    pub fn as_primitive(&self) -> Option<PrimitiveType> {
        match self {
            Type::Primitive(p) => Some(*p),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(p) => f.write_str(p.name()),
            Type::Class(c) => f.write_str(&c.name),
            Type::Function(func) => write!(f, "{}", func),
            Type::Optional(inner) => write!(f, "{} | None", inner),
            Type::Unknown => f.write_str("Any"),
            Type::NoneType => f.write_str("None"),
        }
    }
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "def (")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", param.name, param.ty)?;
            if param.has_default {
                write!(f, " =")?;
            }
        }
        write!(f, ") -> {}", self.ret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Type::int().to_string(), "int");
        assert_eq!(Type::class("Point").to_string(), "Point");
        assert_eq!(Type::Unknown.to_string(), "Any");
        assert_eq!(Type::NoneType.to_string(), "None");
        assert_eq!(Type::optional(Type::str()).to_string(), "str | None");
    }

    #[test]
    fn test_function_display() {
        let func = FunctionType::new(
            "f",
            vec![
                Parameter { name: "x".into(), ty: Type::int(), has_default: false },
                Parameter { name: "y".into(), ty: Type::str(), has_default: true },
            ],
            Type::NoneType,
        );
        assert_eq!(func.to_string(), "def (x: int, y: str =) -> None");
        assert_eq!(func.required_count(), 1);
    }

    #[test]
    fn test_describe() {
        let func = FunctionType::new("move", Vec::new(), Type::NoneType);
        assert_eq!(func.describe().as_deref(), Some("\"move\""));
        let method = func.with_owner("Point");
        assert_eq!(method.describe().as_deref(), Some("\"move\" of \"Point\""));
    }

    #[test]
    fn test_optional_collapses() {
        assert_eq!(Type::optional(Type::NoneType), Type::NoneType);
        let once = Type::optional(Type::int());
        assert_eq!(Type::optional(once.clone()), once);
    }

    #[test]
    fn test_bound_drops_self() {
        let method = FunctionType::new(
            "get",
            vec![
                Parameter { name: "self".into(), ty: Type::class("A"), has_default: false },
                Parameter { name: "key".into(), ty: Type::str(), has_default: false },
            ],
            Type::int(),
        );
        let bound = method.bound();
        assert_eq!(bound.params.len(), 1);
        assert_eq!(bound.params[0].name, "key");
    }
}
