//! Annotation resolution

use super::checker::Checker;
use super::scope::BindingKind;
use crate::frontend::ast::{Annotation, TypeExpr};
use crate::types::{PrimitiveType, Type};

impl Checker {
    /// Semantic type of an annotation in the current scope
    ///
    /// Anything the type model cannot express (generics, general unions,
    /// unresolved names) becomes `Unknown`.
    pub(super) fn resolve_annotation(&self, annotation: &Annotation) -> Type {
        self.resolve_type_expr(&annotation.expr)
    }

    fn resolve_type_expr(&self, expr: &TypeExpr) -> Type {
        match expr {
            TypeExpr::None => Type::NoneType,
            TypeExpr::Name(name) => self.resolve_type_name(name),
            TypeExpr::Subscript { base, args } => match TypeExpr::base_name(base) {
                "Optional" if args.len() == 1 => Type::optional(self.resolve_type_expr(&args[0])),
                "Union" => self.resolve_union(args),
                _ => Type::Unknown,
            },
            TypeExpr::Union(members) => self.resolve_union(members),
            TypeExpr::Str(_) | TypeExpr::Other => Type::Unknown,
        }
    }

    fn resolve_type_name(&self, name: &str) -> Type {
        if name.contains('.') {
            return Type::Unknown;
        }
        if let Some(primitive) = PrimitiveType::from_name(name) {
            return Type::Primitive(primitive);
        }
        match self.env.lookup_binding(name) {
            Some(binding) if binding.kind == BindingKind::Class => self.instance_type(name),
            _ => Type::Unknown,
        }
    }

    /// `T | None` in any spelling becomes `Optional(T)`
    fn resolve_union(&self, members: &[TypeExpr]) -> Type {
        let mut has_none = false;
        let mut others: Vec<Type> = Vec::new();

        for member in members {
            let ty = match self.resolve_type_expr(member) {
                Type::NoneType => {
                    has_none = true;
                    continue;
                }
                Type::Optional(inner) => {
                    has_none = true;
                    *inner
                }
                ty => ty,
            };
            if !others.contains(&ty) {
                others.push(ty);
            }
        }

        match (others.len(), has_none) {
            (0, _) => Type::NoneType,
            (1, true) => Type::optional(others.remove(0)),
            (1, false) => others.remove(0),
            _ => Type::Unknown,
        }
    }
}
