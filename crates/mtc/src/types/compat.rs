//! Type compatibility

use super::{PrimitiveType, Type};
use crate::frontend::ast::Constant;

/// Can a value of type `source` be assigned to a slot of type `target`?
pub fn compatible(source: &Type, target: &Type) -> bool {
    match (source, target) {
        (Type::Unknown, _) | (_, Type::Unknown) => true,
        (Type::Primitive(s), Type::Primitive(t)) => {
            // bool is a subclass of int
            s == t || (*s == PrimitiveType::Bool && *t == PrimitiveType::Int)
        }
        (Type::NoneType, Type::NoneType | Type::Optional(_)) => true,
        (Type::Optional(s), Type::Optional(t)) => compatible(s, t),
        (Type::Optional(_), _) => false,
        (_, Type::Optional(t)) => compatible(source, t),
        (Type::Class(s), Type::Class(t)) => s.is_subclass_of(&t.name),
        (Type::Function(s), Type::Function(t)) => {
            s.params.len() == t.params.len()
                && s.params
                    .iter()
                    .zip(&t.params)
                    .all(|(sp, tp)| compatible(&tp.ty, &sp.ty))
                && compatible(&s.ret, &t.ret)
        }
        _ => false,
    }
}

/// Type of a literal constant
pub fn type_of_constant(constant: &Constant) -> Type {
    match constant {
        Constant::Int(_) => Type::int(),
        Constant::Float(_) => Type::float(),
        Constant::Str(_) => Type::str(),
        Constant::Bytes(_) => Type::bytes(),
        Constant::Bool(_) => Type::bool(),
        Constant::None => Type::NoneType,
        Constant::Ellipsis => Type::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClassType, FunctionType, Parameter};

    fn samples() -> Vec<Type> {
        vec![
            Type::int(),
            Type::float(),
            Type::str(),
            Type::bool(),
            Type::bytes(),
            Type::class("A"),
            Type::Class(ClassType::new("B", vec!["A".into()])),
            Type::optional(Type::int()),
            Type::Function(FunctionType::new(
                "f",
                vec![Parameter { name: "x".into(), ty: Type::int(), has_default: false }],
                Type::str(),
            )),
            Type::Unknown,
            Type::NoneType,
        ]
    }

    #[test]
    fn test_reflexive() {
        for ty in samples() {
            assert!(compatible(&ty, &ty), "{} should accept itself", ty);
        }
    }

    #[test]
    fn test_primitives_do_not_widen() {
        assert!(!compatible(&Type::str(), &Type::int()));
        assert!(!compatible(&Type::int(), &Type::str()));
        assert!(!compatible(&Type::int(), &Type::float()));
        assert!(!compatible(&Type::float(), &Type::int()));
        assert!(compatible(&Type::bool(), &Type::int()));
        assert!(!compatible(&Type::int(), &Type::bool()));
    }

    #[test]
    fn test_unknown_is_compatible_both_ways() {
        for ty in samples() {
            assert!(compatible(&Type::Unknown, &ty));
            assert!(compatible(&ty, &Type::Unknown));
        }
    }

    #[test]
    fn test_optional() {
        let opt = Type::optional(Type::int());
        assert!(compatible(&Type::NoneType, &opt));
        assert!(compatible(&Type::int(), &opt));
        assert!(!compatible(&Type::str(), &opt));
        assert!(!compatible(&opt, &Type::int()));
        assert!(!compatible(&Type::NoneType, &Type::int()));
    }

    #[test]
    fn test_class_inheritance() {
        let base = Type::class("Animal");
        let derived = Type::Class(ClassType::new("Dog", vec!["Animal".into()]));
        assert!(compatible(&derived, &base));
        assert!(!compatible(&base, &derived));
        assert!(!compatible(&Type::class("Cat"), &derived));
    }

    #[test]
    fn test_type_of_constant_is_deterministic() {
        let constants = [
            Constant::Int("1".into()),
            Constant::Float(1.5),
            Constant::Str("a".into()),
            Constant::Bytes(b"a".to_vec()),
            Constant::Bool(true),
            Constant::None,
        ];
        let expected = ["int", "float", "str", "bytes", "bool", "None"];
        for (constant, name) in constants.iter().zip(expected) {
            assert_eq!(type_of_constant(constant).to_string(), name);
            assert_eq!(type_of_constant(constant), type_of_constant(constant));
        }
    }
}
