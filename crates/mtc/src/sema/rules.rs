//! Operator typing rules

use crate::frontend::ast::{BinOp, UnaryOp};
use crate::types::{PrimitiveType, Type};
use thiserror::Error;

/// An operator applied to operands it does not support
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OperatorError {
    #[error("Unsupported operand types for {op} (\"{left}\" and \"{right}\")")]
    Binary { op: BinOp, left: Type, right: Type },

    #[error("Unsupported left operand type for {op} (\"{left}\")")]
    Left { op: BinOp, left: Type },

    #[error("Unsupported operand type for unary {op} (\"{operand}\")")]
    Unary { op: UnaryOp, operand: Type },
}

/// Result type of `left op right`
pub fn binary_result_type(op: BinOp, left: &Type, right: &Type) -> Result<Type, OperatorError> {
    if op.is_logical() {
        return Ok(if left == right { left.clone() } else { Type::Unknown });
    }
    if matches!(op, BinOp::Eq | BinOp::NotEq) {
        return Ok(Type::bool());
    }
    if left.is_unknown() || right.is_unknown() {
        return Ok(if op.is_comparison() { Type::bool() } else { Type::Unknown });
    }
    if matches!(left, Type::NoneType) {
        return Err(OperatorError::Left { op, left: left.clone() });
    }

    let mismatch = || OperatorError::Binary {
        op,
        left: left.clone(),
        right: right.clone(),
    };

    let (l, r) = match (left, right) {
        (Type::Primitive(l), Type::Primitive(r)) => (*l, *r),
        (Type::Primitive(_), Type::NoneType) => return Err(mismatch()),
        // operator overloading on classes is not modelled
        _ => return Ok(if op.is_comparison() { Type::bool() } else { Type::Unknown }),
    };

    if op.is_comparison() {
        let comparable = (l.is_numeric() && r.is_numeric()) || l == r;
        return if comparable { Ok(Type::bool()) } else { Err(mismatch()) };
    }

    primitive_result(op, l, r).map(Type::Primitive).ok_or_else(mismatch)
}

fn primitive_result(op: BinOp, l: PrimitiveType, r: PrimitiveType) -> Option<PrimitiveType> {
    use PrimitiveType::{Bool, Bytes, Float, Int, Str};

    let numeric = || {
        if !(l.is_numeric() && r.is_numeric()) {
            None
        } else if l == Float || r == Float {
            Some(Float)
        } else {
            Some(Int)
        }
    };

    match op {
        BinOp::Add => match (l, r) {
            (Str, Str) => Some(Str),
            (Bytes, Bytes) => Some(Bytes),
            _ => numeric(),
        },
        BinOp::Mul => match (l, r) {
            (Str, Int | Bool) | (Int | Bool, Str) => Some(Str),
            (Bytes, Int | Bool) | (Int | Bool, Bytes) => Some(Bytes),
            _ => numeric(),
        },
        // printf-style formatting
        BinOp::Mod if l == Str => Some(Str),
        BinOp::Mod if l == Bytes => Some(Bytes),
        BinOp::Div => numeric().map(|_| Float),
        BinOp::Sub | BinOp::FloorDiv | BinOp::Mod | BinOp::Pow => numeric(),
        BinOp::BitOr | BinOp::BitAnd | BinOp::BitXor => match (l, r) {
            (Bool, Bool) => Some(Bool),
            (Int | Bool, Int | Bool) => Some(Int),
            _ => None,
        },
        _ => None,
    }
}

/// Result type of `op operand`
pub fn unary_result_type(op: UnaryOp, operand: &Type) -> Result<Type, OperatorError> {
    if op == UnaryOp::Not {
        return Ok(Type::bool());
    }

    let unsupported = || OperatorError::Unary { op, operand: operand.clone() };

    match operand {
        Type::Primitive(p) => match (op, p) {
            (UnaryOp::Neg | UnaryOp::Pos, PrimitiveType::Float) => Ok(Type::float()),
            (_, PrimitiveType::Int | PrimitiveType::Bool) => Ok(Type::int()),
            _ => Err(unsupported()),
        },
        Type::NoneType => Err(unsupported()),
        _ => Ok(Type::Unknown),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_arithmetic() {
        assert_eq!(binary_result_type(BinOp::Add, &Type::int(), &Type::int()), Ok(Type::int()));
        assert_eq!(binary_result_type(BinOp::Add, &Type::int(), &Type::float()), Ok(Type::float()));
        assert_eq!(binary_result_type(BinOp::Div, &Type::int(), &Type::int()), Ok(Type::float()));
        assert_eq!(binary_result_type(BinOp::Add, &Type::str(), &Type::str()), Ok(Type::str()));
        assert_eq!(binary_result_type(BinOp::Mul, &Type::str(), &Type::int()), Ok(Type::str()));
        assert_eq!(binary_result_type(BinOp::Mod, &Type::str(), &Type::int()), Ok(Type::str()));
        assert_eq!(binary_result_type(BinOp::BitAnd, &Type::bool(), &Type::bool()), Ok(Type::bool()));
    }

    #[test]
    fn test_mismatched_operands() {
        let err = binary_result_type(BinOp::Add, &Type::int(), &Type::str()).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported operand types for + (\"int\" and \"str\")");

        let err = binary_result_type(BinOp::Sub, &Type::str(), &Type::str()).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported operand types for - (\"str\" and \"str\")");

        let err = binary_result_type(BinOp::Lt, &Type::int(), &Type::str()).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported operand types for < (\"int\" and \"str\")");
    }

    #[test]
    fn test_none_operand() {
        let err = binary_result_type(BinOp::Add, &Type::NoneType, &Type::int()).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported left operand type for + (\"None\")");

        let err = binary_result_type(BinOp::Add, &Type::int(), &Type::NoneType).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported operand types for + (\"int\" and \"None\")");
    }

    #[test]
    fn test_unknown_operands_pass() {
        assert_eq!(binary_result_type(BinOp::Add, &Type::Unknown, &Type::str()), Ok(Type::Unknown));
        assert_eq!(binary_result_type(BinOp::Gt, &Type::int(), &Type::Unknown), Ok(Type::bool()));
        assert_eq!(binary_result_type(BinOp::Eq, &Type::int(), &Type::str()), Ok(Type::bool()));
    }

    #[test]
    fn test_logical() {
        assert_eq!(binary_result_type(BinOp::And, &Type::int(), &Type::int()), Ok(Type::int()));
        assert_eq!(binary_result_type(BinOp::Or, &Type::int(), &Type::str()), Ok(Type::Unknown));
    }

    #[test]
    fn test_unary() {
        assert_eq!(unary_result_type(UnaryOp::Neg, &Type::float()), Ok(Type::float()));
        assert_eq!(unary_result_type(UnaryOp::Neg, &Type::bool()), Ok(Type::int()));
        assert_eq!(unary_result_type(UnaryOp::Not, &Type::str()), Ok(Type::bool()));

        let err = unary_result_type(UnaryOp::Neg, &Type::str()).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported operand type for unary - (\"str\")");

        let err = unary_result_type(UnaryOp::Invert, &Type::float()).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported operand type for unary ~ (\"float\")");
    }
}
