//! Expression inference

use super::checker::Checker;
use super::rules::{binary_result_type, unary_result_type};
use super::scope::BindingKind;
use crate::diagnostics::ErrorCode;
use crate::frontend::ast::{Expr, ExprKind};
use crate::types::{Type, type_of_constant};

impl Checker {
    /// Infer the type of an expression, reporting any errors inside it
    pub(super) fn infer_expr(&mut self, expr: &Expr) -> Type {
        match &expr.kind {
            ExprKind::Name(name) => self.env.lookup(name),
            ExprKind::Constant(constant) => type_of_constant(constant),
            ExprKind::Attribute { value, attr } => self.infer_attribute(value, attr, expr),
            ExprKind::Call { func, args, keywords } => self.check_call(func, args, keywords, expr),
            ExprKind::RevealType(inner) => {
                let ty = self.infer_expr(inner);
                self.note(expr.line, expr.span, format!("Revealed type is \"{}\"", ty));
                ty
            }
            ExprKind::BinOp { left, op, right } => {
                let left = self.infer_expr(left);
                let right = self.infer_expr(right);
                binary_result_type(*op, &left, &right).unwrap_or_else(|err| {
                    self.error(expr.line, expr.span, err.to_string(), Some(ErrorCode::Operator));
                    Type::Unknown
                })
            }
            ExprKind::UnaryOp { op, operand } => {
                let operand = self.infer_expr(operand);
                unary_result_type(*op, &operand).unwrap_or_else(|err| {
                    self.error(expr.line, expr.span, err.to_string(), Some(ErrorCode::Operator));
                    Type::Unknown
                })
            }
        }
    }

    fn infer_attribute(&mut self, base: &Expr, attr: &str, expr: &Expr) -> Type {
        // attribute of the class object itself: A.count
        if let Some(class) = self.class_object(base) {
            return match self.env.lookup_member(&class, attr) {
                Some(member) => member.ty.clone(),
                None if self.env.has_dynamic_base(&class) => Type::Unknown,
                None => {
                    self.error(
                        expr.line,
                        expr.span,
                        format!("\"type[{}]\" has no attribute \"{}\"", class, attr),
                        Some(ErrorCode::AttrDefined),
                    );
                    Type::Unknown
                }
            };
        }

        let base_ty = self.infer_expr(base);
        self.member_type(&base_ty, attr, expr)
    }

    /// Type of `attr` on a value of type `base`
    ///
    /// Methods come back bound, without their `self` parameter. Only class
    /// instances are checked; other receivers give `Unknown`.
    pub(super) fn member_type(&mut self, base: &Type, attr: &str, expr: &Expr) -> Type {
        let Type::Class(class) = base else {
            return Type::Unknown;
        };

        match self.env.lookup_member(&class.name, attr) {
            Some(member) => match (&member.ty, member.kind) {
                (Type::Function(method), BindingKind::Function) => Type::Function(method.bound()),
                (ty, _) => ty.clone(),
            },
            None if self.env.has_dynamic_base(&class.name) => Type::Unknown,
            None => {
                self.error(
                    expr.line,
                    expr.span,
                    format!("\"{}\" has no attribute \"{}\"", class.name, attr),
                    Some(ErrorCode::AttrDefined),
                );
                Type::Unknown
            }
        }
    }

    /// Class named by a bare name, e.g. `A` in `A()` or `A.count`
    pub(super) fn class_object(&self, expr: &Expr) -> Option<String> {
        let name = expr.as_name()?;
        let binding = self.env.lookup_binding(name)?;
        (binding.kind == BindingKind::Class).then(|| name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use crate::sema::check_lines;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_reveal_literal() {
        assert_eq!(check_lines("reveal_type(1)\n"), vec!["t.py:1: note: Revealed type is \"int\""]);
    }

    #[test]
    fn test_reveal_integer_literals() {
        let source = "reveal_type(99999999999999999999)\nreveal_type(0b11 + 0o7)\n";
        assert_eq!(
            check_lines(source),
            vec![
                "t.py:1: note: Revealed type is \"int\"",
                "t.py:2: note: Revealed type is \"int\"",
            ]
        );
    }

    #[test]
    fn test_reveal_names() {
        let source = "\
a: str = \"x\"
b = 1.5
reveal_type(a)
reveal_type(b)
reveal_type(None)
reveal_type(undefined_name)
";
        assert_eq!(
            check_lines(source),
            vec![
                "t.py:3: note: Revealed type is \"str\"",
                "t.py:4: note: Revealed type is \"float\"",
                "t.py:5: note: Revealed type is \"None\"",
                "t.py:6: note: Revealed type is \"Any\"",
            ]
        );
    }

    #[test]
    fn test_reveal_operators() {
        let source = "\
reveal_type(1 + 2)
reveal_type(1 / 2)
reveal_type(1 < 2)
reveal_type(not 1)
reveal_type(-2.0)
";
        assert_eq!(
            check_lines(source),
            vec![
                "t.py:1: note: Revealed type is \"int\"",
                "t.py:2: note: Revealed type is \"float\"",
                "t.py:3: note: Revealed type is \"bool\"",
                "t.py:4: note: Revealed type is \"bool\"",
                "t.py:5: note: Revealed type is \"float\"",
            ]
        );
    }

    #[test]
    fn test_operand_errors() {
        let source = "\
x = 1 + \"a\"
y = -\"a\"
reveal_type(x)
";
        assert_eq!(
            check_lines(source),
            vec![
                "t.py:1: error: Unsupported operand types for + (\"int\" and \"str\")  [operator]",
                "t.py:2: error: Unsupported operand type for unary - (\"str\")  [operator]",
                "t.py:3: note: Revealed type is \"Any\"",
            ]
        );
    }

    #[test]
    fn test_attributes() {
        let source = "\
class Point:
    x: int = 0
    label: str = \"\"

p = Point()
reveal_type(p.x)
reveal_type(Point.label)
p.y
";
        assert_eq!(
            check_lines(source),
            vec![
                "t.py:6: note: Revealed type is \"int\"",
                "t.py:7: note: Revealed type is \"str\"",
                "t.py:8: error: \"Point\" has no attribute \"y\"  [attr-defined]",
            ]
        );
    }

    #[test]
    fn test_bound_method_type() {
        let source = "\
class Counter:
    def add(self, n: int) -> int:
        return n

reveal_type(Counter().add)
";
        assert_eq!(
            check_lines(source),
            vec!["t.py:5: note: Revealed type is \"def (n: int) -> int\""]
        );
    }

    #[test]
    fn test_unknown_base_allows_any_attribute() {
        let source = "\
from somewhere import Base

class Child(Base):
    pass

reveal_type(Child().anything)
";
        assert_eq!(check_lines(source), vec!["t.py:6: note: Revealed type is \"Any\""]);
    }
}
