//! Statement checking
//!
//! The checker makes a single top-down pass over the module. Type errors are
//! collected as diagnostics and never stop the walk.

use super::scope::{Binding, BindingKind, Environment, ScopeKind};
use crate::common::Span;
use crate::diagnostics::{Diagnostic, ErrorCode};
use crate::frontend::ast::*;
use crate::types::{ClassType, FunctionType, Parameter, Type, compatible};

/// The function whose body is being checked
#[derive(Debug, Clone)]
pub(super) struct FunctionContext {
    /// Declared return type, `None` when the function has no annotation
    pub ret: Option<Type>,
    /// `self` parameter name and owning class for methods
    pub receiver: Option<(String, String)>,
}

/// Type checker for one module
pub struct Checker {
    pub(super) env: Environment,
    pub(super) diagnostics: Vec<Diagnostic>,
    pub(super) function: Option<FunctionContext>,
}

impl Checker {
    pub fn new(env: Environment) -> Self {
        Self {
            env,
            diagnostics: Vec::new(),
            function: None,
        }
    }

    /// Check a module and return its diagnostics in emission order
    #[tracing::instrument(level = "debug", skip_all, fields(statements = module.body.len()))]
    pub fn check(mut self, module: &Module) -> Vec<Diagnostic> {
        self.check_block(&module.body);
        tracing::debug!(diagnostics = self.diagnostics.len(), "checked module");
        self.diagnostics
    }

    // ==================== Diagnostics ====================

    pub(super) fn error(&mut self, line: usize, span: Span, message: impl Into<String>, code: Option<ErrorCode>) {
        let diagnostic = Diagnostic::error(line, span, message, code);
        tracing::trace!(line, message = %diagnostic.message, "error");
        self.diagnostics.push(diagnostic);
    }

    pub(super) fn note(&mut self, line: usize, span: Span, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::note(line, span, message));
    }

    fn report_incompatible_assignment(&mut self, source: &Type, target: &Type, value: &Expr) {
        self.error(
            value.line,
            value.span,
            format!(
                "Incompatible types in assignment (expression has type \"{}\", variable has type \"{}\")",
                source, target
            ),
            Some(ErrorCode::Assignment),
        );
    }

    /// Run `f` inside a new scope that is always popped afterwards
    fn in_scope<T>(&mut self, kind: ScopeKind, f: impl FnOnce(&mut Self) -> T) -> T {
        self.env.push(kind);
        let result = f(self);
        self.env.pop();
        result
    }

    // ==================== Statements ====================

    fn check_block(&mut self, body: &[Stmt]) {
        for stmt in body {
            self.check_stmt(stmt);
        }
    }

    fn check_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::ClassDef(class) => self.check_class_def(class, stmt.line),
            StmtKind::FunctionDef(func) => {
                let signature = self.declare_function(func, stmt.line);
                self.check_function_body(func, &signature);
            }
            StmtKind::Assign { target, value } => self.check_assign(target, value),
            StmtKind::AnnAssign { target, annotation, value } => {
                self.check_ann_assign(target, annotation, value.as_ref(), stmt);
            }
            StmtKind::Return(value) => self.check_return(value.as_ref(), stmt),
            StmtKind::Expr(expr) => {
                self.infer_expr(expr);
            }
            StmtKind::Import(names) => {
                for name in names {
                    self.env.bind(Binding::new(&name.binding, Type::Unknown, stmt.line, BindingKind::Import));
                }
            }
            StmtKind::Pass => {}
        }
    }

    fn check_ann_assign(&mut self, target: &Expr, annotation: &Annotation, value: Option<&Expr>, stmt: &Stmt) {
        let declared = self.resolve_annotation(annotation);

        match &target.kind {
            ExprKind::Name(name) => {
                let binding = Binding::new(name, declared.clone(), stmt.line, BindingKind::Variable).declared();
                if let Err(conflict) = self.env.declare(binding) {
                    self.error(stmt.line, target.span, conflict.to_string(), Some(ErrorCode::NoRedef));
                }
            }
            ExprKind::Attribute { value: base, attr } => match self.receiver_class(base) {
                Some(class) => {
                    let binding = Binding::new(attr, declared.clone(), stmt.line, BindingKind::Variable).declared();
                    if let Err(conflict) = self.env.declare_member(&class, binding) {
                        self.error(stmt.line, target.span, conflict.to_string(), Some(ErrorCode::NoRedef));
                    }
                }
                None => {
                    self.infer_expr(base);
                }
            },
            _ => {}
        }

        if let Some(value) = value {
            let value_ty = self.infer_expr(value);
            if !compatible(&value_ty, &declared) {
                self.report_incompatible_assignment(&value_ty, &declared, value);
            }
        }
    }

    fn check_assign(&mut self, target: &Expr, value: &Expr) {
        let value_ty = self.infer_expr(value);

        match &target.kind {
            ExprKind::Name(name) => self.assign_name(name, value_ty, value, target.line),
            ExprKind::Attribute { value: base, attr } => {
                self.assign_attribute(base, attr, value_ty, value, target);
            }
            _ => {}
        }
    }

    /// Assignment to a plain name in the current scope
    fn assign_name(&mut self, name: &str, value_ty: Type, value: &Expr, line: usize) {
        let existing = self.env.local(name).map(|b| (b.declared, b.ty.clone()));
        match existing {
            Some((true, declared)) => {
                if !compatible(&value_ty, &declared) {
                    self.report_incompatible_assignment(&value_ty, &declared, value);
                }
            }
            Some((false, _)) => {
                if let Some(binding) = self.env.local_mut(name) {
                    binding.ty = value_ty;
                }
            }
            None => self.env.bind(Binding::new(name, value_ty, line, BindingKind::Variable)),
        }
    }

    fn assign_attribute(&mut self, base: &Expr, attr: &str, value_ty: Type, value: &Expr, target: &Expr) {
        let Some(class) = self.receiver_class(base) else {
            let base_ty = self.infer_expr(base);
            let member_ty = self.member_type(&base_ty, attr, target);
            if !compatible(&value_ty, &member_ty) {
                self.report_incompatible_assignment(&value_ty, &member_ty, value);
            }
            return;
        };

        let existing = self.env.lookup_member(&class, attr).map(|b| (b.declared, b.ty.clone()));
        match existing {
            Some((true, declared)) => {
                if !compatible(&value_ty, &declared) {
                    self.report_incompatible_assignment(&value_ty, &declared, value);
                }
            }
            Some((false, _)) => {
                if let Some(member) = self.env.lookup_member_mut(&class, attr) {
                    member.ty = value_ty;
                }
            }
            None => {
                let binding = Binding::new(attr, value_ty, target.line, BindingKind::Variable);
                if let Err(conflict) = self.env.declare_member(&class, binding) {
                    self.error(target.line, target.span, conflict.to_string(), Some(ErrorCode::NoRedef));
                }
            }
        }
    }

    /// Class of `base` when it is the `self` parameter of the current method
    fn receiver_class(&self, base: &Expr) -> Option<String> {
        let (receiver, class) = self.function.as_ref()?.receiver.as_ref()?;
        (base.as_name() == Some(receiver.as_str())).then(|| class.clone())
    }

    fn check_return(&mut self, value: Option<&Expr>, stmt: &Stmt) {
        let value_ty = value.map(|v| self.infer_expr(v));
        let Some(expected) = self.function.as_ref().and_then(|f| f.ret.clone()) else {
            return;
        };

        match (value, value_ty) {
            (Some(value), Some(actual)) => {
                if expected == Type::NoneType {
                    if !matches!(actual, Type::NoneType | Type::Unknown) {
                        self.error(value.line, value.span, "No return value expected", Some(ErrorCode::ReturnValue));
                    }
                } else if !compatible(&actual, &expected) {
                    self.error(
                        value.line,
                        value.span,
                        format!("Incompatible return value type (got \"{}\", expected \"{}\")", actual, expected),
                        Some(ErrorCode::ReturnValue),
                    );
                }
            }
            _ => {
                if !matches!(expected, Type::NoneType | Type::Unknown) {
                    self.error(stmt.line, stmt.span, "Return value expected", Some(ErrorCode::ReturnValue));
                }
            }
        }
    }

    // ==================== Definitions ====================

    /// Build a function's signature and bind it in the current scope
    ///
    /// Inside a class body the unannotated first parameter is the instance.
    fn declare_function(&mut self, func: &FunctionDef, line: usize) -> FunctionType {
        let owner = self.env.current_class().map(str::to_string);

        let mut params = Vec::with_capacity(func.params.len());
        for (i, param) in func.params.iter().enumerate() {
            let ty = match (&param.annotation, &owner) {
                (Some(annotation), _) => self.resolve_annotation(annotation),
                (None, Some(class)) if i == 0 => self.instance_type(class),
                _ => Type::Unknown,
            };

            if let Some(default) = &param.default {
                let default_ty = self.infer_expr(default);
                if !compatible(&default_ty, &ty) {
                    self.error(
                        default.line,
                        default.span,
                        format!(
                            "Incompatible default for argument \"{}\" (default has type \"{}\", argument has type \"{}\")",
                            param.name, default_ty, ty
                        ),
                        Some(ErrorCode::Assignment),
                    );
                }
            }

            params.push(Parameter {
                name: param.name.clone(),
                ty,
                has_default: param.default.is_some(),
            });
        }

        let ret = func
            .returns
            .as_ref()
            .map_or(Type::Unknown, |annotation| self.resolve_annotation(annotation));

        let mut signature = FunctionType::new(&func.name, params, ret);
        if let Some(class) = owner {
            signature = signature.with_owner(class);
        }

        let binding = Binding::new(&func.name, Type::Function(signature.clone()), line, BindingKind::Function).declared();
        if let Err(conflict) = self.env.declare(binding) {
            self.error(line, func.span, conflict.to_string(), Some(ErrorCode::NoRedef));
        }

        tracing::debug!(name = %func.name, signature = %signature, "declared function");
        signature
    }

    fn check_function_body(&mut self, func: &FunctionDef, signature: &FunctionType) {
        // unannotated functions are dynamically typed and not checked
        if !is_annotated(func) {
            tracing::debug!(name = %func.name, "skipping unannotated function");
            return;
        }

        let receiver = match (&signature.owner, func.params.first()) {
            (Some(class), Some(first)) => Some((first.name.clone(), class.clone())),
            _ => None,
        };
        let context = FunctionContext {
            ret: func.returns.as_ref().map(|_| (*signature.ret).clone()),
            receiver,
        };
        let saved = self.function.replace(context);

        self.in_scope(ScopeKind::Function(func.name.clone()), |checker| {
            for (param, def) in signature.params.iter().zip(&func.params) {
                let mut binding = Binding::new(&param.name, param.ty.clone(), def.line, BindingKind::Parameter);
                if def.annotation.is_some() {
                    binding = binding.declared();
                }
                checker.env.bind(binding);
            }
            checker.check_block(&func.body);
        });

        self.function = saved;
    }

    fn check_class_def(&mut self, class: &ClassDef, line: usize) {
        let mut ancestors: Vec<String> = Vec::new();
        let mut dynamic = false;
        for base in &class.bases {
            match base.as_name() {
                Some("object") => {}
                Some(name) if self.class_object(base).is_some() => {
                    let inherited = self
                        .env
                        .class_type(name)
                        .map(|ty| ty.ancestors.clone())
                        .unwrap_or_default();
                    for ancestor in std::iter::once(name.to_string()).chain(inherited) {
                        if !ancestors.contains(&ancestor) {
                            ancestors.push(ancestor);
                        }
                    }
                }
                _ => {
                    // unresolved or computed bases hide the class's real members
                    self.infer_expr(base);
                    dynamic = true;
                }
            }
        }

        let class_type = ClassType::new(&class.name, ancestors);
        self.env.define_class(class_type.clone(), dynamic);
        let instance = Type::Class(class_type);

        // bound before the body so methods can name their own class
        let placeholder = FunctionType::new(&class.name, Vec::new(), instance.clone());
        let binding = Binding::new(&class.name, Type::Function(placeholder), line, BindingKind::Class).declared();
        let bound = match self.env.declare(binding) {
            Ok(()) => true,
            Err(conflict) => {
                self.error(line, class.span, conflict.to_string(), Some(ErrorCode::NoRedef));
                false
            }
        };

        self.in_scope(ScopeKind::Class(class.name.clone()), |checker| {
            checker.check_class_body(class, &instance, bound);
        });
    }

    /// Class-level statements and method signatures are processed in source
    /// order. Method bodies are checked afterwards, once every method, member
    /// and the constructor are known.
    fn check_class_body(&mut self, class: &ClassDef, instance: &Type, bound: bool) {
        let mut methods = Vec::new();
        for stmt in &class.body {
            match &stmt.kind {
                StmtKind::FunctionDef(func) => {
                    let signature = self.declare_function(func, stmt.line);
                    self.collect_instance_members(func);
                    methods.push((func, signature));
                }
                _ => self.check_stmt(stmt),
            }
        }

        if bound {
            let constructor = self.constructor_type(&class.name, instance);
            if let Some(binding) = self.env.enclosing_mut(&class.name) {
                binding.ty = Type::Function(constructor);
            }
        }

        for (func, signature) in methods {
            self.check_function_body(func, &signature);
        }
    }

    fn collect_instance_members(&mut self, func: &FunctionDef) {
        let Some(class) = self.env.current_class().map(str::to_string) else {
            return;
        };
        let Some(receiver) = func.params.first() else {
            return;
        };

        for stmt in &func.body {
            match &stmt.kind {
                StmtKind::Assign { target, .. } => {
                    if let Some(attr) = receiver_attribute(target, &receiver.name) {
                        if self.env.lookup_member(&class, attr).is_none() {
                            let member = Binding::new(attr, Type::Unknown, stmt.line, BindingKind::Variable);
                            // a fresh inferred member never conflicts
                            let _ = self.env.declare_member(&class, member);
                        }
                    }
                }
                StmtKind::AnnAssign { target, annotation, .. } => {
                    if let Some(attr) = receiver_attribute(target, &receiver.name) {
                        let ty = self.resolve_annotation(annotation);
                        let member = Binding::new(attr, ty, stmt.line, BindingKind::Variable).declared();
                        // conflicts are reported when the method body is checked
                        let _ = self.env.declare_member(&class, member);
                    }
                }
                _ => {}
            }
        }
    }

    /// Signature of calling the class object: `__init__` without `self`
    fn constructor_type(&self, class: &str, instance: &Type) -> FunctionType {
        let params = match self.env.lookup_member(class, "__init__").map(|b| &b.ty) {
            Some(Type::Function(init)) => init.bound().params,
            _ => Vec::new(),
        };
        FunctionType::new(class, params, instance.clone())
    }

    pub(super) fn instance_type(&self, class: &str) -> Type {
        self.env
            .class_type(class)
            .cloned()
            .map_or_else(|| Type::class(class), Type::Class)
    }
}

/// Whether any parameter or the return type carries an annotation
fn is_annotated(func: &FunctionDef) -> bool {
    func.returns.is_some() || func.params.iter().any(|p| p.annotation.is_some())
}

/// `attr` when `target` is `<receiver>.attr`
fn receiver_attribute<'a>(target: &'a Expr, receiver: &str) -> Option<&'a str> {
    match &target.kind {
        ExprKind::Attribute { value, attr } if value.as_name() == Some(receiver) => Some(attr),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use crate::sema::check_lines;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_declared_reassignment() {
        assert_eq!(
            check_lines("x: int = 1\nx = \"a\"\n"),
            vec!["t.py:2: error: Incompatible types in assignment (expression has type \"str\", variable has type \"int\")  [assignment]"]
        );
    }

    #[test]
    fn test_valid_assignments_are_silent() {
        let source = "\
x: int = 1
x = 2
flag: bool = True
x = flag
name = \"n\"
ratio: float = 0.5
";
        assert!(check_lines(source).is_empty());
    }

    #[test]
    fn test_inferred_binding_is_refined() {
        let source = "x = 1\nx = \"a\"\nreveal_type(x)\n";
        assert_eq!(check_lines(source), vec!["t.py:3: note: Revealed type is \"str\""]);
    }

    #[test]
    fn test_redeclaration() {
        let source = "\
x: int = 1
x: int = 2
x: str = \"a\"
";
        assert_eq!(
            check_lines(source),
            vec!["t.py:3: error: Name \"x\" already defined on line 1  [no-redef]"]
        );
    }

    #[test]
    fn test_function_scope() {
        let source = "\
count: int = 0

def bump(step: int) -> int:
    count = \"local\"
    step = \"oops\"
    return step
";
        assert_eq!(
            check_lines(source),
            vec!["t.py:5: error: Incompatible types in assignment (expression has type \"str\", variable has type \"int\")  [assignment]"]
        );
    }

    #[test]
    fn test_return_values() {
        let source = "\
def a() -> int:
    return \"s\"

def b() -> int:
    return

def c() -> None:
    return 1

def d() -> None:
    return None

def e():
    return 1
";
        assert_eq!(
            check_lines(source),
            vec![
                "t.py:2: error: Incompatible return value type (got \"str\", expected \"int\")  [return-value]",
                "t.py:5: error: Return value expected  [return-value]",
                "t.py:8: error: No return value expected  [return-value]",
            ]
        );
    }

    #[test]
    fn test_class_variables() {
        let source = "\
class Config:
    retries: int = 3
    name: str = 1
    retries = \"many\"

Config.retries
";
        assert_eq!(
            check_lines(source),
            vec![
                "t.py:3: error: Incompatible types in assignment (expression has type \"int\", variable has type \"str\")  [assignment]",
                "t.py:4: error: Incompatible types in assignment (expression has type \"str\", variable has type \"int\")  [assignment]",
            ]
        );
    }

    #[test]
    fn test_instance_members() {
        let source = "\
class User:
    age: int

    def __init__(self, name: str) -> None:
        self.name = name
        self.age = \"old\"

    def rename(self) -> str:
        return self.name

u = User(\"a\")
u.age = 3
u.name = 4
reveal_type(u.name)
";
        assert_eq!(
            check_lines(source),
            vec![
                "t.py:6: error: Incompatible types in assignment (expression has type \"str\", variable has type \"int\")  [assignment]",
                "t.py:13: error: Incompatible types in assignment (expression has type \"int\", variable has type \"str\")  [assignment]",
                "t.py:14: note: Revealed type is \"str\"",
            ]
        );
    }

    #[test]
    fn test_methods_see_later_methods() {
        let source = "\
class Job:
    def run(self) -> int:
        return self.step()

    def step(self) -> int:
        return 1
";
        assert!(check_lines(source).is_empty());
    }

    #[test]
    fn test_inheritance() {
        let source = "\
class Animal:
    legs: int = 4

class Dog(Animal):
    pass

class Car:
    pass

def walk(a: Animal) -> int:
    return a.legs

walk(Dog())
walk(Car())
d: Dog = Animal()
";
        assert_eq!(
            check_lines(source),
            vec![
                "t.py:14: error: Argument 1 to \"walk\" has incompatible type \"Car\"; expected \"Animal\"  [arg-type]",
                "t.py:15: error: Incompatible types in assignment (expression has type \"Animal\", variable has type \"Dog\")  [assignment]",
            ]
        );
    }

    #[test]
    fn test_methods_call_their_own_class() {
        let source = "\
class Node:
    def __init__(self, v: int) -> None:
        self.v = v

    def clone(self) -> \"Node\":
        return Node(self.v)

    def broken(self) -> \"Node\":
        return Node()
";
        assert_eq!(
            check_lines(source),
            vec!["t.py:9: error: Missing positional argument \"v\" in call to \"Node\""]
        );
    }

    #[test]
    fn test_class_redefinition_in_source_order() {
        let source = "\
class A:
    x: int = 1

    def x(self) -> int:
        return 1

class B:
    y: str = \"\"

    def __init__(self) -> None:
        self.y: int = 1
";
        assert_eq!(
            check_lines(source),
            vec![
                "t.py:4: error: Name \"x\" already defined on line 2  [no-redef]",
                "t.py:11: error: Name \"y\" already defined on line 8  [no-redef]",
            ]
        );
    }

    #[test]
    fn test_unannotated_functions_are_not_checked() {
        let source = "\
def loose():
    x: int = \"a\"
    return 1 + \"b\"

def strict() -> None:
    x: int = \"a\"
";
        assert_eq!(
            check_lines(source),
            vec!["t.py:6: error: Incompatible types in assignment (expression has type \"str\", variable has type \"int\")  [assignment]"]
        );
    }

    #[test]
    fn test_incompatible_default() {
        assert_eq!(
            check_lines("def f(x: int = \"a\") -> None:\n    pass\n"),
            vec!["t.py:1: error: Incompatible default for argument \"x\" (default has type \"str\", argument has type \"int\")  [assignment]"]
        );
    }

    #[test]
    fn test_augmented_assignment() {
        let source = "\
total: int = 0
total += 1
total += \"x\"
";
        assert_eq!(
            check_lines(source),
            vec!["t.py:3: error: Unsupported operand types for + (\"int\" and \"str\")  [operator]"]
        );
    }

    #[test]
    fn test_errors_do_not_stop_checking() {
        let source = "\
a: int = \"1\"
b: str = 2
reveal_type(a)
";
        assert_eq!(check_lines(source).len(), 3);
    }

    #[test]
    fn test_checking_is_deterministic() {
        let source = "x: int = \"a\"\nreveal_type(x)\ndef f(y: str) -> None:\n    pass\nf(1)\n";
        assert_eq!(check_lines(source), check_lines(source));
    }
}
