//! Scopes and the symbol environment

use crate::types::{ClassType, Type};
use std::collections::{BTreeMap, HashMap, HashSet};
use thiserror::Error;

/// A name bound in some scope
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub name: String,
    pub ty: Type,
    /// Line of the defining statement
    pub line: usize,
    /// Declared by an annotation or definition; the type is fixed
    pub declared: bool,
    pub kind: BindingKind,
}

impl Binding {
    /// An inferred binding
    pub fn new(name: impl Into<String>, ty: Type, line: usize, kind: BindingKind) -> Self {
        Self {
            name: name.into(),
            ty,
            line,
            declared: false,
            kind,
        }
    }

    pub fn declared(mut self) -> Self {
        self.declared = true;
        self
    }
}

/// What introduced a binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Variable,
    Parameter,
    Function,
    Class,
    Import,
}

/// Kind of scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeKind {
    Module,
    Class(String),
    Function(String),
}

/// A declared name was declared again with a different type
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Name \"{name}\" already defined on line {line}")]
pub struct RedeclarationConflict {
    pub name: String,
    /// Line of the original declaration
    pub line: usize,
}

/// A single scope
#[derive(Debug, Clone)]
pub struct Scope {
    kind: ScopeKind,
    bindings: BTreeMap<String, Binding>,
}

impl Scope {
    pub fn new(kind: ScopeKind) -> Self {
        Self {
            kind,
            bindings: BTreeMap::new(),
        }
    }

    pub fn kind(&self) -> &ScopeKind {
        &self.kind
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Binding> {
        self.bindings.get_mut(name)
    }

    /// Bind a name, replacing any previous binding
    pub fn insert(&mut self, binding: Binding) {
        self.bindings.insert(binding.name.clone(), binding);
    }

    /// Bind a name, refusing to change the type of a declared binding
    ///
    /// Re-declaring with the same type keeps the original binding.
    pub fn declare(&mut self, binding: Binding) -> Result<(), RedeclarationConflict> {
        if let Some(existing) = self.bindings.get(&binding.name) {
            if existing.declared {
                if existing.ty == binding.ty {
                    return Ok(());
                }
                return Err(RedeclarationConflict {
                    name: binding.name,
                    line: existing.line,
                });
            }
        }
        self.insert(binding);
        Ok(())
    }

    pub fn bindings(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.values()
    }
}

/// The scope stack for one file, plus finished class bodies
///
/// The bottom of the stack is the module scope. Class scopes are moved into
/// the class table when popped so their members stay queryable.
#[derive(Debug)]
pub struct Environment {
    scopes: Vec<Scope>,
    classes: HashMap<String, Scope>,
    class_types: HashMap<String, ClassType>,
    /// Classes with a base the checker cannot see into
    dynamic_classes: HashSet<String>,
}

impl Environment {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new(ScopeKind::Module)],
            classes: HashMap::new(),
            class_types: HashMap::new(),
            dynamic_classes: HashSet::new(),
        }
    }

    /// Enter a class or function body
    pub fn push(&mut self, kind: ScopeKind) {
        tracing::trace!(?kind, depth = self.scopes.len(), "enter scope");
        self.scopes.push(Scope::new(kind));
    }

    /// Leave the innermost scope; the module scope is never popped
    pub fn pop(&mut self) {
        if self.scopes.len() <= 1 {
            return;
        }
        if let Some(scope) = self.scopes.pop() {
            tracing::trace!(kind = ?scope.kind, "exit scope");
            if let ScopeKind::Class(name) = &scope.kind {
                self.classes.insert(name.clone(), scope);
            }
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    fn innermost(&self) -> &Scope {
        // the module scope is never popped
        &self.scopes[self.scopes.len() - 1]
    }

    fn innermost_mut(&mut self) -> &mut Scope {
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    /// Name of the class whose body is the innermost scope
    pub fn current_class(&self) -> Option<&str> {
        match self.innermost().kind() {
            ScopeKind::Class(name) => Some(name),
            _ => None,
        }
    }

    /// Declare a name in the innermost scope
    pub fn declare(&mut self, binding: Binding) -> Result<(), RedeclarationConflict> {
        self.innermost_mut().declare(binding)
    }

    /// Bind a name in the innermost scope unconditionally
    pub fn bind(&mut self, binding: Binding) {
        self.innermost_mut().insert(binding);
    }

    /// Binding of a name in the innermost scope only
    pub fn local(&self, name: &str) -> Option<&Binding> {
        self.innermost().get(name)
    }

    pub fn local_mut(&mut self, name: &str) -> Option<&mut Binding> {
        self.innermost_mut().get_mut(name)
    }

    /// Binding of a name in the scope just outside the innermost one
    pub fn enclosing_mut(&mut self, name: &str) -> Option<&mut Binding> {
        let index = self.scopes.len().checked_sub(2)?;
        self.scopes[index].get_mut(name)
    }

    /// Resolve a name from the innermost scope outwards
    ///
    /// Enclosing class bodies are not visible, and a class body does not see
    /// the locals of an enclosing function.
    pub fn lookup_binding(&self, name: &str) -> Option<&Binding> {
        let last = self.scopes.len() - 1;
        let in_class = matches!(self.innermost().kind(), ScopeKind::Class(_));

        self.scopes.iter().enumerate().rev().find_map(|(i, scope)| {
            let visible = i == last
                || match scope.kind() {
                    ScopeKind::Module => true,
                    ScopeKind::Class(_) => false,
                    ScopeKind::Function(_) => !in_class,
                };
            if visible { scope.get(name) } else { None }
        })
    }

    /// Type of a name, `Unknown` when unresolved
    pub fn lookup(&self, name: &str) -> Type {
        self.lookup_binding(name)
            .map(|b| b.ty.clone())
            .unwrap_or(Type::Unknown)
    }

    /// Register a class before its body is checked
    pub fn define_class(&mut self, ty: ClassType, dynamic: bool) {
        if dynamic {
            self.dynamic_classes.insert(ty.name.clone());
        }
        self.class_types.insert(ty.name.clone(), ty);
    }

    pub fn class_type(&self, name: &str) -> Option<&ClassType> {
        self.class_types.get(name)
    }

    /// Whether some base of the class is unknown, directly or inherited
    pub fn has_dynamic_base(&self, name: &str) -> bool {
        self.dynamic_classes.contains(name)
            || self
                .class_types
                .get(name)
                .is_some_and(|ty| ty.ancestors.iter().any(|a| self.dynamic_classes.contains(a)))
    }

    /// Body scope of a class, whether still open or finished
    fn class_scope(&self, name: &str) -> Option<&Scope> {
        self.scopes
            .iter()
            .rev()
            .find(|s| matches!(s.kind(), ScopeKind::Class(n) if n == name))
            .or_else(|| self.classes.get(name))
    }

    fn class_scope_mut(&mut self, name: &str) -> Option<&mut Scope> {
        let open = self
            .scopes
            .iter()
            .rposition(|s| matches!(s.kind(), ScopeKind::Class(n) if n == name));
        match open {
            Some(i) => self.scopes.get_mut(i),
            None => self.classes.get_mut(name),
        }
    }

    /// Class name followed by its ancestors, nearest first
    fn mro(&self, class: &str) -> Vec<String> {
        let mut chain = vec![class.to_string()];
        if let Some(ty) = self.class_types.get(class) {
            chain.extend(ty.ancestors.iter().cloned());
        }
        chain
    }

    /// Look up a member on a class or its ancestors
    pub fn lookup_member(&self, class: &str, member: &str) -> Option<&Binding> {
        self.mro(class)
            .iter()
            .find_map(|c| self.class_scope(c).and_then(|s| s.get(member)))
    }

    pub fn lookup_member_mut(&mut self, class: &str, member: &str) -> Option<&mut Binding> {
        let owner = self
            .mro(class)
            .into_iter()
            .find(|c| self.class_scope(c).is_some_and(|s| s.get(member).is_some()))?;
        self.class_scope_mut(&owner)?.get_mut(member)
    }

    /// Declare a member directly on a class
    pub fn declare_member(&mut self, class: &str, binding: Binding) -> Result<(), RedeclarationConflict> {
        match self.class_scope_mut(class) {
            Some(scope) => scope.declare(binding),
            None => Ok(()),
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn var(name: &str, ty: Type, line: usize) -> Binding {
        Binding::new(name, ty, line, BindingKind::Variable)
    }

    #[test]
    fn test_declare_and_lookup() {
        let mut env = Environment::new();
        env.declare(var("x", Type::int(), 1).declared()).unwrap();
        assert_eq!(env.lookup("x"), Type::int());
        assert_eq!(env.lookup("missing"), Type::Unknown);
    }

    #[test]
    fn test_redeclaration_conflict() {
        let mut env = Environment::new();
        env.declare(var("x", Type::int(), 1).declared()).unwrap();

        // same type is fine
        assert!(env.declare(var("x", Type::int(), 3).declared()).is_ok());

        let err = env.declare(var("x", Type::str(), 5).declared()).unwrap_err();
        assert_eq!(err.to_string(), "Name \"x\" already defined on line 1");
        assert_eq!(env.lookup("x"), Type::int());
    }

    #[test]
    fn test_inferred_binding_can_be_redeclared() {
        let mut env = Environment::new();
        env.declare(var("x", Type::int(), 1)).unwrap();
        assert!(env.declare(var("x", Type::str(), 2).declared()).is_ok());
        assert_eq!(env.lookup("x"), Type::str());
    }

    #[test]
    fn test_inner_scope_shadows_and_pops() {
        let mut env = Environment::new();
        env.bind(var("x", Type::int(), 1));
        env.push(ScopeKind::Function("f".into()));
        env.bind(var("x", Type::str(), 2));
        assert_eq!(env.lookup("x"), Type::str());
        env.pop();
        assert_eq!(env.lookup("x"), Type::int());
        assert_eq!(env.depth(), 1);
    }

    #[test]
    fn test_class_scope_hidden_from_methods() {
        let mut env = Environment::new();
        env.push(ScopeKind::Class("A".into()));
        env.bind(var("attr", Type::int(), 2));
        assert_eq!(env.current_class(), Some("A"));

        env.push(ScopeKind::Function("method".into()));
        assert_eq!(env.lookup("attr"), Type::Unknown);
        env.pop();
        env.pop();
        assert_eq!(env.lookup("attr"), Type::Unknown);
    }

    #[test]
    fn test_class_body_does_not_see_function_locals() {
        let mut env = Environment::new();
        env.push(ScopeKind::Function("outer".into()));
        env.bind(var("local", Type::int(), 2));
        env.push(ScopeKind::Class("Inner".into()));
        assert_eq!(env.lookup("local"), Type::Unknown);
    }

    #[test]
    fn test_members_survive_pop_and_inherit() {
        let mut env = Environment::new();
        env.define_class(ClassType::new("Base", Vec::new()), false);
        env.push(ScopeKind::Class("Base".into()));
        env.bind(var("size", Type::int(), 2));
        env.pop();

        env.define_class(ClassType::new("Derived", vec!["Base".into()]), false);
        env.push(ScopeKind::Class("Derived".into()));
        env.pop();

        assert_eq!(env.lookup_member("Base", "size").map(|b| b.ty.clone()), Some(Type::int()));
        assert_eq!(env.lookup_member("Derived", "size").map(|b| b.line), Some(2));
        assert!(env.lookup_member("Derived", "missing").is_none());
    }

    #[test]
    fn test_dynamic_base_is_inherited() {
        let mut env = Environment::new();
        env.define_class(ClassType::new("A", Vec::new()), true);
        env.define_class(ClassType::new("B", vec!["A".into()]), false);
        assert!(env.has_dynamic_base("B"));
        assert!(!env.has_dynamic_base("C"));
    }

    #[test]
    fn test_enclosing_binding() {
        let mut env = Environment::new();
        env.bind(var("A", Type::int(), 1));
        assert!(env.enclosing_mut("A").is_none());

        env.push(ScopeKind::Class("A".into()));
        if let Some(binding) = env.enclosing_mut("A") {
            binding.ty = Type::str();
        }
        env.pop();
        assert_eq!(env.lookup("A"), Type::str());
    }

    #[test]
    fn test_module_scope_is_never_popped() {
        let mut env = Environment::new();
        env.pop();
        env.bind(var("x", Type::int(), 1));
        assert_eq!(env.lookup("x"), Type::int());
    }
}
