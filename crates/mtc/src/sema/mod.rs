//! Semantic analysis: scopes, inference and checking

mod annotations;
mod calls;
mod checker;
mod expr;
mod rules;
mod scope;

pub use checker::Checker;
pub use rules::{OperatorError, binary_result_type, unary_result_type};
pub use scope::{Binding, BindingKind, Environment, RedeclarationConflict, Scope, ScopeKind};

use crate::diagnostics::Diagnostic;
use crate::frontend::ast::Module;

/// Check a parsed module in a fresh environment
pub fn check(module: &Module) -> Vec<Diagnostic> {
    Checker::new(Environment::new()).check(module)
}

/// Parse, check and render `source` as report lines for `t.py`
#[cfg(test)]
pub(crate) fn check_lines(source: &str) -> Vec<String> {
    let module = crate::frontend::parse(source).expect("test source should parse");
    let diagnostics = check(&module);
    crate::diagnostics::Formatter::new(true).format_file("t.py", &diagnostics)
}
