//! Python lexer module

mod token;
mod scanner;

pub use token::{PyToken, PyTokenKind};
pub use scanner::PyLexer;
