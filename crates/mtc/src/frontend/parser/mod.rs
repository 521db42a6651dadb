//! Parser for the supported Python subset

mod parser;

pub use parser::PyParser;
