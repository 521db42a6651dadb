//! Semantic type model
//!
//! The closed set of types the checker reasons about and the compatibility
//! relation used for assignments, arguments and return values.

mod compat;
mod py_type;

pub use compat::{compatible, type_of_constant};
pub use py_type::{ClassType, FunctionType, Parameter, PrimitiveType, Type};
