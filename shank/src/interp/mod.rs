//! Tree-walking interpreter
//!
//! Each call gets its own [`CallScope`]. Arguments are passed by value;
//! `var` parameters are copied back into the caller's variables when the
//! call returns. Built-ins run against a [`Host`] that owns program input,
//! output and the random number generator.

mod builtins;
mod error;
mod eval;
mod ops;
mod scope;
mod value;

pub use builtins::{Host, NativeFn};
pub use error::{ErrorKind, InterpResult, RuntimeError};
pub use eval::{eval, Interpreter, InterpreterConfig, DEFAULT_MAX_DEPTH};
pub use scope::CallScope;
pub use value::{ArrayValue, Value};
