//! Runtime errors for the interpreter

use crate::ast::DataType;
use std::fmt;

/// Runtime error during interpretation
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeError {
    pub kind: ErrorKind,
    pub message: String,
    /// Line of the innermost statement that was executing
    pub line: Option<usize>,
}

/// Kinds of runtime errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UndefinedVariable,
    UndefinedFunction,
    /// Assignment to a constant
    ConstantAssignment,
    TypeError,
    ArityMismatch,
    DivisionByZero,
    IndexOutOfBounds,
    /// Value outside a declared `from .. to` range
    OutOfRange,
    /// `for` loop whose start is not below its end
    InvalidForBounds,
    /// Output argument that is not a variable
    NotAVariable,
    /// Call depth limit reached
    StackOverflow,
    /// Input or output failure, including end of input in `Read`
    Io,
}

impl RuntimeError {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        RuntimeError {
            kind,
            message: message.into(),
            line: None,
        }
    }

    /// Attach the executing statement's line unless a deeper statement
    /// already did.
    pub fn at_line(mut self, line: usize) -> Self {
        self.line.get_or_insert(line);
        self
    }

    pub fn undefined_variable(name: &str) -> Self {
        Self::new(ErrorKind::UndefinedVariable, format!("undefined variable: {name}"))
    }

    pub fn undefined_function(name: &str) -> Self {
        Self::new(ErrorKind::UndefinedFunction, format!("undefined function: {name}"))
    }

    pub fn constant_assignment(name: &str) -> Self {
        Self::new(ErrorKind::ConstantAssignment, format!("cannot assign to constant {name}"))
    }

    pub fn type_error(expected: &str, got: &str) -> Self {
        Self::new(ErrorKind::TypeError, format!("type error: expected {expected}, got {got}"))
    }

    /// Value of the wrong type stored into a typed variable.
    pub fn assignment_mismatch(name: &str, declared: &DataType, got: &DataType) -> Self {
        Self::new(
            ErrorKind::TypeError,
            format!("type error: {name} is declared {declared} but was given {got}"),
        )
    }

    /// Operator applied to operands it is not defined for.
    pub fn invalid_operands(op: &str, left: &str, right: &str) -> Self {
        Self::new(
            ErrorKind::TypeError,
            format!("type error: cannot apply {op} to {left} and {right}"),
        )
    }

    pub fn arity_mismatch(name: &str, expected: usize, got: usize) -> Self {
        Self::new(
            ErrorKind::ArityMismatch,
            format!("function {name} expects {expected} argument(s), got {got}"),
        )
    }

    pub fn division_by_zero() -> Self {
        Self::new(ErrorKind::DivisionByZero, "division by zero")
    }

    /// Array index outside `[lower, lower + len)`.
    pub fn index_out_of_bounds(index: i32, lower: i32, len: usize) -> Self {
        let upper = i64::from(lower) + len as i64 - 1;
        Self::new(
            ErrorKind::IndexOutOfBounds,
            format!("index {index} out of bounds {lower}..{upper}"),
        )
    }

    /// Position or length outside a string, for the string built-ins.
    pub fn string_bounds(func: &str, detail: String) -> Self {
        Self::new(ErrorKind::IndexOutOfBounds, format!("{func}: {detail}"))
    }

    pub fn out_of_range(name: &str, value: &str, range: &str) -> Self {
        Self::new(ErrorKind::OutOfRange, format!("{name} := {value} is outside {range}"))
    }

    pub fn invalid_for_bounds(from: i32, to: i32) -> Self {
        Self::new(
            ErrorKind::InvalidForBounds,
            format!("for loop start {from} must be less than its end {to}"),
        )
    }

    pub fn not_a_variable(func: &str, position: usize) -> Self {
        Self::new(
            ErrorKind::NotAVariable,
            format!("argument {position} of {func} is an output and must be a variable"),
        )
    }

    /// `var` marker on an argument whose parameter is not `var`.
    pub fn unexpected_var(func: &str, position: usize) -> Self {
        Self::new(
            ErrorKind::TypeError,
            format!("argument {position} of {func} is not a var parameter"),
        )
    }

    pub fn stack_overflow(limit: usize) -> Self {
        Self::new(
            ErrorKind::StackOverflow,
            format!("stack overflow: call depth exceeded {limit}"),
        )
    }

    pub fn io_error(msg: &str) -> Self {
        Self::new(ErrorKind::Io, format!("IO error: {msg}"))
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "Runtime error on line {line}: {}", self.message),
            None => write!(f, "Runtime error: {}", self.message),
        }
    }
}

impl std::error::Error for RuntimeError {}

impl From<std::io::Error> for RuntimeError {
    fn from(err: std::io::Error) -> Self {
        RuntimeError::io_error(&err.to_string())
    }
}

/// Result type for interpreter operations
pub type InterpResult<T> = Result<T, RuntimeError>;
