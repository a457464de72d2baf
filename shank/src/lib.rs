//! Shank Interpreter Library
//!
//! Indentation-structured teaching language: a logos lexer with layout
//! tokens, a recursive-descent parser and a tree-walking interpreter.

pub mod ast;
pub mod error;
pub mod interp;
pub mod lexer;
pub mod parser;

pub use ast::{Program, Span};
pub use error::{Result, ShankError};
pub use interp::{Interpreter, InterpreterConfig};

/// Lex and parse source text into a program
pub fn parse(source: &str) -> Result<Program> {
    let tokens = lexer::tokenize(source)?;
    parser::parse(&tokens)
}

/// Run a program against stdin and stdout with the default configuration
pub fn run(program: &Program) -> Result<()> {
    Interpreter::new().run(program)?;
    Ok(())
}
