//! # chicken
//! An interpreter for Chicken, a stack language whose only word is `chicken`.
//!
//! Every line of a program is one instruction, selected by how many times the
//! word appears on it. The [`parser`] turns source text into those counts and
//! the [`vm`] runs them on a small stack machine whose memory holds the program
//! itself, the input and the stack. Characters are printed as numeric
//! character references such as `&#65;`.
//!
//! ```
//! // Reads the input through the self-reference in cell 0 and prints it.
//! let source = "\n\nchicken chicken chicken chicken\nchicken chicken chicken chicken chicken\n\n\
//!               chicken chicken chicken chicken chicken chicken chicken chicken";
//! assert_eq!(chicken::interpret(source, 65i64).unwrap(), "&#65;");
//! ```
use thiserror::Error;

pub mod config;
pub mod format;
pub mod ops;
pub mod parser;
pub mod value;
pub mod vm;

use parser::ParserError;
use value::Value;
use vm::{RunError, VMOptions};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParserError),
    #[error(transparent)]
    Run(#[from] RunError),
}

/// Assemble `source` and run it in the compact dialect, returning the output.
pub fn interpret(source: &str, input: impl Into<Value>) -> Result<String, Error> {
    interpret_with(source, input.into(), VMOptions::default())
}

pub fn interpret_with(source: &str, input: Value, options: VMOptions) -> Result<String, Error> {
    let program = parser::parse_program(source)?;
    Ok(vm::run(&program, input, options)?.output)
}
