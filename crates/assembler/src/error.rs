//! Error types for the genome assembler.

use thiserror::Error;

/// Errors produced while assembling text into a genome.
///
/// Line numbers are 1-based.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmError {
    /// The first word of a line names no catalog entry.
    #[error("line {line}: unknown instruction '{token}'")]
    UnknownInstruction { line: usize, token: String },

    /// Fewer arguments than the entry declares.
    #[error("line {line}: {name} expects {expected} argument(s)")]
    MissingArgument {
        line: usize,
        name: String,
        expected: usize,
    },

    /// A numeric literal could not be parsed or does not fit an argument.
    #[error("line {line}: invalid number '{token}'")]
    InvalidNumber { line: usize, token: String },

    /// A token appeared where it was not expected.
    #[error("line {line}: unexpected token '{token}'")]
    UnexpectedToken { line: usize, token: String },
}
