//! Errors raised by the assembler pipeline.
//!
//! Every stage stops at the first fault, so an `AsmError` always
//! describes exactly one problem and the line it was found on.
use thiserror::Error;

#[derive(Error, Clone, PartialEq, Eq, Debug)]
pub enum AsmError {
    #[error("line {line}: '{text}' could not be tokenised, not recognised")]
    Lex { line: usize, text: String },

    #[error("line {line}: '{label}' label already exists (first defined on line {first})")]
    DuplicateLabel { line: usize, label: String, first: usize },

    #[error("line {line}: unknown opcode '{mnemonic}'")]
    UnknownOpcode { line: usize, mnemonic: String },

    #[error("line {line}: expected {expected}, got {found}")]
    Syntax { line: usize, expected: String, found: String },

    #[error("line {line}: invalid value {text} for operand of type {kind}")]
    OperandRange { line: usize, text: String, kind: String },

    #[error("line {line}: label '{label}' is not defined")]
    UnknownLabel { line: usize, label: String },
}

impl AsmError {
    /// The 1-based source line the error was raised on.
    pub fn line(&self) -> usize {
        use AsmError::*;
        match self {
            Lex { line, .. }
            | DuplicateLabel { line, .. }
            | UnknownOpcode { line, .. }
            | Syntax { line, .. }
            | OperandRange { line, .. }
            | UnknownLabel { line, .. } => *line,
        }
    }
}
