//! Error types for loading and running programs
//!
//! The `Display` text of each variant is the single diagnostic line the
//! command-line front end prints before exiting with a failure status.

use crate::bytecode::Word;
use std::path::PathBuf;
use thiserror::Error;

/// Failure while reading a program
#[derive(Debug, Error)]
pub enum LoadError {
    /// The program file could not be opened or read
    #[error("Cannot open file: '{}'", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The program reached the instruction capacity
    #[error("Error: too many instructions!")]
    TooManyInstructions { capacity: usize },
}

/// Fatal condition raised while executing or listing a program
///
/// Arithmetic faults are not errors: they stop the machine through
/// [`crate::vm::HaltReason`] instead.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Mnemonic lookup on an opcode outside the instruction set
    ///
    /// `opcode` is the zero-based value that failed validation.
    #[error("Illegal Opcode: {opcode}")]
    IllegalOpcode { opcode: Word },
    /// Pop from an empty stack
    #[error("Stack underflow")]
    StackUnderflow,
    /// Access at a negative stack address
    #[error("Invalid stack address: {addr}")]
    InvalidAddress { addr: Word },
    /// Write past the stack's backing store, or any overrun under strict bounds
    #[error("Stack exhausted: index {index} exceeds capacity {capacity}")]
    StackExhausted { index: Word, capacity: usize },
    /// Fetch outside the program store
    #[error("Program counter out of range: {pc}")]
    PcOutOfRange { pc: Word },
    /// Register consistency check failed
    #[error("Invariant Violated: {detail}")]
    InvariantViolated { detail: String },
    /// Character or trace stream failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Any failure of a complete machine run
#[derive(Debug, Error)]
pub enum MachineError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}
