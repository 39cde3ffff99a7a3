//! PM/0 Runtime - Stack machine implementation
//!
//! This library provides the complete PM/0 execution pipeline:
//! - Loading `opcode operand` program text
//! - Program listings and opcode mnemonics
//! - The stack machine with its call frame protocol and execution trace

/// PM/0 runtime version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Public API modules
pub mod bytecode;
pub mod error;
pub mod machine;
pub mod vm;

// Re-export commonly used types
pub use bytecode::{load_program_file, Instruction, Opcode, Program, Word, MAX_CODE_LENGTH};
pub use error::{LoadError, MachineError, RuntimeError};
pub use machine::Machine;
pub use pm0_config::MachineConfig;
pub use vm::{HaltReason, MachineIo, RunOutcome, SharedBuffer, VM};
