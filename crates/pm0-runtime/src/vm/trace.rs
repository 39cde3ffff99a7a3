//! Execution trace
//!
//! Before a step the tracer prints the instruction about to run; after the
//! step it prints the registers and every live stack slot:
//!
//! ```text
//! ==> addr: 0     LIT   65
//! PC: 1 BP: 0 SP: 1
//! stack: S[0]: 65
//! ```
//!
//! Each `S[i]: v` entry is followed by a space. Once disabled (NDB) the tracer
//! stays off for the rest of the run.

use super::stack::Stack;
use crate::bytecode::disasm::format_instruction;
use crate::bytecode::{Instruction, Word};
use crate::error::RuntimeError;
use std::io::{self, Write};

/// Per-step state printer
#[derive(Debug, Clone)]
pub struct Tracer {
    enabled: bool,
}

impl Tracer {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Turn tracing off; there is no way back on
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Print the instruction at `addr`, the pc captured before the step
    ///
    /// The `==> addr: ` prefix is written before the row is formatted, so an
    /// illegal opcode leaves it on the stream ahead of the diagnostic.
    pub fn before_step(
        &self,
        out: &mut dyn Write,
        addr: Word,
        instr: &Instruction,
    ) -> Result<(), RuntimeError> {
        write!(out, "==> addr: ")?;
        let row = format_instruction(addr, instr)?;
        writeln!(out, "{}", row)?;
        Ok(())
    }

    /// Print registers and stack after a step
    pub fn after_step(&self, out: &mut dyn Write, pc: Word, stack: &Stack) -> io::Result<()> {
        write_status(out, pc, stack)
    }
}

/// Register line followed by the stack line
pub fn write_status(out: &mut dyn Write, pc: Word, stack: &Stack) -> io::Result<()> {
    writeln!(out, "PC: {} BP: {} SP: {}", pc, stack.bp(), stack.sp())?;
    write!(out, "stack: ")?;
    for (index, value) in stack.live() {
        write!(out, "S[{}]: {} ", index, value)?;
    }
    writeln!(out)
}
