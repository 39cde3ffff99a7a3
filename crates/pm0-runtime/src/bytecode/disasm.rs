//! Program listing
//!
//! Renders instructions as fixed-width `address mnemonic operand` rows, the
//! same row format the tracer uses before each step.
//!
//! # Format
//! ```text
//! Addr  OP    M
//! 0     LIT   65
//! 1     CHO   0
//! 2     HLT   0
//! ```
//! Every column is left-aligned and padded to five characters.

use super::validator::mnemonic;
use super::{Instruction, Program, Word};
use crate::error::RuntimeError;
use std::io::Write;

/// Listing header row
pub fn header() -> String {
    format!("{:<5} {:<5} {:<5}", "Addr", "OP", "M")
}

/// One listing row
///
/// Fails if the opcode has no mnemonic.
pub fn format_instruction(addr: Word, instr: &Instruction) -> Result<String, RuntimeError> {
    Ok(format!(
        "{:<5} {:<5} {:<5}",
        addr,
        mnemonic(instr.opcode)?,
        instr.operand
    ))
}

/// Write the listing row by row
///
/// Rows before an instruction without a mnemonic are already written when the
/// error is returned.
pub fn write_listing(out: &mut dyn Write, program: &Program) -> Result<(), RuntimeError> {
    writeln!(out, "{}", header())?;
    for (addr, instr) in program.instructions().iter().enumerate() {
        let row = format_instruction(addr as Word, instr)?;
        writeln!(out, "{}", row)?;
    }
    Ok(())
}

/// Full listing: header plus one newline-terminated row per instruction
pub fn listing(program: &Program) -> Result<String, RuntimeError> {
    let mut output = Vec::new();
    write_listing(&mut output, program)?;
    Ok(String::from_utf8_lossy(&output).into_owned())
}
