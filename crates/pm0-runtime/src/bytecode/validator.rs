//! Opcode validation
//!
//! One predicate, two callers with different comparison bases:
//! - the loader checks the raw opcode, so its legal window is `0..=27`
//! - mnemonic lookup subtracts one first, so its legal window is raw `1..=27`
//!
//! Opcode 0 therefore loads, and is only rejected once the listing or the
//! tracer tries to name it.

use super::opcode::MNEMONICS;
use super::{Word, NUM_OPCODES};
use crate::error::RuntimeError;

/// True if `opcode` lies outside `0..=27`
pub fn is_illegal_opcode(opcode: Word) -> bool {
    !(0..=NUM_OPCODES).contains(&opcode)
}

/// Loader-side check on a raw opcode read from program text
pub fn accepts_raw_opcode(opcode: Word) -> bool {
    !is_illegal_opcode(opcode)
}

/// Display name for a raw opcode
///
/// The opcode is shifted to its zero-based table index before validation.
/// The index, not the raw value, is reported on failure.
pub fn mnemonic(opcode: Word) -> Result<&'static str, RuntimeError> {
    let index = opcode.wrapping_sub(1);
    // The shared predicate admits NUM_OPCODES itself; the table does not.
    if is_illegal_opcode(index) || index == NUM_OPCODES {
        return Err(RuntimeError::IllegalOpcode { opcode: index });
    }
    Ok(MNEMONICS[index as usize])
}
