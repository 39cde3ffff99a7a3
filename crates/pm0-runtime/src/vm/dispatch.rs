//! Instruction decoding for the run loop
//!
//! Uses a static lookup table indexed by opcode number, so decoding a fetched
//! word is a bounds check and a load.

use crate::bytecode::{Opcode, Word, NUM_OPCODES};

/// Static dispatch table mapping opcode numbers to optional Opcodes.
/// Slot 0 stays empty: the zero instruction decodes to nothing.
static OPCODE_TABLE: [Option<Opcode>; NUM_OPCODES as usize + 1] = {
    let mut table: [Option<Opcode>; NUM_OPCODES as usize + 1] = [None; NUM_OPCODES as usize + 1];

    let mut index = 0;
    while index < Opcode::ALL.len() {
        let opcode = Opcode::ALL[index];
        table[opcode as usize] = Some(opcode);
        index += 1;
    }

    table
};

/// Decode an opcode word using the static lookup table.
/// Returns None for words outside the instruction set.
#[inline(always)]
pub fn decode_opcode(word: Word) -> Option<Opcode> {
    usize::try_from(word)
        .ok()
        .and_then(|index| OPCODE_TABLE.get(index).copied().flatten())
}

/// Net change in stack height when the opcode executes normally
///
/// CAL and RTN are counted by their effect on `sp` alone; INC depends on its
/// operand and is reported as `None`.
pub fn stack_effect(opcode: Opcode) -> Option<Word> {
    match opcode {
        Opcode::Lit | Opcode::Psi | Opcode::Prm | Opcode::Chi | Opcode::Psp => Some(1),
        Opcode::Cal => Some(2),
        Opcode::Rtn | Opcode::Sto | Opcode::Mul => Some(-2),
        Opcode::Pop | Opcode::Jmp | Opcode::Jpc | Opcode::Cho => Some(-1),
        Opcode::Add
        | Opcode::Sub
        | Opcode::Div
        | Opcode::Mod
        | Opcode::Eql
        | Opcode::Neq
        | Opcode::Lss
        | Opcode::Leq
        | Opcode::Gtr
        | Opcode::Geq => Some(-1),
        Opcode::Hlt | Opcode::Ndb | Opcode::Neg => Some(0),
        Opcode::Inc => None,
    }
}
