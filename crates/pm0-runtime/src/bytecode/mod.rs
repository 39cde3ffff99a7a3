//! Program representation
//!
//! A program is a fixed-capacity sequence of `(opcode, operand)` pairs. The
//! engine only ever reads it; all mutation happens at load time.

pub mod disasm;
mod loader;
mod opcode;
pub mod validator;

pub use loader::load_program_file;
pub use opcode::{Opcode, NUM_OPCODES};

use crate::error::LoadError;

/// Machine word: stack slots, registers and operands
pub type Word = i32;

/// Default program capacity in instructions
pub const MAX_CODE_LENGTH: usize = pm0_config::DEFAULT_CODE_CAPACITY;

/// A single instruction
///
/// The opcode is kept as a raw word so that the listing layer, not the loader,
/// decides what to do with codes outside the instruction set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Instruction {
    pub opcode: Word,
    pub operand: Word,
}

impl Instruction {
    /// Contents of every program slot past the loaded instructions
    pub const EMPTY: Instruction = Instruction {
        opcode: 0,
        operand: 0,
    };

    pub fn new(opcode: Word, operand: Word) -> Self {
        Self { opcode, operand }
    }

    /// Build an instruction from a decoded opcode
    pub fn op(opcode: Opcode, operand: Word) -> Self {
        Self::new(opcode.code(), operand)
    }
}

/// A loaded program
///
/// Holds `len()` instructions inside a store of `capacity()` slots. Addresses
/// between the two fetch [`Instruction::EMPTY`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    instructions: Vec<Instruction>,
    capacity: usize,
}

impl Program {
    /// Build a program from already-decoded instructions
    ///
    /// Fails the same way the loader does: a program must stay strictly below
    /// its capacity.
    pub fn new(instructions: Vec<Instruction>, capacity: usize) -> Result<Self, LoadError> {
        if instructions.len() >= capacity {
            return Err(LoadError::TooManyInstructions { capacity });
        }
        Ok(Self {
            instructions,
            capacity,
        })
    }

    /// Build a program with the default capacity
    pub fn from_instructions(instructions: Vec<Instruction>) -> Result<Self, LoadError> {
        Self::new(instructions, MAX_CODE_LENGTH)
    }

    /// Number of loaded instructions
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Size of the program store
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Instruction at `pc`, or `None` outside the program store
    pub fn fetch(&self, pc: Word) -> Option<Instruction> {
        let index = usize::try_from(pc).ok()?;
        if index >= self.capacity {
            return None;
        }
        Some(
            self.instructions
                .get(index)
                .copied()
                .unwrap_or(Instruction::EMPTY),
        )
    }
}
