//! PM/0 instruction set
//!
//! 27 opcodes numbered from 1. Every instruction carries one integer operand,
//! which most opcodes ignore.

use super::Word;

/// Number of opcodes in the instruction set
pub const NUM_OPCODES: Word = 27;

/// PM/0 opcode
///
/// Discriminants are the opcode numbers used in program text.
/// Binary operations pop `a` (top of stack) first, then `b`.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // ===== Stack and frames =====
    /// Push literal m
    Lit = 1,
    /// Return: pc = top of stack, then tear down the frame
    Rtn = 2,
    /// Call subroutine at address m
    Cal = 3,
    /// Pop and discard
    Pop = 4,
    /// Push the value at index sp - 1
    Psi = 5,
    /// Push the value at index bp - m
    Prm = 6,
    /// Pop address and value, store value at address + m
    Sto = 7,
    /// Reserve m slots
    Inc = 8,

    // ===== Control flow =====
    /// Pop target, jump
    Jmp = 9,
    /// Pop condition, jump to m if nonzero
    Jpc = 10,

    // ===== Character I/O =====
    /// Pop and write as a character
    Cho = 11,
    /// Read a character and push it
    Chi = 12,

    // ===== Machine control =====
    /// Stop the machine
    Hlt = 13,
    /// Turn tracing off for the rest of the run
    Ndb = 14,

    // ===== Arithmetic =====
    /// Negate top of stack in place
    Neg = 15,
    /// Pop a, pop b, push a + b
    Add = 16,
    /// Pop a, pop b, push a - b
    Sub = 17,
    /// Pop a, pop b, pop and discard, push a * b
    Mul = 18,
    /// Pop a, pop b, push a / b
    Div = 19,
    /// Pop a, pop b, push a % b
    Mod = 20,

    // ===== Comparison =====
    /// Pop a, pop b, push a == b
    Eql = 21,
    /// Pop a, pop b, push a != b
    Neq = 22,
    /// Pop a, pop b, push a < b
    Lss = 23,
    /// Pop a, pop b, push a <= b
    Leq = 24,
    /// Pop a, pop b, push a > b
    Gtr = 25,
    /// Pop a, pop b, push a >= b
    Geq = 26,

    // ===== Registers =====
    /// Push sp
    Psp = 27,
}

/// Display names indexed by `opcode - 1`
pub(crate) const MNEMONICS: [&str; NUM_OPCODES as usize] = [
    "LIT", "RTN", "CAL", "POP", "PSI", "PRM", "STO", "INC", "JMP", "JPC", "CHO", "CHI", "HLT",
    "NDB", "NEG", "ADD", "SUB", "MUL", "DIV", "MOD", "EQL", "NEQ", "LSS", "LEQ", "GTR", "GEQ",
    "PSP",
];

impl Opcode {
    /// Every opcode in numeric order
    pub const ALL: [Opcode; NUM_OPCODES as usize] = [
        Opcode::Lit,
        Opcode::Rtn,
        Opcode::Cal,
        Opcode::Pop,
        Opcode::Psi,
        Opcode::Prm,
        Opcode::Sto,
        Opcode::Inc,
        Opcode::Jmp,
        Opcode::Jpc,
        Opcode::Cho,
        Opcode::Chi,
        Opcode::Hlt,
        Opcode::Ndb,
        Opcode::Neg,
        Opcode::Add,
        Opcode::Sub,
        Opcode::Mul,
        Opcode::Div,
        Opcode::Mod,
        Opcode::Eql,
        Opcode::Neq,
        Opcode::Lss,
        Opcode::Leq,
        Opcode::Gtr,
        Opcode::Geq,
        Opcode::Psp,
    ];

    /// Opcode number as written in program text
    pub fn code(self) -> Word {
        self as Word
    }

    /// Three-letter display name
    pub fn mnemonic(self) -> &'static str {
        MNEMONICS[self as usize - 1]
    }
}

impl TryFrom<Word> for Opcode {
    type Error = ();

    fn try_from(code: Word) -> Result<Self, Self::Error> {
        if (1..=NUM_OPCODES).contains(&code) {
            Ok(Self::ALL[code as usize - 1])
        } else {
            Err(())
        }
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic())
    }
}
