//! Stack-based virtual machine
//!
//! Executes a loaded [`Program`] over a [`Stack`] of words.
//! - One instruction per step: fetch at `pc`, advance `pc`, dispatch
//! - Divide and modulo by zero stop the machine without raising an error
//! - Structural faults (illegal opcodes in the trace, bad stack addresses)
//!   are returned as [`RuntimeError`]

pub mod dispatch;
mod frame;
mod io;
mod stack;
mod trace;

pub use frame::FRAME_SIZE;
pub use io::{MachineIo, SharedBuffer};
pub use stack::{Capacity, Stack};
pub use trace::{write_status, Tracer};

use crate::bytecode::{Instruction, Opcode, Program, Word};
use crate::error::RuntimeError;
use pm0_config::MachineConfig;
use tracing::{debug, info, trace};

/// Diagnostic written when a push or grow reaches the stack capacity
pub const STACK_FULL_MESSAGE: &str = "Stack is full. No more space.";

/// Why the machine stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    /// HLT executed
    Halt,
    /// DIV with a zero divisor
    DivideByZero,
    /// MOD with a zero divisor
    ModuloByZero,
}

impl HaltReason {
    /// True for the soft halts raised by DIV and MOD
    pub fn is_arithmetic_fault(self) -> bool {
        matches!(self, HaltReason::DivideByZero | HaltReason::ModuloByZero)
    }

    fn message(self) -> Option<&'static str> {
        match self {
            HaltReason::Halt => None,
            HaltReason::DivideByZero => Some("Divisor is zero in DIV instruction!"),
            HaltReason::ModuloByZero => Some("Modulus is zero in MOD instruction!"),
        }
    }
}

/// Result of a completed run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    pub reason: HaltReason,
    /// Instructions executed
    pub steps: u64,
}

/// Machine state
pub struct VM {
    /// Program being executed
    program: Program,
    /// Operand and activation stack
    stack: Stack,
    /// Index of the next instruction to fetch
    pc: Word,
    /// Set once the machine stops
    halted: Option<HaltReason>,
    /// Per-step state printer
    tracer: Tracer,
    /// Character, trace and diagnostic streams
    io: MachineIo,
    /// Refuse to fetch past the loaded instructions
    strict_bounds: bool,
    /// Run `check_invariants` after every step
    check_invariants: bool,
    /// Instructions executed so far
    steps: u64,
}

impl VM {
    /// Create a VM with default settings on the process's standard streams
    pub fn new(program: Program) -> Self {
        Self::with_config(program, &MachineConfig::default(), MachineIo::stdio())
    }

    /// Create a VM with explicit settings and streams
    pub fn with_config(program: Program, config: &MachineConfig, io: MachineIo) -> Self {
        let stack = if config.strict_bounds {
            Stack::strict(config.stack_capacity)
        } else {
            Stack::new(config.stack_capacity)
        };

        Self {
            program,
            stack,
            pc: 0,
            halted: None,
            tracer: Tracer::new(config.trace),
            io,
            strict_bounds: config.strict_bounds,
            check_invariants: config.check_invariants,
            steps: 0,
        }
    }

    // ── Inspection ───────────────────────────────────────────────────────────

    pub fn pc(&self) -> Word {
        self.pc
    }

    pub fn bp(&self) -> Word {
        self.stack.bp()
    }

    pub fn sp(&self) -> Word {
        self.stack.sp()
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn is_halted(&self) -> bool {
        self.halted.is_some()
    }

    pub fn halt_reason(&self) -> Option<HaltReason> {
        self.halted
    }

    pub fn is_tracing(&self) -> bool {
        self.tracer.is_enabled()
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Print the register line and stack line for the current state
    pub fn print_status(&mut self) -> Result<(), RuntimeError> {
        write_status(self.io.output.as_mut(), self.pc, &self.stack)?;
        Ok(())
    }

    /// Verify register consistency
    ///
    /// Checks `0 <= sp <= capacity`, `0 <= bp`, `bp < sp` whenever a frame
    /// is active (`bp > 0`), and `0 <= pc <= program length`. Only called
    /// from the run loop when enabled in [`MachineConfig`].
    ///
    /// This is looser than requiring `0 < bp < sp` and `0 < pc <= code
    /// capacity` unconditionally: the top-level frame has `bp == 0` and
    /// execution starts at `pc == 0`, so that form would reject every run.
    pub fn check_invariants(&self) -> Result<(), RuntimeError> {
        let (sp, bp, pc) = (self.stack.sp(), self.stack.bp(), self.pc);
        let capacity = self.stack.capacity() as i64;

        let detail = if sp < 0 || i64::from(sp) > capacity {
            Some(format!("sp {} outside 0..={}", sp, capacity))
        } else if bp < 0 || (bp > 0 && bp >= sp) {
            Some(format!("bp {} not below sp {}", bp, sp))
        } else if pc < 0 || pc as usize > self.program.len() {
            Some(format!("pc {} outside 0..={}", pc, self.program.len()))
        } else {
            None
        };

        match detail {
            Some(detail) => Err(RuntimeError::InvariantViolated { detail }),
            None => Ok(()),
        }
    }

    // ── Execution ────────────────────────────────────────────────────────────

    /// Run until the machine halts
    pub fn run(&mut self) -> Result<RunOutcome, RuntimeError> {
        let reason = loop {
            if let Some(reason) = self.halted {
                break reason;
            }
            self.step()?;
            if self.check_invariants {
                self.check_invariants()?;
            }
        };

        self.io.output.flush()?;
        info!(?reason, steps = self.steps, "machine halted");
        Ok(RunOutcome {
            reason,
            steps: self.steps,
        })
    }

    /// Fetch and execute one instruction, tracing around it
    pub fn step(&mut self) -> Result<(), RuntimeError> {
        let addr = self.pc;
        let instr = self.fetch()?;

        if self.tracer.is_enabled() {
            self.tracer
                .before_step(self.io.output.as_mut(), addr, &instr)?;
        }

        self.execute(instr)?;
        self.steps += 1;

        if self.tracer.is_enabled() {
            self.tracer
                .after_step(self.io.output.as_mut(), self.pc, &self.stack)?;
        }
        Ok(())
    }

    fn fetch(&self) -> Result<Instruction, RuntimeError> {
        let out_of_range = RuntimeError::PcOutOfRange { pc: self.pc };
        if self.strict_bounds && (self.pc < 0 || self.pc as usize >= self.program.len()) {
            return Err(out_of_range);
        }
        self.program.fetch(self.pc).ok_or(out_of_range)
    }

    /// Advance `pc` and apply one instruction
    fn execute(&mut self, instr: Instruction) -> Result<(), RuntimeError> {
        self.pc = self.pc.wrapping_add(1);
        let m = instr.operand;

        let Some(opcode) = dispatch::decode_opcode(instr.opcode) else {
            // Only the empty slots past the program decode to nothing.
            trace!(pc = self.pc - 1, opcode = instr.opcode, "skipping undecodable instruction");
            return Ok(());
        };
        trace!(pc = self.pc - 1, %opcode, operand = m, "execute");

        match opcode {
            // ===== Stack and frames =====
            Opcode::Lit => self.push(m)?,
            Opcode::Rtn => {
                self.pc = self.stack.peek()?;
                self.stack.return_frame()?;
            }
            Opcode::Cal => {
                self.stack.call(self.pc)?;
                self.pc = m;
            }
            Opcode::Pop => {
                self.stack.pop()?;
            }
            Opcode::Psi => self.push_indirect_top()?,
            Opcode::Prm => {
                let value = self.stack.read_at(self.stack.bp().wrapping_sub(m))?;
                self.push(value)?;
            }
            Opcode::Sto => self.stack.store_indexed(m)?,
            Opcode::Inc => {
                if self.stack.grow(m)? == Capacity::Overflowed {
                    self.io.diagnostic(STACK_FULL_MESSAGE)?;
                }
            }

            // ===== Control flow =====
            Opcode::Jmp => self.pc = self.stack.pop()?,
            Opcode::Jpc => {
                if self.stack.pop()? != 0 {
                    self.pc = m;
                }
            }

            // ===== Character I/O =====
            Opcode::Cho => {
                let code = self.stack.pop()?;
                self.io.write_char(code)?;
            }
            Opcode::Chi => {
                let code = self.io.read_char()?;
                self.push(code)?;
            }

            // ===== Machine control =====
            Opcode::Hlt => self.halt(HaltReason::Halt)?,
            Opcode::Ndb => self.tracer.disable(),

            // ===== Arithmetic =====
            Opcode::Neg => self.stack.negate()?,
            Opcode::Add => self.binary_op(|a, b| a.wrapping_add(b))?,
            Opcode::Sub => self.binary_op(|a, b| a.wrapping_sub(b))?,
            Opcode::Mul => self.multiply_discarding_third()?,
            Opcode::Div => self.checked_divide(HaltReason::DivideByZero, Word::wrapping_div)?,
            Opcode::Mod => self.checked_divide(HaltReason::ModuloByZero, Word::wrapping_rem)?,

            // ===== Comparison =====
            Opcode::Eql => self.binary_op(|a, b| Word::from(a == b))?,
            Opcode::Neq => self.binary_op(|a, b| Word::from(a != b))?,
            Opcode::Lss => self.binary_op(|a, b| Word::from(a < b))?,
            Opcode::Leq => self.binary_op(|a, b| Word::from(a <= b))?,
            Opcode::Gtr => self.binary_op(|a, b| Word::from(a > b))?,
            Opcode::Geq => self.binary_op(|a, b| Word::from(a >= b))?,

            // ===== Registers =====
            Opcode::Psp => self.push(self.stack.sp())?,
        }

        Ok(())
    }

    // ===== Helper Methods =====

    fn push(&mut self, value: Word) -> Result<(), RuntimeError> {
        if self.stack.push(value)? == Capacity::Overflowed {
            self.io.diagnostic(STACK_FULL_MESSAGE)?;
        }
        Ok(())
    }

    /// Pop `a` (top), pop `b`, push `op(a, b)`
    fn binary_op<F>(&mut self, op: F) -> Result<(), RuntimeError>
    where
        F: FnOnce(Word, Word) -> Word,
    {
        let a = self.stack.pop()?;
        let b = self.stack.pop()?;
        self.push(op(a, b))
    }

    /// Pop `a`, pop `b`; halt if `b` is zero, otherwise push `op(a, b)`
    fn checked_divide<F>(&mut self, fault: HaltReason, op: F) -> Result<(), RuntimeError>
    where
        F: FnOnce(Word, Word) -> Word,
    {
        let a = self.stack.pop()?;
        let b = self.stack.pop()?;
        if b == 0 {
            return self.halt(fault);
        }
        self.push(op(a, b))
    }

    /// MUL: multiplies the top two values and drops the slot beneath them
    fn multiply_discarding_third(&mut self) -> Result<(), RuntimeError> {
        let a = self.stack.pop()?;
        let b = self.stack.pop()?;
        self.stack.pop()?;
        self.push(a.wrapping_mul(b))
    }

    /// PSI: pushes the slot at index `sp - 1`, i.e. duplicates the top
    fn push_indirect_top(&mut self) -> Result<(), RuntimeError> {
        let value = self.stack.read_at(self.stack.sp().wrapping_sub(1))?;
        self.push(value)
    }

    fn halt(&mut self, reason: HaltReason) -> Result<(), RuntimeError> {
        self.halted = Some(reason);
        if let Some(message) = reason.message() {
            debug!(?reason, pc = self.pc, "arithmetic fault");
            self.io.diagnostic(message)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for VM {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VM")
            .field("pc", &self.pc)
            .field("bp", &self.stack.bp())
            .field("sp", &self.stack.sp())
            .field("halted", &self.halted)
            .field("tracing", &self.tracer.is_enabled())
            .finish()
    }
}
