//! PM/0 machine API for embedding
//!
//! [`Machine`] bundles the configuration and streams of one run and drives the
//! full session: listing, `Tracing ...`, initial status, execution.

use crate::bytecode::disasm::write_listing;
use crate::bytecode::{load_program_file, Program};
use crate::error::{LoadError, MachineError, RuntimeError};
use crate::vm::{MachineIo, RunOutcome, VM};
use pm0_config::MachineConfig;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Line printed between the listing and the initial status dump
pub const TRACING_BANNER: &str = "Tracing ...";

/// PM/0 machine instance
///
/// # Examples
///
/// ```
/// use pm0_runtime::{Instruction, Machine, MachineConfig, MachineIo, Opcode, Program, SharedBuffer};
///
/// let output = SharedBuffer::new();
/// let io = MachineIo::new(
///     Box::new(output.clone()),
///     Box::new(std::io::empty()),
///     Box::new(std::io::sink()),
/// );
/// let program = Program::from_instructions(vec![
///     Instruction::op(Opcode::Lit, 65),
///     Instruction::op(Opcode::Cho, 0),
///     Instruction::op(Opcode::Hlt, 0),
/// ])
/// .unwrap();
///
/// let outcome = Machine::with_io(MachineConfig::default(), io)
///     .run_program(program)
///     .unwrap();
/// assert_eq!(outcome.steps, 3);
/// assert!(output.contents().contains("Tracing ..."));
/// ```
pub struct Machine {
    config: MachineConfig,
    io: MachineIo,
}

impl Machine {
    /// Create a machine on the process's standard streams
    pub fn new(config: MachineConfig) -> Self {
        Self::with_io(config, MachineIo::stdio())
    }

    /// Create a machine on explicit streams
    pub fn with_io(config: MachineConfig, io: MachineIo) -> Self {
        Self { config, io }
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Load a program file using the configured code capacity
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Program, LoadError> {
        load_program_file(path.as_ref(), self.config.code_capacity)
    }

    /// Load a program file and run it
    pub fn run_file(self, path: impl AsRef<Path>) -> Result<RunOutcome, MachineError> {
        let program = self.load(path)?;
        self.run_program(program)
    }

    /// Print the listing, the banner and the initial status, then execute
    ///
    /// Listing rows are written as they are formatted, so an instruction
    /// without a mnemonic fails after the rows before it reached the output.
    pub fn run_program(mut self, program: Program) -> Result<RunOutcome, MachineError> {
        info!(
            instructions = program.len(),
            stack_capacity = self.config.stack_capacity,
            trace = self.config.trace,
            "starting machine"
        );

        let listed = write_listing(self.io.output.as_mut(), &program);
        if listed.is_err() {
            // The diagnostic must follow the rows already printed.
            self.io.output.flush().map_err(RuntimeError::from)?;
        }
        listed?;
        writeln!(self.io.output, "{}", TRACING_BANNER).map_err(RuntimeError::from)?;

        let mut vm = VM::with_config(program, &self.config, self.io);
        vm.print_status()?;
        Ok(vm.run()?)
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new(MachineConfig::default())
    }
}
