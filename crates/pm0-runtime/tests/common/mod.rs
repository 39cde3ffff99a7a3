//! Shared test utilities for PM/0 integration tests

#![allow(dead_code)]

use pm0_runtime::{
    Instruction, Machine, MachineConfig, MachineError, MachineIo, Opcode, Program, RunOutcome,
    SharedBuffer, Word, VM,
};

/// Everything a run left behind
pub struct Captured {
    pub result: Result<RunOutcome, MachineError>,
    pub stdout: String,
    pub stderr: String,
}

/// Build a program from `(opcode, operand)` pairs
pub fn program(instructions: &[(Opcode, Word)]) -> Program {
    Program::from_instructions(
        instructions
            .iter()
            .map(|&(op, m)| Instruction::op(op, m))
            .collect(),
    )
    .unwrap()
}

/// Streams backed by in-memory buffers, with `input` as the CHI source
pub fn buffered_io(input: &[u8]) -> (MachineIo, SharedBuffer, SharedBuffer) {
    let stdout = SharedBuffer::new();
    let stderr = SharedBuffer::new();
    let io = MachineIo::new(
        Box::new(stdout.clone()),
        Box::new(std::io::Cursor::new(input.to_vec())),
        Box::new(stderr.clone()),
    );
    (io, stdout, stderr)
}

/// Configuration with tracing turned off
pub fn quiet() -> MachineConfig {
    MachineConfig {
        trace: false,
        ..MachineConfig::default()
    }
}

/// Run a full session (listing, banner, status, execution)
pub fn run_session(program: Program, config: MachineConfig) -> Captured {
    let (io, stdout, stderr) = buffered_io(b"");
    let result = Machine::with_io(config, io).run_program(program);
    Captured {
        result,
        stdout: stdout.contents(),
        stderr: stderr.contents(),
    }
}

/// Run only the engine and hand back the halted VM
pub fn run_vm(instructions: &[(Opcode, Word)]) -> (VM, RunOutcome) {
    let (io, _, _) = buffered_io(b"");
    let mut vm = VM::with_config(program(instructions), &quiet(), io);
    let outcome = vm.run().unwrap();
    (vm, outcome)
}
