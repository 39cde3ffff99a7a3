//! Property tests for stack height and listing behavior

mod common;

use common::*;
use pm0_runtime::bytecode::disasm::listing;
use pm0_runtime::vm::dispatch::stack_effect;
use pm0_runtime::{Instruction, Opcode, Program, Word};
use proptest::prelude::*;
use proptest::sample::select;

/// Operators that never fault on nonzero operands
const TOTAL_BINARY: [Opcode; 9] = [
    Opcode::Add,
    Opcode::Sub,
    Opcode::Mul,
    Opcode::Eql,
    Opcode::Neq,
    Opcode::Lss,
    Opcode::Leq,
    Opcode::Gtr,
    Opcode::Geq,
];

fn pushes(values: &[Word]) -> Vec<(Opcode, Word)> {
    values.iter().map(|&v| (Opcode::Lit, v)).collect()
}

proptest! {
    #[test]
    fn lit_grows_stack_by_one(prefix in prop::collection::vec(any::<Word>(), 0..32), m in any::<Word>()) {
        let mut instructions = pushes(&prefix);
        instructions.push((Opcode::Lit, m));
        instructions.push((Opcode::Hlt, 0));

        let (vm, _) = run_vm(&instructions);
        prop_assert_eq!(vm.stack().size(), prefix.len() as Word);
        prop_assert_eq!(vm.stack().peek().unwrap(), m);
    }

    #[test]
    fn binary_ops_match_declared_effect(
        op in select(TOTAL_BINARY.to_vec()),
        values in prop::collection::vec(any::<Word>(), 3..8),
    ) {
        let mut instructions = pushes(&values);
        instructions.push((op, 0));
        instructions.push((Opcode::Hlt, 0));

        let (vm, _) = run_vm(&instructions);
        let expected = values.len() as Word + stack_effect(op).unwrap();
        prop_assert_eq!(vm.sp(), expected);
    }

    #[test]
    fn mul_lowers_height_by_two(values in prop::collection::vec(-1000..1000i32, 3..8)) {
        let mut instructions = pushes(&values);
        instructions.push((Opcode::Mul, 0));
        instructions.push((Opcode::Hlt, 0));

        let (vm, _) = run_vm(&instructions);
        let n = values.len();
        prop_assert_eq!(vm.sp(), n as Word - 2);
        prop_assert_eq!(vm.stack().peek().unwrap(), values[n - 1] * values[n - 2]);
    }

    #[test]
    fn nonzero_division_never_halts_early(a in any::<Word>(), b in any::<Word>().prop_filter("nonzero", |b| *b != 0)) {
        let (vm, outcome) = run_vm(&[
            (Opcode::Lit, b),
            (Opcode::Lit, a),
            (Opcode::Div, 0),
            (Opcode::Hlt, 0),
        ]);
        prop_assert!(!outcome.reason.is_arithmetic_fault());
        prop_assert_eq!(vm.stack().peek().unwrap(), a.wrapping_div(b));
    }

    #[test]
    fn call_then_return_restores_frame(prefix in prop::collection::vec(any::<Word>(), 0..16)) {
        // CAL jumps over a HLT to an immediate RTN.
        let base = prefix.len() as Word;
        let mut instructions = pushes(&prefix);
        instructions.push((Opcode::Cal, base + 2));
        instructions.push((Opcode::Hlt, 0));
        instructions.push((Opcode::Rtn, 0));

        let (vm, outcome) = run_vm(&instructions);
        prop_assert_eq!(outcome.steps, prefix.len() as u64 + 3);
        prop_assert_eq!(vm.bp(), 0);
        prop_assert_eq!(vm.sp(), base);
    }

    #[test]
    fn listing_reproduces_every_instruction(
        body in prop::collection::vec((select(Opcode::ALL.to_vec()), any::<Word>()), 0..64),
    ) {
        let program = Program::from_instructions(
            body.iter().map(|&(op, m)| Instruction::op(op, m)).collect(),
        ).unwrap();
        let text = listing(&program).unwrap();
        let rows: Vec<&str> = text.lines().skip(1).collect();
        prop_assert_eq!(rows.len(), body.len());

        for (addr, (row, (op, m))) in rows.iter().zip(&body).enumerate() {
            let fields: Vec<String> = row.split_whitespace().map(str::to_string).collect();
            let expected = vec![addr.to_string(), op.mnemonic().to_string(), m.to_string()];
            prop_assert_eq!(fields, expected);
        }
    }
}
