//! Program text loader
//!
//! Program text is a stream of whitespace-separated decimal integers read in
//! `opcode operand` pairs. Loading stops quietly at the first pair that is
//! incomplete, malformed, or carries an opcode the validator rejects; whatever
//! was read up to that point is the program.

use super::validator::accepts_raw_opcode;
use super::{Instruction, Program, Word};
use crate::error::LoadError;
use std::path::Path;
use tracing::{debug, info};

impl Program {
    /// Parse program text into a program of the given capacity
    ///
    /// Reaching `capacity` accepted instructions is an error even when the
    /// text ends exactly there.
    pub fn parse(source: &str, capacity: usize) -> Result<Program, LoadError> {
        let mut tokens = source.split_whitespace();
        let mut instructions = Vec::new();

        while instructions.len() < capacity {
            let Some(instruction) = next_instruction(&mut tokens) else {
                break;
            };
            instructions.push(instruction);
        }

        if instructions.len() >= capacity {
            return Err(LoadError::TooManyInstructions { capacity });
        }

        debug!(count = instructions.len(), "parsed program text");
        Ok(Program {
            instructions,
            capacity,
        })
    }
}

fn next_instruction<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> Option<Instruction> {
    let opcode = parse_word(tokens.next())?;
    let operand = parse_word(tokens.next())?;

    if !accepts_raw_opcode(opcode) {
        debug!(opcode, "stopped loading at illegal opcode");
        return None;
    }

    Some(Instruction::new(opcode, operand))
}

fn parse_word(token: Option<&str>) -> Option<Word> {
    token?.parse().ok()
}

/// Read and parse a program file
pub fn load_program_file(path: &Path, capacity: usize) -> Result<Program, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let source = String::from_utf8_lossy(&bytes);

    let program = Program::parse(&source, capacity)?;
    info!(path = %path.display(), instructions = program.len(), "loaded program");
    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::MAX_CODE_LENGTH;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn parse(source: &str) -> Program {
        Program::parse(source, MAX_CODE_LENGTH).unwrap()
    }

    #[test]
    fn test_parse_pairs_per_line() {
        let program = parse("1 65\n11 0\n13 0\n");
        assert_eq!(
            program.instructions(),
            &[
                Instruction::new(1, 65),
                Instruction::new(11, 0),
                Instruction::new(13, 0)
            ]
        );
    }

    #[test]
    fn test_pairs_may_span_lines() {
        let program = parse("1\n-7 13\n0");
        assert_eq!(
            program.instructions(),
            &[Instruction::new(1, -7), Instruction::new(13, 0)]
        );
    }

    #[rstest]
    #[case::illegal_first("99 0\n13 0\n", 0)]
    #[case::illegal_later("1 1\n1 2\n28 0\n13 0\n", 2)]
    #[case::negative_opcode("1 1\n-1 0\n", 1)]
    #[case::missing_operand("1 1\n13\n", 1)]
    #[case::malformed_operand("1 1\n13 x\n", 1)]
    #[case::malformed_opcode("LIT 1\n", 0)]
    #[case::empty("", 0)]
    fn test_loading_stops_silently(#[case] source: &str, #[case] count: usize) {
        assert_eq!(parse(source).len(), count);
    }

    #[test]
    fn test_opcode_zero_is_loaded() {
        let program = parse("0 5\n13 0\n");
        assert_eq!(program.len(), 2);
        assert_eq!(program.instructions()[0], Instruction::new(0, 5));
    }

    #[test]
    fn test_too_many_instructions() {
        let source = "4 0\n".repeat(4);
        let result = Program::parse(&source, 4);
        assert!(matches!(
            result,
            Err(LoadError::TooManyInstructions { capacity: 4 })
        ));

        assert_eq!(Program::parse(&"4 0\n".repeat(3), 4).unwrap().len(), 3);
    }

    #[test]
    fn test_load_program_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "1 5\n1 3\n17 0\n13 0").unwrap();

        let program = load_program_file(file.path(), MAX_CODE_LENGTH).unwrap();
        assert_eq!(program.len(), 4);
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_program_file(Path::new("does/not/exist.pm0"), MAX_CODE_LENGTH);
        assert!(matches!(result, Err(LoadError::Open { .. })));
    }
}
