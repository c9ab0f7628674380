//! Bytecode disassembler
//!
//! Converts a chunk back to human-readable assembly-like format.
//! Diagnostic-only: nothing in the execution path depends on it.

use super::{Chunk, Opcode};
use std::fmt::Write;

/// A decoded instruction.
///
/// The structured counterpart of the mnemonic view: decoding a chunk's
/// byte stream instruction by instruction and re-encoding reproduces the
/// original bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// Load constant by one-byte pool index
    Constant(u8),
    /// Load constant by 24-bit pool index
    ConstantLong(u32),
    Add,
    Sub,
    Mul,
    Div,
    Negate,
    Return,
}

impl Instruction {
    /// Decode the instruction starting at `offset` in `code`.
    ///
    /// Returns the instruction and the offset of the next one, or `None`
    /// when the byte is not a known opcode or its operands are truncated.
    pub fn decode_at(code: &[u8], offset: usize) -> Option<(Self, usize)> {
        let opcode = Opcode::try_from(*code.get(offset)?).ok()?;
        match opcode {
            Opcode::Constant => {
                let index = *code.get(offset + 1)?;
                Some((Instruction::Constant(index), offset + 2))
            }
            Opcode::ConstantLong => {
                if offset + 3 >= code.len() {
                    return None;
                }
                let index = ((code[offset + 1] as u32) << 16)
                    | ((code[offset + 2] as u32) << 8)
                    | (code[offset + 3] as u32);
                Some((Instruction::ConstantLong(index), offset + 4))
            }
            Opcode::Add => Some((Instruction::Add, offset + 1)),
            Opcode::Sub => Some((Instruction::Sub, offset + 1)),
            Opcode::Mul => Some((Instruction::Mul, offset + 1)),
            Opcode::Div => Some((Instruction::Div, offset + 1)),
            Opcode::Negate => Some((Instruction::Negate, offset + 1)),
            Opcode::Return => Some((Instruction::Return, offset + 1)),
        }
    }

    /// Append this instruction's byte encoding to `code`.
    pub fn encode(&self, code: &mut Vec<u8>) {
        match self {
            Instruction::Constant(index) => {
                code.push(Opcode::Constant as u8);
                code.push(*index);
            }
            Instruction::ConstantLong(index) => {
                code.push(Opcode::ConstantLong as u8);
                code.push((index >> 16) as u8);
                code.push((index >> 8) as u8);
                code.push(*index as u8);
            }
            Instruction::Add => code.push(Opcode::Add as u8),
            Instruction::Sub => code.push(Opcode::Sub as u8),
            Instruction::Mul => code.push(Opcode::Mul as u8),
            Instruction::Div => code.push(Opcode::Div as u8),
            Instruction::Negate => code.push(Opcode::Negate as u8),
            Instruction::Return => code.push(Opcode::Return as u8),
        }
    }
}

/// Disassemble a chunk to human-readable format
///
/// # Format
/// ```text
/// == test chunk ==
/// === Constants ===
/// 0: 1.2
///
/// === Instructions ===
/// 0000   12  Constant 0 '1.2'
/// 0002    |  Return
/// ```
///
/// The line column shows `|` when the instruction comes from the same
/// source line as the previous one.
pub fn disassemble(chunk: &Chunk, name: &str) -> String {
    let mut output = String::new();
    writeln!(output, "== {} ==", name).unwrap();

    // Constants section
    if !chunk.constants().is_empty() {
        writeln!(output, "=== Constants ===").unwrap();
        for (idx, constant) in chunk.constants().iter().enumerate() {
            writeln!(output, "{}: {}", idx, constant).unwrap();
        }
        writeln!(output).unwrap();
    }

    // Instructions section
    writeln!(output, "=== Instructions ===").unwrap();
    let mut offset = 0;
    let mut previous_line = None;
    while offset < chunk.code().len() {
        let line = chunk.line(offset);
        if previous_line == Some(line) {
            write!(output, "{:04}    |  ", offset).unwrap();
        } else {
            write!(output, "{:04} {:>4}  ", offset, line).unwrap();
        }
        previous_line = Some(line);

        match Instruction::decode_at(chunk.code(), offset) {
            Some((instruction, next)) => {
                writeln!(output, "{}", format_instruction(&instruction, chunk)).unwrap();
                offset = next;
            }
            None => {
                writeln!(output, "<invalid opcode: {:#04x}>", chunk.code()[offset]).unwrap();
                offset += 1;
            }
        }
    }

    output
}

/// Format a single decoded instruction, resolving constant references.
fn format_instruction(instruction: &Instruction, chunk: &Chunk) -> String {
    match instruction {
        Instruction::Constant(index) => {
            format!(
                "Constant {} '{}'",
                index,
                resolve_constant(chunk, *index as usize)
            )
        }
        Instruction::ConstantLong(index) => {
            format!(
                "ConstantLong {} '{}'",
                index,
                resolve_constant(chunk, *index as usize)
            )
        }
        simple => format!("{:?}", simple),
    }
}

fn resolve_constant(chunk: &Chunk, index: usize) -> String {
    match chunk.constants().get(index) {
        Some(value) => value.to_string(),
        None => "<out of range>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn test_disassemble_empty() {
        let chunk = Chunk::new();
        let output = disassemble(&chunk, "empty");
        assert!(output.contains("== empty =="));
        assert!(output.contains("=== Instructions ==="));
        assert!(!output.contains("=== Constants ==="));
    }

    #[test]
    fn test_disassemble_simple_opcodes() {
        let mut chunk = Chunk::new();
        chunk.emit(Opcode::Add, 1);
        chunk.emit(Opcode::Negate, 1);
        chunk.emit(Opcode::Return, 2);

        let output = disassemble(&chunk, "ops");
        assert!(output.contains("0000    1  Add"));
        assert!(output.contains("0001    |  Negate"));
        assert!(output.contains("0002    2  Return"));
    }

    #[test]
    fn test_disassemble_resolves_constants() {
        let mut chunk = Chunk::new();
        chunk.write_constant(Value::Number(1.2), 12).unwrap();
        chunk.emit(Opcode::Return, 12);

        let output = disassemble(&chunk, "test chunk");
        assert!(output.contains("=== Constants ==="));
        assert!(output.contains("0: 1.2"));
        assert!(output.contains("0000   12  Constant 0 '1.2'"));
        assert!(output.contains("0002    |  Return"));
    }

    #[test]
    fn test_disassemble_wide_constant() {
        let mut chunk = Chunk::new();
        for _ in 0..256 {
            chunk.add_constant(Value::Number(0.0));
        }
        chunk.write_constant(Value::Number(9.5), 1).unwrap();

        let output = disassemble(&chunk, "wide");
        assert!(output.contains("ConstantLong 256 '9.5'"));
    }

    #[test]
    fn test_disassemble_invalid_opcode() {
        let mut chunk = Chunk::new();
        chunk.write(0x7E, 1);
        let output = disassemble(&chunk, "bad");
        assert!(output.contains("<invalid opcode: 0x7e>"));
    }

    #[test]
    fn test_decode_truncated_operand() {
        // Constant opcode with no index byte following
        let code = [Opcode::Constant as u8];
        assert_eq!(Instruction::decode_at(&code, 0), None);
    }

    #[test]
    fn test_decode_reencode_reproduces_bytes() {
        let mut chunk = Chunk::new();
        chunk.write_constant(Value::Number(1.2), 1).unwrap();
        chunk.write_constant(Value::Number(3.4), 1).unwrap();
        chunk.emit(Opcode::Add, 1);
        chunk.emit(Opcode::Return, 2);

        let mut reencoded = Vec::new();
        let mut offset = 0;
        while offset < chunk.code().len() {
            let (instruction, next) =
                Instruction::decode_at(chunk.code(), offset).expect("valid instruction stream");
            instruction.encode(&mut reencoded);
            offset = next;
        }
        assert_eq!(reencoded, chunk.code());
    }
}
