//! Bytecode chunk container
//!
//! A chunk holds a linear instruction stream (opcode bytes interleaved
//! with operand bytes), a line table for diagnostics, and the constant
//! pool its instructions reference by index.

mod disasm;
mod opcode;
mod serialize;

pub use disasm::{disassemble, Instruction};
pub use opcode::Opcode;
pub use serialize::CHUNK_FORMAT_VERSION;

use crate::value::Value;
use thiserror::Error;

/// Widest addressable constant index: 24-bit operand of `ConstantLong`.
const MAX_CONSTANT_INDEX: usize = (1 << 24) - 1;

/// Errors raised while building a chunk.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkError {
    /// More constants than the widest operand encoding can address
    #[error("Too many constants in one chunk ({count})")]
    TooManyConstants { count: usize },
}

/// A unit of compiled bytecode.
///
/// `code` and `lines` grow in lockstep: the byte at `code[i]` was compiled
/// from source line `lines[i]`. The line table is diagnostics-only and
/// never consulted by dispatch. All three buffers start unallocated and
/// grow with amortized O(1) appends; dropping the chunk releases them as
/// a unit.
#[derive(Debug, Clone, Default)]
pub struct Chunk {
    /// Raw instruction bytes
    code: Vec<u8>,
    /// Source line for each byte in `code`, index-aligned
    lines: Vec<u32>,
    /// Constant pool (referenced by index)
    constants: Vec<Value>,
}

impl Chunk {
    /// Create a new empty chunk. Allocates nothing until the first write.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one instruction or operand byte and its source line.
    pub fn write(&mut self, byte: u8, line: u32) {
        self.code.push(byte);
        self.lines.push(line);
    }

    /// Append an opcode byte.
    pub fn emit(&mut self, opcode: Opcode, line: u32) {
        self.write(opcode as u8, line);
    }

    /// Add a constant to the pool and return its index.
    ///
    /// Repeated equal constants get distinct slots; the pool is
    /// append-only and never deduplicated.
    pub fn add_constant(&mut self, value: Value) -> usize {
        self.constants.push(value);
        self.constants.len() - 1
    }

    /// Add a constant and emit the instruction that loads it.
    ///
    /// Indices that fit in one byte use `Constant`; larger ones use
    /// `ConstantLong` with a 24-bit big-endian operand. Indices beyond
    /// the wide encoding are an error, never a silent truncation.
    pub fn write_constant(&mut self, value: Value, line: u32) -> Result<usize, ChunkError> {
        if self.constants.len() > MAX_CONSTANT_INDEX {
            return Err(ChunkError::TooManyConstants {
                count: self.constants.len(),
            });
        }
        let index = self.add_constant(value);
        if index <= u8::MAX as usize {
            self.emit(Opcode::Constant, line);
            self.write(index as u8, line);
        } else {
            self.emit(Opcode::ConstantLong, line);
            self.write((index >> 16) as u8, line);
            self.write((index >> 8) as u8, line);
            self.write(index as u8, line);
        }
        Ok(index)
    }

    /// The instruction stream.
    pub fn code(&self) -> &[u8] {
        &self.code
    }

    /// The line table, index-aligned with `code`.
    pub fn lines(&self) -> &[u32] {
        &self.lines
    }

    /// The constant pool.
    pub fn constants(&self) -> &[Value] {
        &self.constants
    }

    /// Source line for the byte at `offset`, or 0 when out of range.
    pub fn line(&self, offset: usize) -> u32 {
        self.lines.get(offset).copied().unwrap_or(0)
    }

    /// Number of bytes in the instruction stream.
    pub fn len(&self) -> usize {
        self.code.len()
    }

    /// True when no instructions have been written.
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_creation() {
        let chunk = Chunk::new();
        assert!(chunk.is_empty());
        assert_eq!(chunk.lines().len(), 0);
        assert_eq!(chunk.constants().len(), 0);
    }

    #[test]
    fn test_write_keeps_lines_aligned() {
        let mut chunk = Chunk::new();
        chunk.write(0x01, 1);
        chunk.write(0x00, 1);
        chunk.emit(Opcode::Return, 2);
        assert_eq!(chunk.code(), &[0x01, 0x00, 0xFF]);
        assert_eq!(chunk.lines(), &[1, 1, 2]);
    }

    #[test]
    fn test_add_constant_returns_sequential_indices() {
        let mut chunk = Chunk::new();
        let idx1 = chunk.add_constant(Value::Number(1.2));
        let idx2 = chunk.add_constant(Value::Number(3.4));
        assert_eq!(idx1, 0);
        assert_eq!(idx2, 1);
        assert_eq!(chunk.constants()[idx2], Value::Number(3.4));
    }

    #[test]
    fn test_add_constant_no_dedup() {
        let mut chunk = Chunk::new();
        let idx1 = chunk.add_constant(Value::Number(42.0));
        let idx2 = chunk.add_constant(Value::Number(42.0));
        assert_eq!(idx1, 0);
        assert_eq!(idx2, 1);
        assert_eq!(chunk.constants().len(), 2);
    }

    #[test]
    fn test_write_constant_short_encoding() {
        let mut chunk = Chunk::new();
        let idx = chunk.write_constant(Value::Number(1.2), 12).unwrap();
        assert_eq!(idx, 0);
        assert_eq!(chunk.code(), &[Opcode::Constant as u8, 0]);
        assert_eq!(chunk.lines(), &[12, 12]);
    }

    #[test]
    fn test_write_constant_wide_encoding() {
        let mut chunk = Chunk::new();
        for _ in 0..256 {
            chunk.add_constant(Value::Number(0.0));
        }
        let idx = chunk.write_constant(Value::Number(7.0), 3).unwrap();
        assert_eq!(idx, 256);
        assert_eq!(
            chunk.code(),
            &[Opcode::ConstantLong as u8, 0x00, 0x01, 0x00]
        );
        assert_eq!(chunk.constants()[idx], Value::Number(7.0));
    }

    #[test]
    fn test_write_constant_boundary_index_255() {
        let mut chunk = Chunk::new();
        for _ in 0..255 {
            chunk.add_constant(Value::Number(0.0));
        }
        // Index 255 still fits the one-byte form
        chunk.write_constant(Value::Number(1.0), 1).unwrap();
        assert_eq!(chunk.code()[0], Opcode::Constant as u8);
        assert_eq!(chunk.code()[1], 255);
    }

    #[test]
    fn test_line_lookup() {
        let mut chunk = Chunk::new();
        chunk.emit(Opcode::Return, 42);
        assert_eq!(chunk.line(0), 42);
        assert_eq!(chunk.line(99), 0);
    }
}
