//! Chunk serialization and deserialization
//!
//! Binary format for compiled chunks (.flc files):
//! - Header: magic "FLC\0" + version u16
//! - Constants: count u32 + tagged values
//! - Code: length u32 + instruction bytes
//! - Lines: count u32 + u32 entries (index-aligned with code)
//!
//! All multi-byte fields are big-endian.

use super::Chunk;
use crate::value::Value;

/// Current chunk binary format version
///
/// Incremented when the format changes in a backward-incompatible way.
/// Deserialization rejects chunks with a different version rather than
/// misreading them.
pub const CHUNK_FORMAT_VERSION: u16 = 1;

const MAGIC: &[u8; 4] = b"FLC\0";

/// Serialize a Value to bytes
fn serialize_value(value: &Value, bytes: &mut Vec<u8>) {
    match value {
        Value::Number(n) => {
            bytes.push(0x02); // Type tag
            bytes.extend_from_slice(&n.to_be_bytes());
        }
    }
}

/// Deserialize a Value, returning it and the byte count consumed
fn deserialize_value(bytes: &[u8]) -> Result<(Value, usize), String> {
    match bytes.first() {
        Some(0x02) => {
            if bytes.len() < 9 {
                return Err("Invalid chunk: number constant truncated".to_string());
            }
            let mut buf = [0u8; 8];
            buf.copy_from_slice(&bytes[1..9]);
            Ok((Value::Number(f64::from_be_bytes(buf)), 9))
        }
        Some(tag) => Err(format!("Invalid chunk: unknown constant tag {:#04x}", tag)),
        None => Err("Invalid chunk: constants section truncated".to_string()),
    }
}

fn read_u32(bytes: &[u8], offset: &mut usize, what: &str) -> Result<u32, String> {
    if *offset + 4 > bytes.len() {
        return Err(format!("Invalid chunk: {} truncated", what));
    }
    let value = u32::from_be_bytes([
        bytes[*offset],
        bytes[*offset + 1],
        bytes[*offset + 2],
        bytes[*offset + 3],
    ]);
    *offset += 4;
    Ok(value)
}

impl Chunk {
    /// Serialize this chunk to the binary format.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();

        // Header
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&CHUNK_FORMAT_VERSION.to_be_bytes());

        // Constants section
        bytes.extend_from_slice(&(self.constants.len() as u32).to_be_bytes());
        for value in &self.constants {
            serialize_value(value, &mut bytes);
        }

        // Code section
        bytes.extend_from_slice(&(self.code.len() as u32).to_be_bytes());
        bytes.extend_from_slice(&self.code);

        // Line table section
        bytes.extend_from_slice(&(self.lines.len() as u32).to_be_bytes());
        for line in &self.lines {
            bytes.extend_from_slice(&line.to_be_bytes());
        }

        bytes
    }

    /// Deserialize a chunk from the binary format.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, String> {
        // Read and validate header
        if bytes.len() < 6 {
            return Err("Invalid chunk file: too short".to_string());
        }
        if &bytes[0..4] != MAGIC {
            return Err(
                "Invalid chunk file: bad magic number. Expected 'FLC\\0', this may not be a \
                 Flint chunk file."
                    .to_string(),
            );
        }
        let version = u16::from_be_bytes([bytes[4], bytes[5]]);
        if version != CHUNK_FORMAT_VERSION {
            return Err(format!(
                "Chunk version mismatch: file has version {}, but this runtime supports \
                 version {}. Recompile the source file.",
                version, CHUNK_FORMAT_VERSION
            ));
        }
        let mut offset = 6;

        // Read constants
        let const_count = read_u32(bytes, &mut offset, "constants section")? as usize;
        let mut constants = Vec::with_capacity(const_count);
        for _ in 0..const_count {
            let (value, consumed) = deserialize_value(&bytes[offset..])?;
            constants.push(value);
            offset += consumed;
        }

        // Read code
        let code_len = read_u32(bytes, &mut offset, "code section")? as usize;
        if offset + code_len > bytes.len() {
            return Err("Invalid chunk: code data truncated".to_string());
        }
        let code = bytes[offset..offset + code_len].to_vec();
        offset += code_len;

        // Read line table
        let line_count = read_u32(bytes, &mut offset, "line table")? as usize;
        if line_count != code_len {
            return Err(format!(
                "Invalid chunk: line table has {} entries for {} code bytes",
                line_count, code_len
            ));
        }
        let mut lines = Vec::with_capacity(line_count);
        for _ in 0..line_count {
            lines.push(read_u32(bytes, &mut offset, "line table")?);
        }

        // Verify we consumed exactly the expected amount of data
        if offset != bytes.len() {
            return Err(format!(
                "Invalid chunk: {} trailing bytes after line table",
                bytes.len() - offset
            ));
        }

        Ok(Chunk {
            code,
            lines,
            constants,
        })
    }
}
