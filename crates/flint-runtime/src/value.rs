//! Runtime values and runtime errors

use std::fmt;
use thiserror::Error;

/// A runtime value.
///
/// Only numbers exist at this layer, but the tagged representation is the
/// contract point for adding booleans and heap references later without
/// changing how the constant pool or operand stack store values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    /// Double-precision number
    Number(f64),
}

impl Value {
    /// The numeric payload of this value.
    pub fn as_number(&self) -> f64 {
        match self {
            Value::Number(n) => *n,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => {
                // Show integers without decimal point
                if n.fract() == 0.0 && n.is_finite() {
                    write!(f, "{:.0}", n)
                } else {
                    write!(f, "{}", n)
                }
            }
        }
    }
}

/// Errors that abort an `interpret` call.
///
/// Every variant carries the source line of the instruction that failed,
/// taken from the chunk's line table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// Pop or peek past the bottom of the operand stack
    #[error("Stack underflow")]
    StackUnderflow { line: u32 },
    /// Push past the operand stack capacity
    #[error("Stack overflow")]
    StackOverflow { line: u32 },
    /// Division by zero
    #[error("Division by zero")]
    DivideByZero { line: u32 },
    /// Invalid numeric result (NaN, Infinity)
    #[error("Invalid numeric result")]
    InvalidNumericResult { line: u32 },
    /// Byte in the instruction stream that is not a known opcode
    #[error("Unknown opcode {byte:#04x}")]
    UnknownOpcode { byte: u8, line: u32 },
    /// Constant-pool index with no corresponding pool entry
    #[error("Constant index {index} out of range")]
    ConstantOutOfRange { index: usize, line: u32 },
    /// Instruction stream ended in the middle of an operand
    #[error("Truncated instruction")]
    TruncatedInstruction { line: u32 },
}

impl RuntimeError {
    /// Source line the failing instruction was compiled from.
    pub fn line(&self) -> u32 {
        match self {
            RuntimeError::StackUnderflow { line }
            | RuntimeError::StackOverflow { line }
            | RuntimeError::DivideByZero { line }
            | RuntimeError::InvalidNumericResult { line }
            | RuntimeError::UnknownOpcode { line, .. }
            | RuntimeError::ConstantOutOfRange { line, .. }
            | RuntimeError::TruncatedInstruction { line } => *line,
        }
    }
}
