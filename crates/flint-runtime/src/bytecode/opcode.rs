//! Bytecode instruction set

/// Bytecode opcode
///
/// Stack-based VM with explicit byte values for serialization.
/// Operands are encoded inline after the opcode byte.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    // ===== Constants (0x01-0x0F) =====
    /// Push constant from pool [u8 index]
    Constant = 0x01,
    /// Push constant from pool [u24 big-endian index]
    ConstantLong = 0x02,

    // ===== Arithmetic (0x20-0x2F) =====
    /// Pop b, pop a, push a + b
    Add = 0x20,
    /// Pop b, pop a, push a - b
    Sub = 0x21,
    /// Pop b, pop a, push a * b
    Mul = 0x22,
    /// Pop b, pop a, push a / b
    Div = 0x23,
    /// Pop a, push -a
    Negate = 0x24,

    // ===== Special (0xF0-0xFF) =====
    /// Halt interpretation, signaling success
    Return = 0xFF,
}

impl TryFrom<u8> for Opcode {
    type Error = ();

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            0x01 => Ok(Opcode::Constant),
            0x02 => Ok(Opcode::ConstantLong),
            0x20 => Ok(Opcode::Add),
            0x21 => Ok(Opcode::Sub),
            0x22 => Ok(Opcode::Mul),
            0x23 => Ok(Opcode::Div),
            0x24 => Ok(Opcode::Negate),
            0xFF => Ok(Opcode::Return),
            _ => Err(()),
        }
    }
}
