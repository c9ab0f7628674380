//! Stack-based virtual machine
//!
//! Executes chunk instructions with an operand stack:
//! - Dispatch is a `match` over the exhaustive opcode enum
//! - Arithmetic checks operand types, division by zero, and NaN/Infinity
//! - Every runtime error carries the source line of the failing
//!   instruction, looked up in the chunk's line table

use crate::bytecode::{Chunk, Opcode};
use crate::value::{RuntimeError, Value};

/// Maximum operand stack depth
///
/// Pushing past this bound is a reported `StackOverflow`, never silent
/// memory growth from a runaway chunk.
pub const STACK_MAX: usize = 256;

/// Virtual machine state
///
/// A VM value is reusable: `interpret` resets the operand stack and
/// instruction pointer before running, so independent chunks can be run
/// back to back on one instance. The chunk is borrowed read-only for the
/// duration of the call.
pub struct VM {
    /// Operand stack
    stack: Vec<Value>,
    /// Instruction pointer (index into the current chunk's code)
    ip: usize,
}

impl VM {
    /// Create a new VM with an empty operand stack.
    pub fn new() -> Self {
        Self {
            stack: Vec::with_capacity(STACK_MAX),
            ip: 0,
        }
    }

    /// Reset the operand stack and instruction pointer.
    pub fn reset(&mut self) {
        self.stack.clear();
        self.ip = 0;
    }

    /// Operand stack contents, bottom to top.
    ///
    /// After a successful `interpret` the stack is left as the program
    /// produced it, so callers can inspect the final state.
    pub fn stack(&self) -> &[Value] {
        &self.stack
    }

    /// Value `distance` slots down from the top of the stack.
    pub fn peek(&self, distance: usize) -> Option<&Value> {
        self.stack
            .len()
            .checked_sub(1 + distance)
            .and_then(|index| self.stack.get(index))
    }

    /// Execute a chunk to completion.
    ///
    /// Runs the fetch-decode-execute loop until a `Return` instruction,
    /// the end of the code (both success), or a runtime error. On success
    /// the result is the top of the stack, if any.
    pub fn interpret(&mut self, chunk: &Chunk) -> Result<Option<Value>, RuntimeError> {
        self.reset();
        self.run(chunk)
    }

    fn run(&mut self, chunk: &Chunk) -> Result<Option<Value>, RuntimeError> {
        while self.ip < chunk.len() {
            // Line of the opcode being executed, for error attribution
            let line = chunk.line(self.ip);
            let byte = chunk.code()[self.ip];
            self.ip += 1;
            let opcode = Opcode::try_from(byte)
                .map_err(|_| RuntimeError::UnknownOpcode { byte, line })?;

            match opcode {
                Opcode::Constant => {
                    let index = self.read_u8(chunk, line)? as usize;
                    let value = constant(chunk, index, line)?;
                    self.push(value, line)?;
                }
                Opcode::ConstantLong => {
                    let index = self.read_u24(chunk, line)? as usize;
                    let value = constant(chunk, index, line)?;
                    self.push(value, line)?;
                }

                Opcode::Add => self.binary_op(|a, b| a + b, line)?,
                Opcode::Sub => self.binary_op(|a, b| a - b, line)?,
                Opcode::Mul => self.binary_op(|a, b| a * b, line)?,
                Opcode::Div => {
                    let b = self.pop_number(line)?;
                    let a = self.pop_number(line)?;
                    if b == 0.0 {
                        return Err(RuntimeError::DivideByZero { line });
                    }
                    self.push_number(a / b, line)?;
                }
                Opcode::Negate => {
                    let n = self.pop_number(line)?;
                    self.push(Value::Number(-n), line)?;
                }

                Opcode::Return => break,
            }
        }
        Ok(self.stack.last().copied())
    }

    // ===== Helper Methods =====

    #[inline(always)]
    fn push(&mut self, value: Value, line: u32) -> Result<(), RuntimeError> {
        if self.stack.len() >= STACK_MAX {
            return Err(RuntimeError::StackOverflow { line });
        }
        self.stack.push(value);
        Ok(())
    }

    #[inline(always)]
    fn pop(&mut self, line: u32) -> Result<Value, RuntimeError> {
        self.stack.pop().ok_or(RuntimeError::StackUnderflow { line })
    }

    #[inline(always)]
    fn pop_number(&mut self, line: u32) -> Result<f64, RuntimeError> {
        match self.pop(line)? {
            Value::Number(n) => Ok(n),
        }
    }

    /// Push a numeric result, rejecting NaN and Infinity.
    #[inline(always)]
    fn push_number(&mut self, n: f64, line: u32) -> Result<(), RuntimeError> {
        if n.is_nan() || n.is_infinite() {
            return Err(RuntimeError::InvalidNumericResult { line });
        }
        self.push(Value::Number(n), line)
    }

    /// Binary arithmetic: right operand is popped first, left second,
    /// preserving left-to-right evaluation for non-commutative operators.
    #[inline(always)]
    fn binary_op<F>(&mut self, op: F, line: u32) -> Result<(), RuntimeError>
    where
        F: FnOnce(f64, f64) -> f64,
    {
        let b = self.pop_number(line)?;
        let a = self.pop_number(line)?;
        self.push_number(op(a, b), line)
    }

    #[inline(always)]
    fn read_u8(&mut self, chunk: &Chunk, line: u32) -> Result<u8, RuntimeError> {
        let byte = *chunk
            .code()
            .get(self.ip)
            .ok_or(RuntimeError::TruncatedInstruction { line })?;
        self.ip += 1;
        Ok(byte)
    }

    #[inline(always)]
    fn read_u24(&mut self, chunk: &Chunk, line: u32) -> Result<u32, RuntimeError> {
        let code = chunk.code();
        if self.ip + 2 >= code.len() {
            return Err(RuntimeError::TruncatedInstruction { line });
        }
        let value = ((code[self.ip] as u32) << 16)
            | ((code[self.ip + 1] as u32) << 8)
            | (code[self.ip + 2] as u32);
        self.ip += 3;
        Ok(value)
    }
}

impl Default for VM {
    fn default() -> Self {
        Self::new()
    }
}

#[inline(always)]
fn constant(chunk: &Chunk, index: usize, line: u32) -> Result<Value, RuntimeError> {
    chunk
        .constants()
        .get(index)
        .copied()
        .ok_or(RuntimeError::ConstantOutOfRange { index, line })
}
