//! Flint execution core
//!
//! This library provides the execution layer of the Flint language:
//! - Bytecode chunks (instruction stream, line table, constant pool)
//! - Lexical analysis (pull-based scanner over borrowed source text)
//! - A stack-based virtual machine
//!
//! The parser/compiler that turns tokens into chunks is a separate
//! component; this crate consumes populated chunks and produces tokens.

/// Flint runtime version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Public API modules
pub mod bytecode;
pub mod lexer;
pub mod token;
pub mod value;
pub mod vm;

// Re-export commonly used types
pub use bytecode::{disassemble, Chunk, ChunkError, Instruction, Opcode};
pub use lexer::Scanner;
pub use token::{Token, TokenKind};
pub use value::{RuntimeError, Value};
pub use vm::{VM, STACK_MAX};
