//! Morph bytecode definitions
//!
//! Instruction set, code objects, and the binary module format consumed by
//! the interpreter.

pub mod builder;
pub mod code;
pub mod disasm;
pub mod encoder;
pub mod module;
pub mod opcode;

pub use builder::CodeBuilder;
pub use code::{CodeObject, Instruction};
pub use disasm::disassemble;
pub use encoder::{BytecodeReader, BytecodeWriter, DecodeError};
pub use module::{decode_value, encode_value, Module, ModuleError, ModuleHeader, MAGIC};
pub use opcode::Opcode;
