//! Compiled code objects

use super::opcode::Opcode;
use crate::vm::value::Value;

/// One instruction: raw opcode byte plus its operand
///
/// The raw byte is kept so unknown opcodes survive decoding and can be
/// skipped at run time.
#[derive(Debug, Clone)]
pub struct Instruction {
    pub op: u8,
    pub arg: Value,
}

impl Instruction {
    pub fn new(opcode: Opcode, arg: Value) -> Self {
        Self {
            op: opcode.to_u8(),
            arg,
        }
    }

    /// Decoded opcode, if the byte is assigned
    pub fn opcode(&self) -> Option<Opcode> {
        Opcode::from_u8(self.op)
    }
}

/// Immutable compiled body of a function or module
///
/// Shared by every function value that wraps it.
#[derive(Debug, Clone, Default)]
pub struct CodeObject {
    /// Function or module name
    pub name: String,
    /// Ordered parameter names
    pub arg_names: Vec<String>,
    /// Constant pool
    pub constants: Vec<Value>,
    /// Instruction sequence
    pub instructions: Vec<Instruction>,
    /// Names captured from the enclosing scope, matched positionally
    /// against a function's closure cells
    pub free_vars: Vec<String>,
    /// Names this body exposes to nested closures
    pub cell_vars: Vec<String>,
}

impl CodeObject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}
