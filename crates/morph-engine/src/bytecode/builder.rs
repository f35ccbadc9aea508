//! Programmatic assembler for code objects
//!
//! Used by tests and host tooling to build bytecode without an external
//! compiler.

use super::code::{CodeObject, Instruction};
use super::opcode::Opcode;
use crate::vm::value::Value;

/// Incremental builder for a [`CodeObject`]
#[derive(Debug, Clone)]
pub struct CodeBuilder {
    code: CodeObject,
}

impl CodeBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            code: CodeObject::new(name),
        }
    }

    /// Set parameter names
    pub fn params(&mut self, names: &[&str]) -> &mut Self {
        self.code.arg_names = names.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Set free-variable names
    pub fn free_vars(&mut self, names: &[&str]) -> &mut Self {
        self.code.free_vars = names.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Set cell-variable names
    pub fn cell_vars(&mut self, names: &[&str]) -> &mut Self {
        self.code.cell_vars = names.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Add a constant-pool entry, returning its index
    pub fn constant(&mut self, value: impl Into<Value>) -> usize {
        self.code.constants.push(value.into());
        self.code.constants.len() - 1
    }

    /// Append an instruction with an operand
    pub fn emit(&mut self, opcode: Opcode, arg: impl Into<Value>) -> &mut Self {
        self.code.instructions.push(Instruction::new(opcode, arg.into()));
        self
    }

    /// Append an instruction with a Nil operand
    pub fn op(&mut self, opcode: Opcode) -> &mut Self {
        self.emit(opcode, Value::Nil)
    }

    /// Append an instruction by raw byte, including unassigned ones
    pub fn emit_raw(&mut self, op: u8, arg: impl Into<Value>) -> &mut Self {
        self.code.instructions.push(Instruction {
            op,
            arg: arg.into(),
        });
        self
    }

    /// Index the next instruction will occupy
    pub fn position(&self) -> usize {
        self.code.instructions.len()
    }

    /// Append a jump with a placeholder target, returning its index
    pub fn emit_jump(&mut self, opcode: Opcode) -> usize {
        let at = self.position();
        self.emit(opcode, Value::Nil);
        at
    }

    /// Point the jump at `at` to the current position
    pub fn patch_jump(&mut self, at: usize) -> &mut Self {
        let target = self.position() as i64;
        if let Some(instr) = self.code.instructions.get_mut(at) {
            instr.arg = Value::Integer(target);
        }
        self
    }

    /// Snapshot the code built so far
    pub fn build(&self) -> CodeObject {
        self.code.clone()
    }

    pub fn finish(self) -> CodeObject {
        self.code
    }
}
