//! Fixed register bank shared by every frame
//!
//! Registers are a scratch area the Morph compiler uses for hot loop
//! counters. They are not saved across calls.

use crate::vm::defaults::REGISTER_COUNT;
use crate::vm::value::Value;

#[derive(Debug, Clone)]
pub struct RegisterFile {
    registers: Vec<Value>,
}

impl RegisterFile {
    pub fn new() -> Self {
        Self::with_size(REGISTER_COUNT)
    }

    pub fn with_size(size: usize) -> Self {
        Self {
            registers: vec![Value::Nil; size],
        }
    }

    /// Read a register; out-of-range indices read as Nil
    pub fn get(&self, index: usize) -> Value {
        self.registers.get(index).cloned().unwrap_or_default()
    }

    /// Write a register; out-of-range writes are ignored
    pub fn set(&mut self, index: usize, value: Value) -> bool {
        match self.registers.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.registers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}
