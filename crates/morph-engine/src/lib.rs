//! Morph Engine
//!
//! A stack-based virtual machine for compiled Morph modules:
//! - **Bytecode**: opcodes, code objects, and the `.mvm` module format (`bytecode` module)
//! - **VM**: value model, frames, interpreter loop, and native backend (`vm` module)
//!
//! # Example
//!
//! ```rust,ignore
//! use morph_engine::{Vm, ExecutionResult};
//!
//! let mut vm = Vm::new();
//! match vm.run_file("program.mvm")? {
//!     ExecutionResult::Completed(value) => println!("{}", value),
//!     other => eprintln!("{:?}", other),
//! }
//! ```

#![warn(rust_2018_idioms)]

pub mod bytecode;
pub mod vm;

pub use bytecode::{CodeBuilder, CodeObject, Module, ModuleError, Opcode};
pub use vm::{ExecutionResult, Value, Vm, VmError, VmOptions};
