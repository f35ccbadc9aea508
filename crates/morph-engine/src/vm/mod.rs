//! Morph VM core runtime
//!
//! This module provides the virtual machine runtime including:
//! - Tagged value model and heap objects
//! - Frames and the call stack
//! - Bytecode interpreter
//! - Native function backend

pub mod builtins;
pub mod defaults;
pub mod interpreter;
pub mod native_registry;
pub mod object;
pub mod register_file;
pub mod stack;
pub mod value;

pub use interpreter::{ExecutionResult, Interpreter, NativeCallResult, Vm, VmOptions};
pub use native_registry::NativeFunctionRegistry;
pub use object::{
    BoundMethod, Cell, Class, FileHandle, Function, Generator, Instance, NativeFn, NativeFunction,
};
pub use stack::{CallStack, ExceptionHandler, Frame, FrameKind};
pub use value::{Mapping, Value};

use crate::bytecode::ModuleError;

/// Fatal VM errors
///
/// Recoverable faults inside interpreted code degrade to Nil instead.
#[derive(Debug, thiserror::Error)]
pub enum VmError {
    /// A module could not be loaded
    #[error(transparent)]
    Module(#[from] ModuleError),

    /// Call stack grew past the configured depth
    #[error("Stack overflow: call depth exceeded {0}")]
    StackOverflow(usize),

    /// Instruction budget exhausted
    #[error("Instruction limit of {0} exceeded")]
    InstructionLimit(u64),

    /// Execution requested with nothing loaded
    #[error("Nothing to execute: call stack is empty")]
    EmptyCallStack,
}
