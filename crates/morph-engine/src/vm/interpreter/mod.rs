//! Virtual machine execution and context management

mod context;
mod core;
mod execution;
mod module_registry;
mod native_module_registry;
pub mod opcodes;
mod vm_facade;

pub use context::VmOptions;
pub use core::Interpreter;
pub use execution::{ExecutionResult, NativeCallResult, OpcodeResult};
pub use module_registry::ModuleRegistry;
pub use native_module_registry::{NativeModule, NativeModuleRegistry};
pub use vm_facade::Vm;
