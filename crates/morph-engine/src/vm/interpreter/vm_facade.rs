//! Synchronous VM facade for embedding and testing

use super::context::VmOptions;
use super::core::Interpreter;
use super::execution::ExecutionResult;
use super::native_module_registry::NativeModule;
use crate::bytecode::{CodeObject, Module, ModuleError};
use crate::vm::object::{NativeFn, NativeFunction};
use crate::vm::value::Value;
use crate::vm::VmError;
use std::io::{BufRead, Write};
use std::path::Path;
use std::rc::Rc;
use tracing::debug;

/// Morph virtual machine
pub struct Vm {
    interpreter: Interpreter,
}

impl Vm {
    /// Create a VM with default options
    pub fn new() -> Self {
        Self::with_options(VmOptions::default())
    }

    pub fn with_options(options: VmOptions) -> Self {
        Self {
            interpreter: Interpreter::new(options),
        }
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    pub fn interpreter_mut(&mut self) -> &mut Interpreter {
        &mut self.interpreter
    }

    /// Redirect program output
    pub fn set_output(&mut self, output: Box<dyn Write>) {
        self.interpreter.set_output(output);
    }

    /// Redirect program input
    pub fn set_input(&mut self, input: Box<dyn BufRead>) {
        self.interpreter.set_input(input);
    }

    /// Expose a host function as a global
    pub fn register_native(&mut self, name: &str, func: NativeFn) {
        let native = Value::Native(Rc::new(NativeFunction::new(name, func)));
        self.interpreter.set_global(name, native);
    }

    /// Make a host module importable by name
    pub fn register_native_module(&mut self, module: NativeModule) -> Result<(), String> {
        self.interpreter.native_modules.register(module)
    }

    pub fn get_global(&self, name: &str) -> Option<Value> {
        self.interpreter.get_global(name)
    }

    /// Decode a module from bytes without running it
    pub fn load_bytes(&self, data: &[u8]) -> Result<Module, ModuleError> {
        Module::decode(data)
    }

    /// Read and decode a module file without running it
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Module, ModuleError> {
        Module::from_file(path)
    }

    /// Run a module's root code to completion
    pub fn execute(&mut self, module: &Module) -> ExecutionResult {
        self.execute_code(module.code.clone())
    }

    /// Run a code object as the root frame
    pub fn execute_code(&mut self, code: impl Into<Rc<CodeObject>>) -> ExecutionResult {
        self.interpreter.start(code.into());
        let result = self.interpreter.run();
        debug!(
            instructions = self.interpreter.instruction_count(),
            outcome = ?result,
            "execution finished"
        );
        result
    }

    /// Load and run a module file
    ///
    /// Load failures are reported as `Failed` without executing anything.
    pub fn run_file(&mut self, path: impl AsRef<Path>) -> ExecutionResult {
        match Module::from_file(path) {
            Ok(module) => self.execute(&module),
            Err(e) => ExecutionResult::Failed(VmError::Module(e)),
        }
    }

    /// Load and run a module from bytes
    pub fn run_bytes(&mut self, data: &[u8]) -> ExecutionResult {
        match Module::decode(data) {
            Ok(module) => self.execute(&module),
            Err(e) => ExecutionResult::Failed(VmError::Module(e)),
        }
    }
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}
