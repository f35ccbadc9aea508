//! Frame-stack interpreter
//!
//! Runs the top frame of the call stack one instruction at a time until the
//! stack empties, HALT executes, a native requests exit, an exception escapes,
//! or a fatal error occurs. Calls, returns, module imports and generator
//! resumes all push or pop frames on the same loop; nothing recurses on the
//! host stack.

use super::context::VmOptions;
use super::execution::{ExecutionResult, OpcodeResult};
use super::module_registry::ModuleRegistry;
use super::native_module_registry::NativeModuleRegistry;
use crate::bytecode::{CodeObject, Instruction, Opcode};
use crate::vm::builtins;
use crate::vm::defaults::ARGS_GLOBAL;
use crate::vm::native_registry::NativeFunctionRegistry;
use crate::vm::register_file::RegisterFile;
use crate::vm::stack::{CallStack, Frame, FrameKind};
use crate::vm::value::{Mapping, Value};
use crate::vm::VmError;
use rustc_hash::FxHashMap;
use std::io::{BufRead, BufReader, Write};
use std::rc::Rc;
use tracing::{debug, trace, warn};

/// Interpreter state
///
/// Globals, loaded modules and registries are owned here rather than in
/// process-wide statics, so independent interpreters never share state.
pub struct Interpreter {
    /// Active frames; the last one executes
    pub(in crate::vm) frames: CallStack,

    /// Process-wide variables (`LOAD_VAR`/`STORE_VAR` outside modules)
    pub(in crate::vm) globals: FxHashMap<String, Value>,

    /// Scratch registers
    pub(in crate::vm) registers: RegisterFile,

    /// Modules that finished (or are running) initialization
    pub(in crate::vm) modules: ModuleRegistry,

    /// Host-provided modules resolvable by IMPORT
    pub(in crate::vm) native_modules: NativeModuleRegistry,

    pub(in crate::vm) options: VmOptions,

    output: Box<dyn Write>,
    input: Box<dyn BufRead>,
    instruction_count: u64,
}

impl Interpreter {
    /// Create an interpreter with builtins installed
    pub fn new(options: VmOptions) -> Self {
        let mut natives = NativeFunctionRegistry::new();
        builtins::register_builtins(&mut natives);

        let mut native_modules = NativeModuleRegistry::new();
        builtins::register_native_modules(&mut native_modules);

        let mut globals: FxHashMap<String, Value> = natives.values().collect();
        let args = options.args.iter().map(|a| Value::string(a.as_str())).collect();
        globals.insert(ARGS_GLOBAL.to_string(), Value::list(args));

        Self {
            frames: CallStack::new(),
            globals,
            registers: RegisterFile::new(),
            modules: ModuleRegistry::new(),
            native_modules,
            options,
            output: Box::new(std::io::stdout()),
            input: Box::new(BufReader::new(std::io::stdin())),
            instruction_count: 0,
        }
    }

    // ===== Host accessors =====

    pub fn options(&self) -> &VmOptions {
        &self.options
    }

    pub fn call_stack(&self) -> &CallStack {
        &self.frames
    }

    pub fn modules(&self) -> &ModuleRegistry {
        &self.modules
    }

    pub fn instruction_count(&self) -> u64 {
        self.instruction_count
    }

    pub fn get_global(&self, name: &str) -> Option<Value> {
        self.globals.get(name).cloned()
    }

    pub fn set_global(&mut self, name: impl Into<String>, value: Value) {
        self.globals.insert(name.into(), value);
    }

    /// Redirect PRINT and the printing natives
    pub fn set_output(&mut self, output: Box<dyn Write>) {
        self.output = output;
    }

    /// Redirect the line-reading native
    pub fn set_input(&mut self, input: Box<dyn BufRead>) {
        self.input = input;
    }

    pub fn output(&mut self) -> &mut dyn Write {
        self.output.as_mut()
    }

    pub fn input(&mut self) -> &mut dyn BufRead {
        self.input.as_mut()
    }

    /// Write text to the output sink, logging failures
    pub fn write_output(&mut self, text: &str) {
        if let Err(e) = self.output.write_all(text.as_bytes()) {
            warn!(error = %e, "failed to write program output");
        }
    }

    // ===== Operand stack of the active frame =====

    /// Push onto the active frame; dropped if no frame is active
    pub fn push(&mut self, value: Value) {
        if let Some(frame) = self.frames.top_mut() {
            frame.push(value);
        }
    }

    /// Pop from the active frame; Nil if the stack or frame is empty
    pub fn pop(&mut self) -> Value {
        self.frames
            .top_mut()
            .map(Frame::pop)
            .unwrap_or_default()
    }

    /// Pop `argc` values in push order
    pub fn pop_args(&mut self, argc: usize) -> Vec<Value> {
        match self.frames.top_mut() {
            Some(frame) => frame.pop_n(argc),
            None => vec![Value::Nil; argc],
        }
    }

    pub(in crate::vm) fn frame_mut(&mut self) -> Option<&mut Frame> {
        self.frames.top_mut()
    }

    /// Push a frame, enforcing the call-depth limit
    pub(in crate::vm) fn push_frame(&mut self, frame: Frame) -> OpcodeResult {
        let limit = self.options.max_call_depth;
        if self.frames.len() >= limit {
            return OpcodeResult::Error(VmError::StackOverflow(limit));
        }
        self.frames.push(frame);
        OpcodeResult::Continue
    }

    // ===== Execution =====

    /// Replace the call stack with a root frame for `code`
    pub fn start(&mut self, code: Rc<CodeObject>) {
        debug!(name = %code.name, instructions = code.len(), "starting root frame");
        self.frames.clear();
        self.frames.push(Frame::new(code));
    }

    /// Run until the call stack empties or execution stops
    pub fn run(&mut self) -> ExecutionResult {
        if self.frames.is_empty() {
            return ExecutionResult::Failed(VmError::EmptyCallStack);
        }

        loop {
            let fetched = match self.frames.top_mut() {
                Some(frame) => frame.fetch(),
                None => return ExecutionResult::Completed(Value::Nil),
            };

            let result = match fetched {
                Some(instr) => {
                    if let Some(limit) = self.options.max_instructions {
                        if self.instruction_count >= limit {
                            self.frames.clear();
                            return ExecutionResult::Failed(VmError::InstructionLimit(limit));
                        }
                    }
                    self.instruction_count += 1;
                    self.execute_instruction(instr)
                }
                // Running off the end is an implicit `RET nil`
                None => OpcodeResult::Return(Value::Nil),
            };

            match result {
                OpcodeResult::Continue | OpcodeResult::FrameDetached => {}
                OpcodeResult::Return(value) => {
                    if let Some(done) = self.return_from_frame(value) {
                        return done;
                    }
                }
                OpcodeResult::Throw(exception) => {
                    if let Err(exception) = self.unwind(exception) {
                        debug!(exception = %exception.repr(), "uncaught exception");
                        return ExecutionResult::Uncaught(exception);
                    }
                }
                OpcodeResult::Halt => {
                    self.frames.clear();
                    return ExecutionResult::Completed(Value::Nil);
                }
                OpcodeResult::Exit(code) => {
                    self.frames.clear();
                    return ExecutionResult::Exited(code);
                }
                OpcodeResult::Error(error) => {
                    self.frames.clear();
                    return ExecutionResult::Failed(error);
                }
            }
        }
    }

    /// Decode and dispatch one instruction
    fn execute_instruction(&mut self, instr: Instruction) -> OpcodeResult {
        let Some(opcode) = Opcode::from_u8(instr.op) else {
            warn!(opcode = instr.op, "unknown opcode, skipping");
            return OpcodeResult::Continue;
        };
        trace!(
            op = opcode.name(),
            arg = %instr.arg.repr(),
            depth = self.frames.len(),
            "dispatch"
        );
        let arg = instr.arg;

        match opcode {
            // =========================================================
            // Stack
            // =========================================================
            Opcode::PushConst | Opcode::Pop | Opcode::Dup => self.exec_stack_ops(opcode, arg),

            // =========================================================
            // Arithmetic & Bit Operations
            // =========================================================
            Opcode::Add
            | Opcode::Sub
            | Opcode::Mul
            | Opcode::Div
            | Opcode::Mod
            | Opcode::Neg
            | Opcode::BitAnd
            | Opcode::BitOr
            | Opcode::BitXor
            | Opcode::BitNot
            | Opcode::Lshift
            | Opcode::Rshift => self.exec_arithmetic_ops(opcode),

            // =========================================================
            // Comparison & Logic
            // =========================================================
            Opcode::Eq
            | Opcode::Neq
            | Opcode::Gt
            | Opcode::Lt
            | Opcode::Gte
            | Opcode::Lte
            | Opcode::Not
            | Opcode::And
            | Opcode::Or => self.exec_comparison_ops(opcode),

            // =========================================================
            // Registers
            // =========================================================
            Opcode::LoadReg
            | Opcode::MoveReg
            | Opcode::AddReg
            | Opcode::PushFromReg
            | Opcode::PopToReg => self.exec_register_ops(opcode, arg),

            // =========================================================
            // Variables
            // =========================================================
            Opcode::LoadVar | Opcode::StoreVar | Opcode::LoadLocal | Opcode::StoreLocal => {
                self.exec_variable_ops(opcode, arg)
            }

            // =========================================================
            // Lists, Mappings & Sequences
            // =========================================================
            Opcode::BuildList
            | Opcode::BuildDict
            | Opcode::LoadIndex
            | Opcode::StoreIndex
            | Opcode::UnpackSequence
            | Opcode::CheckLen
            | Opcode::CheckLenMin
            | Opcode::Snapshot
            | Opcode::Restore
            | Opcode::DiscardSnapshot
            | Opcode::Slice
            | Opcode::Len => self.exec_array_ops(opcode, arg),

            // =========================================================
            // Classes & Attributes
            // =========================================================
            Opcode::BuildClass
            | Opcode::LoadAttr
            | Opcode::StoreAttr
            | Opcode::IsInstance
            | Opcode::LoadSuperMethod => self.exec_object_ops(opcode, arg),

            // =========================================================
            // Control Flow
            // =========================================================
            Opcode::Jmp | Opcode::JmpIfFalse | Opcode::JmpIfTrue => {
                self.exec_control_flow_ops(opcode, arg)
            }
            Opcode::Call => self.exec_call(arg),
            Opcode::Ret => OpcodeResult::Return(self.pop()),
            Opcode::Halt => OpcodeResult::Halt,

            // =========================================================
            // Exceptions
            // =========================================================
            Opcode::PushTry | Opcode::PopTry | Opcode::Throw => {
                self.exec_exception_ops(opcode, arg)
            }

            // =========================================================
            // Modules
            // =========================================================
            Opcode::Import => self.exec_import(arg),

            // =========================================================
            // Closures
            // =========================================================
            Opcode::MakeClosure
            | Opcode::BuildFunction
            | Opcode::MakeFunction
            | Opcode::LoadDeref
            | Opcode::StoreDeref
            | Opcode::LoadClosure => self.exec_closure_ops(opcode, arg),

            // =========================================================
            // Strings & Output
            // =========================================================
            Opcode::Print
            | Opcode::Str
            | Opcode::StrLower
            | Opcode::StrUpper
            | Opcode::StrFind
            | Opcode::StrReplace => self.exec_string_ops(opcode, arg),

            // =========================================================
            // File I/O
            // =========================================================
            Opcode::IoOpen | Opcode::IoRead | Opcode::IoWrite | Opcode::IoClose => {
                self.exec_io_ops(opcode)
            }
        }
    }

    /// Pop the active frame and deliver its result to the caller
    ///
    /// Returns the final outcome once the call stack is empty.
    pub(in crate::vm::interpreter) fn return_from_frame(
        &mut self,
        value: Value,
    ) -> Option<ExecutionResult> {
        let Some(Frame { kind, locals, .. }) = self.frames.pop() else {
            return Some(ExecutionResult::Completed(value));
        };

        let result = match kind {
            FrameKind::Normal => value,
            FrameKind::Constructor(instance) => instance,
            FrameKind::Module(name) => {
                let mut names: Vec<String> = locals.keys().cloned().collect();
                names.sort();
                let mut exports = Mapping::default();
                for name in names {
                    if let Some(v) = locals.get(&name) {
                        exports.insert(name, v.clone());
                    }
                }
                let exports = Value::mapping(exports);
                debug!(module = %name, "module initialized");
                self.modules.register(name, exports.clone());
                exports
            }
        };

        match self.frames.top_mut() {
            Some(caller) => {
                caller.push(result);
                None
            }
            None => Some(ExecutionResult::Completed(result)),
        }
    }

    /// Unwind to the nearest installed handler
    ///
    /// Frames without a handler are discarded. Returns the exception back
    /// if no frame handles it.
    pub(in crate::vm::interpreter) fn unwind(&mut self, exception: Value) -> Result<(), Value> {
        loop {
            let Some(frame) = self.frames.top_mut() else {
                return Err(exception);
            };
            if let Some(handler) = frame.handlers.pop() {
                frame.stack.truncate(handler.stack_depth);
                frame.push(exception);
                frame.ip = handler.handler_ip;
                return Ok(());
            }
            if let Some(discarded) = self.frames.pop() {
                debug!(frame = %discarded.code.name, "unwinding frame");
                if let FrameKind::Module(name) = &discarded.kind {
                    self.modules.abort_loading(name);
                }
            }
        }
    }
}

/// Non-negative integer operand (counts, indices, jump targets)
pub(in crate::vm::interpreter) fn operand_index(arg: &Value) -> Option<usize> {
    match arg {
        Value::Integer(i) if *i >= 0 => Some(*i as usize),
        _ => None,
    }
}
