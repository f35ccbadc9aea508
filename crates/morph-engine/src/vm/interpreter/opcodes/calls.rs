//! CALL dispatch
//!
//! The callee is classified into a closed [`Callee`] set, and each kind
//! resolves to a [`CallAction`] describing what happens next.

use crate::vm::defaults::CONSTRUCTOR_NAME;
use crate::vm::interpreter::core::operand_index;
use crate::vm::interpreter::execution::{NativeCallResult, OpcodeResult};
use crate::vm::interpreter::Interpreter;
use crate::vm::object::{BoundMethod, Cell, Class, Function, Instance, NativeFunction};
use crate::vm::stack::{Frame, FrameKind};
use crate::vm::value::Value;
use std::rc::Rc;
use tracing::{debug, trace};

/// Every kind of value CALL distinguishes
pub(in crate::vm::interpreter) enum Callee {
    Function(Rc<Function>),
    Native(Rc<NativeFunction>),
    Class(Rc<Class>),
    BoundMethod(Rc<BoundMethod>),
    Other(Value),
}

impl From<Value> for Callee {
    fn from(value: Value) -> Self {
        match value {
            Value::Function(f) => Callee::Function(f),
            Value::Native(n) => Callee::Native(n),
            Value::Class(c) => Callee::Class(c),
            Value::BoundMethod(b) => Callee::BoundMethod(b),
            other => Callee::Other(other),
        }
    }
}

/// What a call does to the machine
pub(in crate::vm::interpreter) enum CallAction {
    /// Enter an interpreted body
    PushFrame(Frame),
    /// Run a host callback on the current frame
    RunNative {
        native: Rc<NativeFunction>,
        args: Vec<Value>,
        /// Replaces the native's result (native constructors yield the instance)
        replace_result: Option<Value>,
    },
    /// Push a value without running anything
    PushValue(Value),
}

/// Build the frame for calling `func`
///
/// Missing arguments bind to Nil and extra ones are ignored. Each cell
/// variable gets a fresh cell seeded from the same-named parameter, and each
/// free variable is bound to the closure cell at the same position.
pub(in crate::vm::interpreter) fn function_frame(
    func: &Function,
    args: Vec<Value>,
    kind: FrameKind,
) -> Frame {
    let code = func.code.clone();
    let mut frame = Frame::with_kind(code.clone(), kind);

    let mut args = args.into_iter();
    for name in &code.arg_names {
        frame
            .locals
            .insert(name.clone(), args.next().unwrap_or_default());
    }

    for name in &code.cell_vars {
        let initial = frame.locals.get(name).cloned().unwrap_or_default();
        frame.cells.insert(name.clone(), Rc::new(Cell::new(initial)));
    }

    for (name, cell) in code.free_vars.iter().zip(&func.closure) {
        frame.cells.insert(name.clone(), cell.clone());
    }

    frame
}

/// Decide what calling `callee` with `args` does
pub(in crate::vm::interpreter) fn resolve_call(callee: Callee, args: Vec<Value>) -> CallAction {
    match callee {
        Callee::Function(func) => {
            CallAction::PushFrame(function_frame(&func, args, FrameKind::Normal))
        }

        Callee::Native(native) => CallAction::RunNative {
            native,
            args,
            replace_result: None,
        },

        Callee::Class(class) => {
            let instance = Value::Instance(Rc::new(Instance::new(class.clone())));
            let mut full = Vec::with_capacity(args.len() + 1);
            full.push(instance.clone());
            full.extend(args);

            match class.find_method(CONSTRUCTOR_NAME) {
                Some(Value::Function(init)) => CallAction::PushFrame(function_frame(
                    &init,
                    full,
                    FrameKind::Constructor(instance),
                )),
                Some(Value::Native(native)) => CallAction::RunNative {
                    native,
                    args: full,
                    replace_result: Some(instance),
                },
                _ => CallAction::PushValue(instance),
            }
        }

        Callee::BoundMethod(bound) => {
            let mut full = Vec::with_capacity(args.len() + 1);
            full.push(bound.receiver.clone());
            full.extend(args);
            resolve_call(Callee::from(bound.method.clone()), full)
        }

        Callee::Other(value) => {
            debug!(kind = value.kind_name(), "call on non-callable value");
            CallAction::PushValue(Value::Nil)
        }
    }
}

impl Interpreter {
    /// CALL n: pop n arguments, then the callee
    pub(in crate::vm::interpreter) fn exec_call(&mut self, arg: Value) -> OpcodeResult {
        let argc = operand_index(&arg).unwrap_or(0);
        let args = self.pop_args(argc);
        let callee = self.pop();
        self.perform_call(resolve_call(Callee::from(callee), args))
    }

    pub(in crate::vm::interpreter) fn perform_call(&mut self, action: CallAction) -> OpcodeResult {
        match action {
            CallAction::PushFrame(frame) => {
                trace!(function = %frame.code.name, "enter");
                self.push_frame(frame)
            }
            CallAction::RunNative {
                native,
                args,
                replace_result,
            } => self.invoke_native(&native, args, replace_result),
            CallAction::PushValue(value) => {
                self.push(value);
                OpcodeResult::Continue
            }
        }
    }

    /// Run a host callback with its arguments pushed back on the current frame
    fn invoke_native(
        &mut self,
        native: &NativeFunction,
        args: Vec<Value>,
        replace_result: Option<Value>,
    ) -> OpcodeResult {
        let argc = args.len();
        if let Some(frame) = self.frame_mut() {
            frame.stack.extend(args);
        }
        trace!(native = %native.name, argc, "native call");

        match (native.func)(self, argc) {
            NativeCallResult::Done => {
                if let Some(instance) = replace_result {
                    self.pop();
                    self.push(instance);
                }
                OpcodeResult::Continue
            }
            NativeCallResult::Detached => OpcodeResult::FrameDetached,
            NativeCallResult::Exit(code) => OpcodeResult::Exit(code),
        }
    }
}
