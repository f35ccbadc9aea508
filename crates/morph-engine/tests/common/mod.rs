//! Shared helpers for integration tests

#![allow(dead_code)]

use morph_engine::vm::Value;
use morph_engine::{CodeBuilder, CodeObject, ExecutionResult, Opcode, Vm, VmOptions};
use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

/// Output sink whose contents stay readable after the VM takes ownership
#[derive(Clone, Default)]
pub struct Capture(Rc<RefCell<Vec<u8>>>);

impl Capture {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// VM with its output redirected into a capture buffer
pub fn vm_with_options(options: VmOptions) -> (Vm, Capture) {
    let capture = Capture::default();
    let mut vm = Vm::with_options(options);
    vm.set_output(Box::new(capture.clone()));
    (vm, capture)
}

pub fn vm() -> (Vm, Capture) {
    vm_with_options(VmOptions::default())
}

/// Run a root code object, returning the outcome and printed text
pub fn run(code: CodeObject) -> (ExecutionResult, String) {
    let (mut vm, out) = vm();
    let result = vm.execute_code(code);
    (result, out.text())
}

/// Run and unwrap the completed value
pub fn eval(code: CodeObject) -> Value {
    match run(code).0 {
        ExecutionResult::Completed(value) => value,
        other => panic!("expected completion, got {:?}", other),
    }
}

/// Emit `LOAD_VAR name` followed by `CALL argc` after pushing `args`
pub fn call_global(b: &mut CodeBuilder, name: &str, args: Vec<Value>) {
    b.emit(Opcode::LoadVar, name);
    let argc = args.len();
    for arg in args {
        b.emit(Opcode::PushConst, arg);
    }
    b.emit(Opcode::Call, argc);
}

/// Push a code constant and wrap it with MAKE_CLOSURE
pub fn make_closure(b: &mut CodeBuilder, code: CodeObject) {
    b.emit(Opcode::PushConst, Value::Code(Rc::new(code)));
    b.op(Opcode::MakeClosure);
}

pub fn list(items: Vec<Value>) -> Value {
    Value::list(items)
}
