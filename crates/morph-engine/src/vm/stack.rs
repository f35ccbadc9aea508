//! Activation records and the call stack

use crate::bytecode::{CodeObject, Instruction};
use crate::vm::defaults::MAX_NIL_PADDING;
use crate::vm::object::Cell;
use crate::vm::value::Value;
use rustc_hash::FxHashMap;
use std::rc::Rc;
use tracing::warn;

/// An installed try region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExceptionHandler {
    /// Instruction index of the catch block
    pub handler_ip: usize,
    /// Operand stack depth when the handler was installed
    pub stack_depth: usize,
}

/// What a frame's return delivers to its caller
#[derive(Debug, Clone)]
pub enum FrameKind {
    /// The returned value
    Normal,
    /// The instance under construction, whatever the body returns
    Constructor(Value),
    /// The module's locals, published under this name
    Module(String),
}

/// One call's activation record
#[derive(Debug)]
pub struct Frame {
    pub code: Rc<CodeObject>,
    pub ip: usize,
    pub stack: Vec<Value>,
    pub locals: FxHashMap<String, Value>,
    pub cells: FxHashMap<String, Rc<Cell>>,
    pub handlers: Vec<ExceptionHandler>,
    /// Stack depths recorded by SNAPSHOT
    pub snapshots: Vec<usize>,
    pub kind: FrameKind,
}

impl Frame {
    pub fn new(code: Rc<CodeObject>) -> Self {
        Self::with_kind(code, FrameKind::Normal)
    }

    pub fn with_kind(code: Rc<CodeObject>, kind: FrameKind) -> Self {
        Self {
            code,
            ip: 0,
            stack: Vec::new(),
            locals: FxHashMap::default(),
            cells: FxHashMap::default(),
            handlers: Vec::new(),
            snapshots: Vec::new(),
            kind,
        }
    }

    /// Fetch the instruction at `ip` and advance past it
    ///
    /// Returns `None` once `ip` runs off the end of the code.
    pub fn fetch(&mut self) -> Option<Instruction> {
        let instr = self.code.instructions.get(self.ip)?.clone();
        self.ip += 1;
        Some(instr)
    }

    #[inline]
    pub fn push(&mut self, value: Value) {
        self.stack.push(value);
    }

    /// Pop the top value; an empty stack yields Nil
    #[inline]
    pub fn pop(&mut self) -> Value {
        self.stack.pop().unwrap_or_default()
    }

    /// Peek the top value; an empty stack yields Nil
    pub fn peek(&self) -> Value {
        self.stack.last().cloned().unwrap_or_default()
    }

    /// Pop `n` values, returned in push order
    ///
    /// Missing values at the bottom are filled with Nil, at most
    /// `MAX_NIL_PADDING` of them.
    pub fn pop_n(&mut self, n: usize) -> Vec<Value> {
        let available = n.min(self.stack.len());
        let missing = n - available;
        if missing > MAX_NIL_PADDING {
            warn!(requested = n, available, "count operand exceeds stack, truncating nil fill");
        }
        let padding = missing.min(MAX_NIL_PADDING);
        let mut values = vec![Value::Nil; padding];
        values.extend(self.stack.drain(self.stack.len() - available..));
        values
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Get the cell bound to `name`, creating an empty one if absent
    pub fn cell(&mut self, name: &str) -> Rc<Cell> {
        self.cells
            .entry(name.to_string())
            .or_insert_with(|| Rc::new(Cell::default()))
            .clone()
    }

    pub fn is_module(&self) -> bool {
        matches!(self.kind, FrameKind::Module(_))
    }
}

/// Growable sequence of frames; the last one is active
#[derive(Debug, Default)]
pub struct CallStack {
    frames: Vec<Frame>,
}

impl CallStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    pub fn top(&self) -> Option<&Frame> {
        self.frames.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut Frame> {
        self.frames.last_mut()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Frames from the bottom of the stack up
    pub fn iter(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter()
    }
}
