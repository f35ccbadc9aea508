//! Heap object types referenced from [`Value`]

use crate::bytecode::CodeObject;
use crate::vm::interpreter::{Interpreter, NativeCallResult};
use crate::vm::stack::Frame;
use crate::vm::value::Value;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::fmt;
use std::fs::File;
use std::rc::Rc;

/// Host callback signature
///
/// The callback receives the number of arguments the caller pushed onto the
/// active frame. It must pop exactly that many and push one result.
pub type NativeFn = fn(&mut Interpreter, usize) -> NativeCallResult;

/// A code object paired with its captured cells
#[derive(Debug)]
pub struct Function {
    pub code: Rc<CodeObject>,
    /// Matched positionally against `code.free_vars`
    pub closure: Vec<Rc<Cell>>,
}

impl Function {
    pub fn new(code: Rc<CodeObject>, closure: Vec<Rc<Cell>>) -> Self {
        Self { code, closure }
    }

    pub fn name(&self) -> &str {
        &self.code.name
    }
}

/// A host function exposed as a value
pub struct NativeFunction {
    pub name: String,
    pub func: NativeFn,
}

impl NativeFunction {
    pub fn new(name: impl Into<String>, func: NativeFn) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .finish()
    }
}

/// A class: name, optional superclass and a method table
#[derive(Debug)]
pub struct Class {
    pub name: String,
    pub superclass: Option<Rc<Class>>,
    pub methods: RefCell<FxHashMap<String, Value>>,
}

impl Class {
    pub fn new(
        name: impl Into<String>,
        superclass: Option<Rc<Class>>,
        methods: FxHashMap<String, Value>,
    ) -> Self {
        Self {
            name: name.into(),
            superclass,
            methods: RefCell::new(methods),
        }
    }

    /// Look up a method on this class or its ancestors
    pub fn find_method(&self, name: &str) -> Option<Value> {
        if let Some(method) = self.methods.borrow().get(name) {
            return Some(method.clone());
        }
        self.superclass.as_ref().and_then(|sup| sup.find_method(name))
    }

    /// Check whether this class or an ancestor is named `name`
    pub fn is_named(&self, name: &str) -> bool {
        self.name == name
            || self
                .superclass
                .as_ref()
                .is_some_and(|sup| sup.is_named(name))
    }
}

/// An object created by calling a class
#[derive(Debug)]
pub struct Instance {
    pub class: Rc<Class>,
    pub properties: RefCell<FxHashMap<String, Value>>,
}

impl Instance {
    pub fn new(class: Rc<Class>) -> Self {
        Self {
            class,
            properties: RefCell::new(FxHashMap::default()),
        }
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.properties.borrow().get(name).cloned()
    }

    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.properties.borrow_mut().insert(name.into(), value);
    }
}

/// A method paired with the receiver it was loaded from
#[derive(Debug)]
pub struct BoundMethod {
    pub receiver: Value,
    pub method: Value,
}

impl BoundMethod {
    pub fn new(receiver: Value, method: Value) -> Self {
        Self { receiver, method }
    }
}

/// A shared mutable slot used for closure capture
#[derive(Debug, Default)]
pub struct Cell {
    value: RefCell<Value>,
}

impl Cell {
    pub fn new(value: Value) -> Self {
        Self {
            value: RefCell::new(value),
        }
    }

    pub fn get(&self) -> Value {
        self.value.borrow().clone()
    }

    pub fn set(&self, value: Value) {
        *self.value.borrow_mut() = value;
    }
}

/// A suspended frame detached by a yield
///
/// The frame can be taken back exactly once.
#[derive(Debug)]
pub struct Generator {
    frame: RefCell<Option<Frame>>,
}

impl Generator {
    pub fn new(frame: Frame) -> Self {
        Self {
            frame: RefCell::new(Some(frame)),
        }
    }

    /// Take the suspended frame, leaving the handle consumed
    pub fn take(&self) -> Option<Frame> {
        self.frame.borrow_mut().take()
    }

    pub fn is_consumed(&self) -> bool {
        self.frame.borrow().is_none()
    }
}

/// An open host file
#[derive(Debug)]
pub struct FileHandle {
    pub path: String,
    pub mode: String,
    pub file: RefCell<Option<File>>,
}

impl FileHandle {
    pub fn new(path: impl Into<String>, mode: impl Into<String>, file: File) -> Self {
        Self {
            path: path.into(),
            mode: mode.into(),
            file: RefCell::new(Some(file)),
        }
    }

    /// Drop the underlying file; later reads and writes fail
    pub fn close(&self) {
        self.file.borrow_mut().take();
    }
}
