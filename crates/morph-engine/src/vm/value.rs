//! Runtime value representation
//!
//! Primitives are stored inline. Lists, mappings, instances and cells are
//! reference-counted so mutation through one alias is visible through all
//! of them. Reference cycles are never collected.

use crate::bytecode::CodeObject;
use crate::vm::object::{
    BoundMethod, Cell, Class, FileHandle, Function, Generator, Instance, NativeFunction,
};
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// String-keyed, insertion-ordered mapping
pub type Mapping = IndexMap<String, Value, FxBuildHasher>;

/// Nesting depth after which display output is elided
const DISPLAY_DEPTH_LIMIT: usize = 32;

/// A Morph runtime value
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Nil,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(Rc<str>),
    List(Rc<RefCell<Vec<Value>>>),
    Mapping(Rc<RefCell<Mapping>>),
    Code(Rc<CodeObject>),
    Function(Rc<Function>),
    Native(Rc<NativeFunction>),
    Class(Rc<Class>),
    Instance(Rc<Instance>),
    BoundMethod(Rc<BoundMethod>),
    Cell(Rc<Cell>),
    Generator(Rc<Generator>),
    File(Rc<FileHandle>),
}

impl Value {
    pub fn string(s: impl Into<Rc<str>>) -> Self {
        Value::String(s.into())
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Rc::new(RefCell::new(items)))
    }

    pub fn mapping(map: Mapping) -> Self {
        Value::Mapping(Rc::new(RefCell::new(map)))
    }

    #[inline]
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Truthiness used by conditional jumps and logical operators
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Boolean(b) => *b,
            Value::Integer(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::List(items) => !items.borrow().is_empty(),
            Value::Mapping(map) => !map.borrow().is_empty(),
            _ => true,
        }
    }

    /// Descriptive kind name for diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Mapping(_) => "mapping",
            Value::Code(_) => "code object",
            Value::Function(_) => "function",
            Value::Native(_) => "native function",
            Value::Class(_) => "class",
            Value::Instance(_) => "instance",
            Value::BoundMethod(_) => "bound method",
            Value::Cell(_) => "cell",
            Value::Generator(_) => "generator",
            Value::File(_) => "file",
        }
    }

    /// Type name as reported to interpreted code
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) | Value::Float(_) => "angka",
            Value::String(_) => "teks",
            Value::List(_) => "daftar",
            Value::Mapping(_) => "kamus",
            Value::Code(_) => "kode",
            Value::Function(_) | Value::Native(_) | Value::BoundMethod(_) => "fungsi",
            Value::Class(_) => "kelas",
            Value::Instance(_) => "objek",
            Value::Cell(_) => "sel",
            Value::Generator(_) => "generator",
            Value::File(_) => "berkas",
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Integer or float widened to f64
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Length of a string (in chars), list, or mapping
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::String(s) => Some(s.chars().count()),
            Value::List(items) => Some(items.borrow().len()),
            Value::Mapping(map) => Some(map.borrow().len()),
            _ => None,
        }
    }

    /// Equality as seen by the EQ opcode
    ///
    /// Primitives compare by value with integers and floats compared
    /// numerically. Reference kinds compare by identity.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Integer(a), Value::Float(b)) | (Value::Float(b), Value::Integer(a)) => {
                (*a as f64) == *b
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
            (Value::Mapping(a), Value::Mapping(b)) => Rc::ptr_eq(a, b),
            (Value::Code(a), Value::Code(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Native(a), Value::Native(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            (Value::BoundMethod(a), Value::BoundMethod(b)) => Rc::ptr_eq(a, b),
            (Value::Cell(a), Value::Cell(b)) => Rc::ptr_eq(a, b),
            (Value::Generator(a), Value::Generator(b)) => Rc::ptr_eq(a, b),
            (Value::File(a), Value::File(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Ordering over numeric pairs and string pairs; false otherwise
    pub fn less_than(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a < b,
            (Value::String(a), Value::String(b)) => a < b,
            _ => match (self.as_number(), other.as_number()) {
                (Some(a), Some(b)) => a < b,
                _ => false,
            },
        }
    }

    /// Display form used inside containers: strings are quoted
    pub fn repr(&self) -> String {
        let mut out = String::new();
        let _ = write_value(&mut out, self, true, 0);
        out
    }
}

fn write_float(f: &mut impl fmt::Write, x: f64) -> fmt::Result {
    if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e16 {
        write!(f, "{:.1}", x)
    } else {
        write!(f, "{}", x)
    }
}

fn write_value(f: &mut impl fmt::Write, value: &Value, quoted: bool, depth: usize) -> fmt::Result {
    if depth > DISPLAY_DEPTH_LIMIT {
        return f.write_str("...");
    }
    match value {
        Value::Nil => f.write_str("nil"),
        Value::Boolean(true) => f.write_str("benar"),
        Value::Boolean(false) => f.write_str("salah"),
        Value::Integer(i) => write!(f, "{}", i),
        Value::Float(x) => write_float(f, *x),
        Value::String(s) if quoted => write!(f, "{:?}", s),
        Value::String(s) => f.write_str(s),
        Value::List(items) => {
            f.write_char('[')?;
            for (i, item) in items.borrow().iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write_value(f, item, true, depth + 1)?;
            }
            f.write_char(']')
        }
        Value::Mapping(map) => {
            f.write_char('{')?;
            for (i, (key, item)) in map.borrow().iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{:?}: ", key)?;
                write_value(f, item, true, depth + 1)?;
            }
            f.write_char('}')
        }
        Value::Code(code) => write!(f, "<kode {}>", code.name),
        Value::Function(func) => write!(f, "<fungsi {}>", func.code.name),
        Value::Native(native) => write!(f, "<fungsi bawaan {}>", native.name),
        Value::Class(class) => write!(f, "<kelas {}>", class.name),
        Value::Instance(instance) => write!(f, "<objek {}>", instance.class.name),
        Value::BoundMethod(bound) => {
            f.write_str("<metode ")?;
            write_value(f, &bound.method, false, depth + 1)?;
            f.write_char('>')
        }
        Value::Cell(_) => f.write_str("<sel>"),
        Value::Generator(_) => f.write_str("<generator>"),
        Value::File(file) => write!(f, "<berkas {}>", file.path),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(f, self, false, 0)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("Nil"),
            Value::Boolean(b) => write!(f, "Boolean({})", b),
            Value::Integer(i) => write!(f, "Integer({})", i),
            Value::Float(x) => write!(f, "Float({:?})", x),
            Value::String(s) => write!(f, "String({:?})", s),
            other => write!(f, "{}({})", other.kind_name(), other.repr()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.loose_eq(other)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<usize> for Value {
    fn from(i: usize) -> Self {
        Value::Integer(i as i64)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::list(items)
    }
}
