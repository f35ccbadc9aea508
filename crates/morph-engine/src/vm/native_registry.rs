//! Native function registry
//!
//! Name-to-callback table installed into the interpreter's globals at
//! construction time.

use crate::vm::object::{NativeFn, NativeFunction};
use crate::vm::value::Value;
use rustc_hash::FxHashMap;
use std::fmt;
use std::rc::Rc;

#[derive(Default, Clone)]
pub struct NativeFunctionRegistry {
    functions: FxHashMap<String, NativeFn>,
}

impl fmt::Debug for NativeFunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunctionRegistry")
            .field("count", &self.functions.len())
            .finish()
    }
}

impl NativeFunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback, replacing any previous one with the same name
    pub fn register(&mut self, name: impl Into<String>, func: NativeFn) {
        self.functions.insert(name.into(), func);
    }

    pub fn get(&self, name: &str) -> Option<NativeFn> {
        self.functions.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Materialize every entry as a callable value
    pub fn values(&self) -> impl Iterator<Item = (String, Value)> + '_ {
        self.functions.iter().map(|(name, func)| {
            (
                name.clone(),
                Value::Native(Rc::new(NativeFunction::new(name.clone(), *func))),
            )
        })
    }
}
