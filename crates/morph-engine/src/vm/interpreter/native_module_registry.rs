//! Native module registry
//!
//! Maps a module name to a table of host callbacks. IMPORT consults this
//! registry before loaded modules and the filesystem.

use crate::vm::object::{NativeFn, NativeFunction};
use crate::vm::value::{Mapping, Value};
use rustc_hash::FxHashMap;
use std::fmt;
use std::rc::Rc;

/// A named table of host callbacks
#[derive(Clone)]
pub struct NativeModule {
    name: String,
    functions: Vec<(String, NativeFn)>,
}

impl NativeModule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            functions: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a member, builder-style
    pub fn function(mut self, name: impl Into<String>, func: NativeFn) -> Self {
        self.functions.push((name.into(), func));
        self
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Build the mapping value IMPORT pushes
    pub fn to_value(&self) -> Value {
        let mut map = Mapping::default();
        for (member, func) in &self.functions {
            let qualified = format!("{}.{}", self.name, member);
            map.insert(
                member.clone(),
                Value::Native(Rc::new(NativeFunction::new(qualified, *func))),
            );
        }
        Value::mapping(map)
    }
}

impl fmt::Debug for NativeModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let members: Vec<&str> = self.functions.iter().map(|(n, _)| n.as_str()).collect();
        f.debug_struct("NativeModule")
            .field("name", &self.name)
            .field("functions", &members)
            .finish()
    }
}

/// Registry for native modules
#[derive(Debug, Default)]
pub struct NativeModuleRegistry {
    by_name: FxHashMap<String, NativeModule>,
}

impl NativeModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a native module
    ///
    /// Returns an error if a module with the same name is already registered.
    pub fn register(&mut self, module: NativeModule) -> Result<(), String> {
        if self.by_name.contains_key(module.name()) {
            return Err(format!(
                "Native module '{}' is already registered",
                module.name()
            ));
        }
        self.by_name.insert(module.name().to_string(), module);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&NativeModule> {
        self.by_name.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vm::interpreter::{Interpreter, NativeCallResult};

    fn noop(interp: &mut Interpreter, argc: usize) -> NativeCallResult {
        interp.pop_args(argc);
        interp.push(Value::Nil);
        NativeCallResult::Done
    }

    #[test]
    fn test_duplicate_registration() {
        let mut registry = NativeModuleRegistry::new();
        assert!(registry.register(NativeModule::new("_x").function("a", noop)).is_ok());
        assert!(registry.register(NativeModule::new("_x")).is_err());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_module_value_members() {
        let module = NativeModule::new("_x").function("a", noop).function("b", noop);
        let Value::Mapping(map) = module.to_value() else {
            panic!("expected mapping");
        };
        let map = map.borrow();
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        match map.get("a") {
            Some(Value::Native(native)) => assert_eq!(native.name, "_x.a"),
            other => panic!("unexpected member {:?}", other),
        }
    }
}
