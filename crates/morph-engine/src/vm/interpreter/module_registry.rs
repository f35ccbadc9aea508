//! Module registry for tracking loaded modules
//!
//! Holds each module's published mapping by name, plus the set of modules
//! whose initialization frame is still running so circular imports can be
//! detected.

use crate::vm::value::Value;
use rustc_hash::{FxHashMap, FxHashSet};

#[derive(Debug, Default)]
pub struct ModuleRegistry {
    /// Published module mappings indexed by name
    loaded: FxHashMap<String, Value>,
    /// Modules whose init frame has not returned yet
    loading: FxHashSet<String>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a loaded module's mapping by name
    pub fn get(&self, name: &str) -> Option<Value> {
        self.loaded.get(name).cloned()
    }

    /// Publish a module's mapping; it is no longer loading
    pub fn register(&mut self, name: impl Into<String>, exports: Value) {
        let name = name.into();
        self.loading.remove(&name);
        self.loaded.insert(name, exports);
    }

    /// Mark a module as initializing
    pub fn begin_loading(&mut self, name: impl Into<String>) {
        self.loading.insert(name.into());
    }

    /// Forget an initialization that was unwound by an exception
    pub fn abort_loading(&mut self, name: &str) {
        self.loading.remove(name);
    }

    pub fn is_loading(&self, name: &str) -> bool {
        self.loading.contains(name)
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.loaded.contains_key(name)
    }

    /// Number of loaded modules
    pub fn len(&self) -> usize {
        self.loaded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty()
    }

    /// Names of all loaded modules, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.loaded.keys().cloned().collect();
        names.sort();
        names
    }
}
