//! Interpreter configuration

use crate::vm::defaults::DEFAULT_MAX_CALL_DEPTH;
use std::path::PathBuf;

/// Options for constructing an interpreter
#[derive(Debug, Clone)]
pub struct VmOptions {
    /// Fail the run after this many instructions (unlimited when `None`)
    pub max_instructions: Option<u64>,
    /// Maximum number of live frames
    pub max_call_depth: usize,
    /// Directory searched for `<name>.mvm` on import
    pub module_dir: PathBuf,
    /// Program arguments exposed as `argumen_sistem`
    pub args: Vec<String>,
}

impl Default for VmOptions {
    fn default() -> Self {
        Self {
            max_instructions: None,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            module_dir: PathBuf::from("."),
            args: Vec::new(),
        }
    }
}

impl VmOptions {
    pub fn with_module_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.module_dir = dir.into();
        self
    }

    pub fn with_max_instructions(mut self, limit: u64) -> Self {
        self.max_instructions = Some(limit);
        self
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }
}
