//! Execution result types for the interpreter
//!
//! `ExecutionResult` is what a whole run produces. `OpcodeResult` is the
//! per-instruction control signal the dispatch loop acts on, and
//! `NativeCallResult` is what a host callback hands back to CALL.

use crate::vm::value::Value;
use crate::vm::VmError;

/// Outcome of running the interpreter to completion
#[derive(Debug)]
pub enum ExecutionResult {
    /// The call stack emptied or HALT executed
    Completed(Value),

    /// A native requested process exit with this status
    Exited(i32),

    /// A thrown value reached the bottom of the call stack
    Uncaught(Value),

    /// A fatal VM error stopped execution
    Failed(VmError),
}

impl ExecutionResult {
    pub fn is_completed(&self) -> bool {
        matches!(self, ExecutionResult::Completed(_))
    }

    /// Process exit status for this outcome
    pub fn exit_code(&self) -> i32 {
        match self {
            ExecutionResult::Completed(_) => 0,
            ExecutionResult::Exited(code) => *code,
            ExecutionResult::Uncaught(_) | ExecutionResult::Failed(_) => 1,
        }
    }

    /// Completed value, if any
    pub fn value(&self) -> Option<&Value> {
        match self {
            ExecutionResult::Completed(v) => Some(v),
            _ => None,
        }
    }
}

/// Result of executing a single opcode
#[derive(Debug)]
pub enum OpcodeResult {
    /// Continue to next instruction
    Continue,

    /// Return from current frame with a value
    Return(Value),

    /// Unwind to the nearest exception handler
    Throw(Value),

    /// The active frame was detached by a generator yield; the loop
    /// resumes on the new top frame without handler search
    FrameDetached,

    /// Stop the whole run
    Halt,

    /// A native requested process exit
    Exit(i32),

    /// A fatal error occurred
    Error(VmError),
}

/// What a native callback hands back to the CALL that invoked it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeCallResult {
    /// The native pushed its result onto the active frame
    Done,

    /// The native detached the active frame (generator yield)
    Detached,

    /// The native requested process exit
    Exit(i32),
}
