//! Default constants for VM configuration.

/// Number of general-purpose registers.
pub const REGISTER_COUNT: usize = 32;

/// Default maximum call-stack depth before the run fails.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 10_000;

/// Reserved method name invoked when a class is called.
pub const CONSTRUCTOR_NAME: &str = "inisiasi";

/// File extension of compiled modules.
pub const MODULE_EXTENSION: &str = "mvm";

/// Global holding the program argument list.
pub const ARGS_GLOBAL: &str = "argumen_sistem";

/// Most Nil fillers a count operand may add beyond the values on the stack.
pub const MAX_NIL_PADDING: usize = 1 << 16;
