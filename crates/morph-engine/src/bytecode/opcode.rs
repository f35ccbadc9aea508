//! Bytecode opcodes for the Morph VM
//!
//! Every instruction is a single opcode byte followed by one encoded operand
//! value. Opcodes that take no operand carry Nil.
//!
//! Opcode numbering follows the Morph compiler:
//! - 1-17: Stack, arithmetic, comparison & logic
//! - 18-22: Registers
//! - 23-26: Variables
//! - 27-36: Lists, mappings & pattern helpers
//! - 37-41: Classes & attributes
//! - 44-48: Control flow & calls
//! - 49-51: Exception handling
//! - 52-54: Modules, printing & halt
//! - 55-68: Closures, slicing & conversions
//! - 69-78: Bit and string operations
//! - 87-90: File I/O

/// Bytecode opcode enumeration
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // ===== Stack =====
    /// Push the operand value
    PushConst = 1,
    /// Discard top of stack
    Pop = 2,
    /// Duplicate top of stack
    Dup = 3,

    // ===== Arithmetic =====
    /// Numeric add or string concatenation
    Add = 4,
    /// Subtract
    Sub = 5,
    /// Multiply
    Mul = 6,
    /// Divide (always produces Float)
    Div = 7,
    /// Remainder
    Mod = 8,

    // ===== Comparison & Logic =====
    /// Loose equality
    Eq = 9,
    /// Loose inequality
    Neq = 10,
    /// Greater than
    Gt = 11,
    /// Less than
    Lt = 12,
    /// Greater or equal
    Gte = 13,
    /// Less or equal
    Lte = 14,
    /// Logical not
    Not = 15,
    /// Value-returning and
    And = 16,
    /// Value-returning or
    Or = 17,

    // ===== Registers =====
    /// Load the operand pair `[index, value]` into a register
    LoadReg = 18,
    /// Copy register `[dest, src]`
    MoveReg = 19,
    /// Add two registers `[dest, a, b]`
    AddReg = 20,
    /// Push a register value
    PushFromReg = 21,
    /// Pop into a register
    PopToReg = 22,

    // ===== Variables =====
    /// Load local, then global
    LoadVar = 23,
    /// Store local in module frames, global otherwise
    StoreVar = 24,
    /// Load from current frame locals
    LoadLocal = 25,
    /// Store into current frame locals
    StoreLocal = 26,

    // ===== Lists & Mappings =====
    /// Build a list from N stack values
    BuildList = 27,
    /// Build a mapping from N key/value pairs
    BuildDict = 28,
    /// Index a list, string, or mapping
    LoadIndex = 29,
    /// Store into a list or mapping
    StoreIndex = 30,
    /// Spread a list onto the stack
    UnpackSequence = 31,
    /// Check exact length of top of stack
    CheckLen = 32,
    /// Check minimum length of top of stack
    CheckLenMin = 33,
    /// Remember the current stack depth
    Snapshot = 34,
    /// Truncate the stack to the last snapshot
    Restore = 35,
    /// Forget the last snapshot
    DiscardSnapshot = 36,

    // ===== Classes =====
    /// Build a class from name, optional superclass and methods
    BuildClass = 37,
    /// Load an attribute
    LoadAttr = 38,
    /// Store an attribute
    StoreAttr = 39,
    /// Type or class membership test
    IsInstance = 40,
    /// Load a superclass method bound to an instance
    LoadSuperMethod = 41,

    // ===== Control Flow =====
    /// Unconditional jump
    Jmp = 44,
    /// Pop, jump if falsy
    JmpIfFalse = 45,
    /// Pop, jump if truthy
    JmpIfTrue = 46,
    /// Call with N arguments
    Call = 47,
    /// Return from the current frame
    Ret = 48,

    // ===== Exceptions =====
    /// Install an exception handler
    PushTry = 49,
    /// Remove the latest exception handler
    PopTry = 50,
    /// Throw the top of stack
    Throw = 51,

    // ===== System =====
    /// Import a module by name
    Import = 52,
    /// Print N values
    Print = 53,
    /// Stop execution
    Halt = 54,

    // ===== Closures & Misc =====
    /// Wrap a code object with cells from the current frame
    MakeClosure = 55,
    /// Numeric negation
    Neg = 58,
    /// Slice a string or list
    Slice = 59,
    /// Build a code object from a descriptor mapping
    BuildFunction = 60,
    /// Length of a string, list, or mapping
    Len = 62,
    /// Stringify
    Str = 64,
    /// Load a cell's content
    LoadDeref = 65,
    /// Store into a cell
    StoreDeref = 66,
    /// Push a cell itself
    LoadClosure = 67,
    /// Wrap a code object with an explicit list of cells
    MakeFunction = 68,

    // ===== Bit Operations =====
    /// Bitwise and
    BitAnd = 69,
    /// Bitwise or
    BitOr = 70,
    /// Bitwise xor
    BitXor = 71,
    /// Bitwise not
    BitNot = 72,
    /// Shift left
    Lshift = 73,
    /// Arithmetic shift right
    Rshift = 74,

    // ===== Strings =====
    /// Lowercase a string
    StrLower = 75,
    /// Uppercase a string
    StrUpper = 76,
    /// Find a substring
    StrFind = 77,
    /// Replace all occurrences of a substring
    StrReplace = 78,

    // ===== File I/O =====
    /// Open a file handle
    IoOpen = 87,
    /// Read from a file handle
    IoRead = 88,
    /// Write to a file handle
    IoWrite = 89,
    /// Close a file handle
    IoClose = 90,
}

impl Opcode {
    /// Convert a byte to an opcode
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(Self::PushConst),
            2 => Some(Self::Pop),
            3 => Some(Self::Dup),
            4 => Some(Self::Add),
            5 => Some(Self::Sub),
            6 => Some(Self::Mul),
            7 => Some(Self::Div),
            8 => Some(Self::Mod),
            9 => Some(Self::Eq),
            10 => Some(Self::Neq),
            11 => Some(Self::Gt),
            12 => Some(Self::Lt),
            13 => Some(Self::Gte),
            14 => Some(Self::Lte),
            15 => Some(Self::Not),
            16 => Some(Self::And),
            17 => Some(Self::Or),
            18 => Some(Self::LoadReg),
            19 => Some(Self::MoveReg),
            20 => Some(Self::AddReg),
            21 => Some(Self::PushFromReg),
            22 => Some(Self::PopToReg),
            23 => Some(Self::LoadVar),
            24 => Some(Self::StoreVar),
            25 => Some(Self::LoadLocal),
            26 => Some(Self::StoreLocal),
            27 => Some(Self::BuildList),
            28 => Some(Self::BuildDict),
            29 => Some(Self::LoadIndex),
            30 => Some(Self::StoreIndex),
            31 => Some(Self::UnpackSequence),
            32 => Some(Self::CheckLen),
            33 => Some(Self::CheckLenMin),
            34 => Some(Self::Snapshot),
            35 => Some(Self::Restore),
            36 => Some(Self::DiscardSnapshot),
            37 => Some(Self::BuildClass),
            38 => Some(Self::LoadAttr),
            39 => Some(Self::StoreAttr),
            40 => Some(Self::IsInstance),
            41 => Some(Self::LoadSuperMethod),
            44 => Some(Self::Jmp),
            45 => Some(Self::JmpIfFalse),
            46 => Some(Self::JmpIfTrue),
            47 => Some(Self::Call),
            48 => Some(Self::Ret),
            49 => Some(Self::PushTry),
            50 => Some(Self::PopTry),
            51 => Some(Self::Throw),
            52 => Some(Self::Import),
            53 => Some(Self::Print),
            54 => Some(Self::Halt),
            55 => Some(Self::MakeClosure),
            58 => Some(Self::Neg),
            59 => Some(Self::Slice),
            60 => Some(Self::BuildFunction),
            62 => Some(Self::Len),
            64 => Some(Self::Str),
            65 => Some(Self::LoadDeref),
            66 => Some(Self::StoreDeref),
            67 => Some(Self::LoadClosure),
            68 => Some(Self::MakeFunction),
            69 => Some(Self::BitAnd),
            70 => Some(Self::BitOr),
            71 => Some(Self::BitXor),
            72 => Some(Self::BitNot),
            73 => Some(Self::Lshift),
            74 => Some(Self::Rshift),
            75 => Some(Self::StrLower),
            76 => Some(Self::StrUpper),
            77 => Some(Self::StrFind),
            78 => Some(Self::StrReplace),
            87 => Some(Self::IoOpen),
            88 => Some(Self::IoRead),
            89 => Some(Self::IoWrite),
            90 => Some(Self::IoClose),
            _ => None,
        }
    }

    /// Convert opcode to its byte value
    #[inline]
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Get the mnemonic used by the disassembler
    pub fn name(self) -> &'static str {
        match self {
            Self::PushConst => "PUSH_CONST",
            Self::Pop => "POP",
            Self::Dup => "DUP",
            Self::Add => "ADD",
            Self::Sub => "SUB",
            Self::Mul => "MUL",
            Self::Div => "DIV",
            Self::Mod => "MOD",
            Self::Eq => "EQ",
            Self::Neq => "NEQ",
            Self::Gt => "GT",
            Self::Lt => "LT",
            Self::Gte => "GTE",
            Self::Lte => "LTE",
            Self::Not => "NOT",
            Self::And => "AND",
            Self::Or => "OR",
            Self::LoadReg => "LOAD_REG",
            Self::MoveReg => "MOVE_REG",
            Self::AddReg => "ADD_REG",
            Self::PushFromReg => "PUSH_FROM_REG",
            Self::PopToReg => "POP_TO_REG",
            Self::LoadVar => "LOAD_VAR",
            Self::StoreVar => "STORE_VAR",
            Self::LoadLocal => "LOAD_LOCAL",
            Self::StoreLocal => "STORE_LOCAL",
            Self::BuildList => "BUILD_LIST",
            Self::BuildDict => "BUILD_DICT",
            Self::LoadIndex => "LOAD_INDEX",
            Self::StoreIndex => "STORE_INDEX",
            Self::UnpackSequence => "UNPACK_SEQUENCE",
            Self::CheckLen => "CHECK_LEN",
            Self::CheckLenMin => "CHECK_LEN_MIN",
            Self::Snapshot => "SNAPSHOT",
            Self::Restore => "RESTORE",
            Self::DiscardSnapshot => "DISCARD_SNAPSHOT",
            Self::BuildClass => "BUILD_CLASS",
            Self::LoadAttr => "LOAD_ATTR",
            Self::StoreAttr => "STORE_ATTR",
            Self::IsInstance => "IS_INSTANCE",
            Self::LoadSuperMethod => "LOAD_SUPER_METHOD",
            Self::Jmp => "JMP",
            Self::JmpIfFalse => "JMP_IF_FALSE",
            Self::JmpIfTrue => "JMP_IF_TRUE",
            Self::Call => "CALL",
            Self::Ret => "RET",
            Self::PushTry => "PUSH_TRY",
            Self::PopTry => "POP_TRY",
            Self::Throw => "THROW",
            Self::Import => "IMPORT",
            Self::Print => "PRINT",
            Self::Halt => "HALT",
            Self::MakeClosure => "MAKE_CLOSURE",
            Self::Neg => "NEG",
            Self::Slice => "SLICE",
            Self::BuildFunction => "BUILD_FUNCTION",
            Self::Len => "LEN",
            Self::Str => "STR",
            Self::LoadDeref => "LOAD_DEREF",
            Self::StoreDeref => "STORE_DEREF",
            Self::LoadClosure => "LOAD_CLOSURE",
            Self::MakeFunction => "MAKE_FUNCTION",
            Self::BitAnd => "BIT_AND",
            Self::BitOr => "BIT_OR",
            Self::BitXor => "BIT_XOR",
            Self::BitNot => "BIT_NOT",
            Self::Lshift => "LSHIFT",
            Self::Rshift => "RSHIFT",
            Self::StrLower => "STR_LOWER",
            Self::StrUpper => "STR_UPPER",
            Self::StrFind => "STR_FIND",
            Self::StrReplace => "STR_REPLACE",
            Self::IoOpen => "IO_OPEN",
            Self::IoRead => "IO_READ",
            Self::IoWrite => "IO_WRITE",
            Self::IoClose => "IO_CLOSE",
        }
    }

    /// Check if this opcode transfers control to an instruction index
    pub fn is_jump(self) -> bool {
        matches!(
            self,
            Self::Jmp | Self::JmpIfFalse | Self::JmpIfTrue | Self::PushTry
        )
    }
}
