//! Module file format
//!
//! ```text
//! 0..10   magic "VZOEL FOXS"
//! 10      version (u8)
//! 11      flags (u8)
//! 12..16  timestamp (u32, seconds)
//! 16..    root value, must be a code object
//! ```
//!
//! Values are tag-prefixed; see [`tags`]. All multi-byte fields are little-endian.

use super::code::{CodeObject, Instruction};
use super::encoder::{BytecodeReader, BytecodeWriter, DecodeError};
use crate::vm::value::{Mapping, Value};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::{debug, warn};

/// Magic marker at the start of every module file
pub const MAGIC: [u8; 10] = *b"VZOEL FOXS";

/// Version written by the encoder; readers do not validate it
pub const VERSION: u8 = 1;

/// Magic plus version, flags and timestamp
pub const HEADER_SIZE: usize = 16;

/// Maximum nesting of lists, mappings and code objects while decoding
pub const MAX_NESTING: usize = 256;

/// Value type tags
pub mod tags {
    pub const NIL: u8 = 1;
    pub const BOOLEAN: u8 = 2;
    /// Signed 32-bit integer
    pub const INTEGER: u8 = 3;
    pub const FLOAT: u8 = 4;
    pub const STRING: u8 = 5;
    pub const LIST: u8 = 6;
    pub const CODE: u8 = 7;
    pub const MAPPING: u8 = 8;
    /// Signed 64-bit integer, for values outside the i32 range
    pub const INTEGER64: u8 = 9;
}

/// Module loading errors
#[derive(Debug, Error)]
pub enum ModuleError {
    /// The module file could not be read
    #[error("Cannot read module {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Magic marker mismatch
    #[error("Invalid magic number: expected \"VZOEL FOXS\", got {0:?}")]
    InvalidMagic(Vec<u8>),

    /// Truncated or malformed data
    #[error("Decode error: {0}")]
    DecodeError(#[from] DecodeError),

    /// Root value decoded to something other than a code object
    #[error("Module root must be a code object, got {0}")]
    RootNotCode(&'static str),
}

/// Header fields following the magic marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleHeader {
    pub version: u8,
    pub flags: u8,
    pub timestamp: u32,
}

impl Default for ModuleHeader {
    fn default() -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as u32)
            .unwrap_or(0);
        Self {
            version: VERSION,
            flags: 0,
            timestamp,
        }
    }
}

/// A decoded module: header plus root code object
#[derive(Debug, Clone)]
pub struct Module {
    pub header: ModuleHeader,
    pub code: Rc<CodeObject>,
}

impl Module {
    /// Wrap a code object with a fresh header
    pub fn new(code: CodeObject) -> Self {
        Self {
            header: ModuleHeader::default(),
            code: Rc::new(code),
        }
    }

    /// Name of the root code object
    pub fn name(&self) -> &str {
        &self.code.name
    }

    /// Decode a module from raw bytes
    pub fn decode(data: &[u8]) -> Result<Self, ModuleError> {
        if data.len() < MAGIC.len() || data[..MAGIC.len()] != MAGIC {
            let got = data[..data.len().min(MAGIC.len())].to_vec();
            return Err(ModuleError::InvalidMagic(got));
        }

        let mut reader = BytecodeReader::new(data);
        reader.read_bytes(MAGIC.len())?;
        let header = ModuleHeader {
            version: reader.read_u8()?,
            flags: reader.read_u8()?,
            timestamp: reader.read_u32()?,
        };

        match decode_value(&mut reader)? {
            Value::Code(code) => Ok(Self { header, code }),
            other => Err(ModuleError::RootNotCode(other.kind_name())),
        }
    }

    /// Read and decode a module file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ModuleError> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| ModuleError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let module = Self::decode(&data)?;
        debug!(
            path = %path.display(),
            name = module.name(),
            instructions = module.code.len(),
            "loaded module"
        );
        Ok(module)
    }

    /// Encode the module to bytes
    pub fn encode(&self) -> Vec<u8> {
        let mut writer = BytecodeWriter::new();
        writer.emit_bytes(&MAGIC);
        writer.emit_u8(self.header.version);
        writer.emit_u8(self.header.flags);
        writer.emit_u32(self.header.timestamp);
        writer.emit_u8(tags::CODE);
        encode_code(&mut writer, &self.code);
        writer.into_bytes()
    }
}

/// Decode one tag-prefixed value
pub fn decode_value(reader: &mut BytecodeReader<'_>) -> Result<Value, DecodeError> {
    decode_nested(reader, 0)
}

fn decode_nested(reader: &mut BytecodeReader<'_>, depth: usize) -> Result<Value, DecodeError> {
    if depth > MAX_NESTING {
        return Err(DecodeError::NestingTooDeep {
            offset: reader.position(),
            limit: MAX_NESTING,
        });
    }

    let tag = reader.read_u8()?;
    let value = match tag {
        tags::NIL => Value::Nil,
        tags::BOOLEAN => Value::Boolean(reader.read_u8()? == 1),
        tags::INTEGER => Value::Integer(i64::from(reader.read_i32()?)),
        tags::INTEGER64 => Value::Integer(reader.read_i64()?),
        tags::FLOAT => Value::Float(reader.read_f64()?),
        tags::STRING => Value::string(reader.read_string()?),
        tags::LIST => {
            let count = reader.read_u32()? as usize;
            let mut items = Vec::with_capacity(count.min(reader.remaining()));
            for _ in 0..count {
                items.push(decode_nested(reader, depth + 1)?);
            }
            Value::list(items)
        }
        tags::CODE => Value::Code(Rc::new(decode_code(reader, depth + 1)?)),
        tags::MAPPING => {
            let count = reader.read_u32()? as usize;
            let mut map = Mapping::default();
            for _ in 0..count {
                let key = decode_nested(reader, depth + 1)?;
                let value = decode_nested(reader, depth + 1)?;
                match key {
                    Value::String(key) => {
                        map.insert(key.to_string(), value);
                    }
                    other => debug!(key = %other, "dropping non-string mapping key"),
                }
            }
            Value::mapping(map)
        }
        unknown => {
            warn!(
                tag = unknown,
                offset = reader.position() - 1,
                "unsupported value tag, substituting nil"
            );
            Value::Nil
        }
    };
    Ok(value)
}

fn decode_code(reader: &mut BytecodeReader<'_>, depth: usize) -> Result<CodeObject, DecodeError> {
    let name = reader.read_string()?;

    let argc = reader.read_u8()?;
    let mut arg_names = Vec::with_capacity(argc as usize);
    for _ in 0..argc {
        arg_names.push(reader.read_string()?);
    }

    let const_count = reader.read_u32()? as usize;
    let mut constants = Vec::with_capacity(const_count.min(reader.remaining()));
    for _ in 0..const_count {
        constants.push(decode_nested(reader, depth)?);
    }

    let instr_count = reader.read_u32()? as usize;
    let mut instructions = Vec::with_capacity(instr_count.min(reader.remaining()));
    for _ in 0..instr_count {
        let op = reader.read_u8()?;
        let arg = decode_nested(reader, depth)?;
        instructions.push(Instruction { op, arg });
    }

    Ok(CodeObject {
        name,
        arg_names,
        constants,
        instructions,
        free_vars: Vec::new(),
        cell_vars: Vec::new(),
    })
}

/// Encode one value with its tag
///
/// Runtime-only values (functions, classes, instances, cells, generators,
/// file handles) have no wire form and are written as Nil.
pub fn encode_value(writer: &mut BytecodeWriter, value: &Value) {
    match value {
        Value::Nil => writer.emit_u8(tags::NIL),
        Value::Boolean(b) => {
            writer.emit_u8(tags::BOOLEAN);
            writer.emit_u8(u8::from(*b));
        }
        Value::Integer(i) => match i32::try_from(*i) {
            Ok(small) => {
                writer.emit_u8(tags::INTEGER);
                writer.emit_i32(small);
            }
            Err(_) => {
                writer.emit_u8(tags::INTEGER64);
                writer.emit_i64(*i);
            }
        },
        Value::Float(f) => {
            writer.emit_u8(tags::FLOAT);
            writer.emit_f64(*f);
        }
        Value::String(s) => {
            writer.emit_u8(tags::STRING);
            writer.emit_string(s);
        }
        Value::List(items) => {
            let items = items.borrow();
            writer.emit_u8(tags::LIST);
            writer.emit_u32(items.len() as u32);
            for item in items.iter() {
                encode_value(writer, item);
            }
        }
        Value::Mapping(map) => {
            let map = map.borrow();
            writer.emit_u8(tags::MAPPING);
            writer.emit_u32(map.len() as u32);
            for (key, value) in map.iter() {
                writer.emit_u8(tags::STRING);
                writer.emit_string(key);
                encode_value(writer, value);
            }
        }
        Value::Code(code) => {
            writer.emit_u8(tags::CODE);
            encode_code(writer, code);
        }
        _ => writer.emit_u8(tags::NIL),
    }
}

fn encode_code(writer: &mut BytecodeWriter, code: &CodeObject) {
    writer.emit_string(&code.name);
    writer.emit_u8(code.arg_names.len() as u8);
    for name in &code.arg_names {
        writer.emit_string(name);
    }
    writer.emit_u32(code.constants.len() as u32);
    for constant in &code.constants {
        encode_value(writer, constant);
    }
    writer.emit_u32(code.instructions.len() as u32);
    for instr in &code.instructions {
        writer.emit_u8(instr.op);
        encode_value(writer, &instr.arg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::Opcode;

    fn sample_code() -> CodeObject {
        let mut code = CodeObject::new("utama");
        code.arg_names = vec!["a".to_string(), "b".to_string()];
        code.constants = vec![Value::Integer(7), Value::string("hai")];
        code.instructions = vec![
            Instruction::new(Opcode::PushConst, Value::Integer(-5)),
            Instruction::new(Opcode::PushConst, Value::Float(2.5)),
            Instruction::new(Opcode::Add, Value::Nil),
            Instruction::new(Opcode::Ret, Value::Nil),
        ];
        code
    }

    #[test]
    fn test_encode_decode_module() {
        let module = Module::new(sample_code());
        let bytes = module.encode();
        assert_eq!(&bytes[..10], b"VZOEL FOXS");
        assert_eq!(bytes[10], VERSION);

        let decoded = Module::decode(&bytes).unwrap();
        assert_eq!(decoded.header, module.header);
        assert_eq!(decoded.name(), "utama");
        assert_eq!(decoded.code.arg_names, vec!["a", "b"]);
        assert_eq!(decoded.code.constants.len(), 2);
        assert_eq!(decoded.code.instructions.len(), 4);
        assert_eq!(decoded.code.instructions[0].arg, Value::Integer(-5));
        assert_eq!(decoded.code.instructions[2].opcode(), Some(Opcode::Add));
    }

    #[test]
    fn test_invalid_magic() {
        let mut bytes = Module::new(sample_code()).encode();
        bytes[0] = b'X';
        assert!(matches!(
            Module::decode(&bytes),
            Err(ModuleError::InvalidMagic(_))
        ));
        assert!(matches!(
            Module::decode(b"VZO"),
            Err(ModuleError::InvalidMagic(_))
        ));
    }

    #[test]
    fn test_root_not_code() {
        let mut writer = BytecodeWriter::new();
        writer.emit_bytes(&MAGIC);
        writer.emit_bytes(&[1, 0, 0, 0, 0, 0]);
        encode_value(&mut writer, &Value::Integer(1));
        let err = Module::decode(&writer.into_bytes()).unwrap_err();
        assert!(matches!(err, ModuleError::RootNotCode("integer")));
    }

    #[test]
    fn test_truncated_module() {
        let bytes = Module::new(sample_code()).encode();
        let err = Module::decode(&bytes[..bytes.len() - 3]).unwrap_err();
        assert!(matches!(err, ModuleError::DecodeError(_)));
    }

    #[test]
    fn test_negative_integer_sign_extends() {
        let data = [tags::INTEGER, 0xFF, 0xFF, 0xFF, 0xFF];
        let mut reader = BytecodeReader::new(&data);
        assert_eq!(decode_value(&mut reader).unwrap(), Value::Integer(-1));
    }

    #[test]
    fn test_wide_integer_uses_tag_nine() {
        let mut writer = BytecodeWriter::new();
        encode_value(&mut writer, &Value::Integer(1 << 40));
        let bytes = writer.into_bytes();
        assert_eq!(bytes[0], tags::INTEGER64);
        let mut reader = BytecodeReader::new(&bytes);
        assert_eq!(decode_value(&mut reader).unwrap(), Value::Integer(1 << 40));
    }

    #[test]
    fn test_unknown_tag_becomes_nil() {
        let data = [tags::LIST, 2, 0, 0, 0, 0xEE, tags::BOOLEAN, 1];
        let mut reader = BytecodeReader::new(&data);
        let value = decode_value(&mut reader).unwrap();
        let Value::List(items) = value else {
            panic!("expected list");
        };
        assert_eq!(*items.borrow(), vec![Value::Nil, Value::Boolean(true)]);
    }

    #[test]
    fn test_mapping_drops_non_string_keys() {
        let mut writer = BytecodeWriter::new();
        writer.emit_u8(tags::MAPPING);
        writer.emit_u32(2);
        encode_value(&mut writer, &Value::Integer(1));
        encode_value(&mut writer, &Value::string("satu"));
        encode_value(&mut writer, &Value::string("k"));
        encode_value(&mut writer, &Value::Integer(2));
        let bytes = writer.into_bytes();

        let mut reader = BytecodeReader::new(&bytes);
        let Value::Mapping(map) = decode_value(&mut reader).unwrap() else {
            panic!("expected mapping");
        };
        let map = map.borrow();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("k"), Some(&Value::Integer(2)));
    }

    #[test]
    fn test_nesting_limit() {
        let mut data = Vec::new();
        for _ in 0..=MAX_NESTING + 1 {
            data.extend_from_slice(&[tags::LIST, 1, 0, 0, 0]);
        }
        data.push(tags::NIL);
        let mut reader = BytecodeReader::new(&data);
        assert!(matches!(
            decode_value(&mut reader),
            Err(DecodeError::NestingTooDeep { .. })
        ));
    }
}
