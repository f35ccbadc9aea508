//! File builtins and the helpers behind the IO_* opcodes
//!
//! Failures are logged at debug level and surface to interpreted code as
//! Nil or `salah`.

use super::{arg, done};
use crate::vm::interpreter::{Interpreter, NativeCallResult};
use crate::vm::object::FileHandle;
use crate::vm::value::Value;
use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;
use std::rc::Rc;
use tracing::debug;

/// Open `path` with a C-style mode string (`r`, `w`, `a`, optionally `+`)
pub(crate) fn open(path: &Value, mode: &Value) -> Value {
    let Some(path) = path.as_str() else {
        return Value::Nil;
    };
    let mode = mode.as_str().unwrap_or("r");
    let update = mode.contains('+');

    let mut options = OpenOptions::new();
    if mode.starts_with('w') {
        options.write(true).create(true).truncate(true).read(update);
    } else if mode.starts_with('a') {
        options.append(true).create(true).read(update);
    } else {
        options.read(true).write(update);
    }

    match options.open(path) {
        Ok(file) => Value::File(Rc::new(FileHandle::new(path, mode, file))),
        Err(e) => {
            debug!(path, mode, error = %e, "open failed");
            Value::Nil
        }
    }
}

/// Read the rest of the file, or at most `size` bytes when `size` is a
/// non-negative integer
pub(crate) fn read(handle: &Value, size: &Value) -> Value {
    let Value::File(handle) = handle else {
        return Value::Nil;
    };
    let mut slot = handle.file.borrow_mut();
    let Some(file) = slot.as_mut() else {
        return Value::Nil;
    };

    let mut buf = Vec::new();
    let result = match size {
        Value::Integer(n) if *n >= 0 => file.take(*n as u64).read_to_end(&mut buf),
        _ => file.read_to_end(&mut buf),
    };
    match result {
        Ok(_) => Value::string(String::from_utf8_lossy(&buf).into_owned()),
        Err(e) => {
            debug!(path = %handle.path, error = %e, "read failed");
            Value::Nil
        }
    }
}

/// Write the display form of `content`; `benar` on success
pub(crate) fn write(handle: &Value, content: &Value) -> Value {
    let Value::File(handle) = handle else {
        return Value::Boolean(false);
    };
    let mut slot = handle.file.borrow_mut();
    let Some(file) = slot.as_mut() else {
        return Value::Boolean(false);
    };
    match file.write_all(content.to_string().as_bytes()) {
        Ok(()) => Value::Boolean(true),
        Err(e) => {
            debug!(path = %handle.path, error = %e, "write failed");
            Value::Boolean(false)
        }
    }
}

pub(crate) fn close(handle: &Value) -> Value {
    if let Value::File(handle) = handle {
        handle.close();
    }
    Value::Nil
}

/// `baca_file(path)`: whole file as a string
pub fn read_file(interp: &mut Interpreter, argc: usize) -> NativeCallResult {
    let args = interp.pop_args(argc);
    let content = match arg(&args, 0).as_str() {
        Some(path) => match fs::read(path) {
            Ok(bytes) => Value::string(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) => {
                debug!(path, error = %e, "baca_file failed");
                Value::Nil
            }
        },
        None => Value::Nil,
    };
    done(interp, content)
}

/// `tulis_file(path, content)`
pub fn write_file(interp: &mut Interpreter, argc: usize) -> NativeCallResult {
    let args = interp.pop_args(argc);
    let ok = match arg(&args, 0).as_str() {
        Some(path) => match fs::write(path, arg(&args, 1).to_string()) {
            Ok(()) => true,
            Err(e) => {
                debug!(path, error = %e, "tulis_file failed");
                false
            }
        },
        None => false,
    };
    done(interp, Value::Boolean(ok))
}

/// `_io_ada(path)`
pub fn exists(interp: &mut Interpreter, argc: usize) -> NativeCallResult {
    let args = interp.pop_args(argc);
    let found = arg(&args, 0).as_str().is_some_and(|p| Path::new(p).exists());
    done(interp, Value::Boolean(found))
}

pub fn open_native(interp: &mut Interpreter, argc: usize) -> NativeCallResult {
    let args = interp.pop_args(argc);
    let handle = open(&arg(&args, 0), &arg(&args, 1));
    done(interp, handle)
}

pub fn read_native(interp: &mut Interpreter, argc: usize) -> NativeCallResult {
    let args = interp.pop_args(argc);
    let content = read(&arg(&args, 0), &arg(&args, 1));
    done(interp, content)
}

pub fn write_native(interp: &mut Interpreter, argc: usize) -> NativeCallResult {
    let args = interp.pop_args(argc);
    let ok = write(&arg(&args, 0), &arg(&args, 1));
    done(interp, ok)
}

pub fn close_native(interp: &mut Interpreter, argc: usize) -> NativeCallResult {
    let args = interp.pop_args(argc);
    let result = close(&arg(&args, 0));
    done(interp, result)
}
