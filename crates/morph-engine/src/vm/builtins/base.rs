//! Printing, introspection, coercion and container builtins

use super::string::join_display;
use super::{arg, done};
use crate::vm::interpreter::opcodes::arrays::normalize_index;
use crate::vm::interpreter::{Interpreter, NativeCallResult};
use crate::vm::value::Value;
use std::io::{BufRead, Write};
use tracing::warn;

/// `tulis(...)`: print arguments space-separated with a newline
pub fn tulis(interp: &mut Interpreter, argc: usize) -> NativeCallResult {
    let args = interp.pop_args(argc);
    let mut line = join_display(&args, " ");
    line.push('\n');
    interp.write_output(&line);
    done(interp, Value::Nil)
}

/// `cetak(...)`: print arguments without a trailing newline
pub fn cetak(interp: &mut Interpreter, argc: usize) -> NativeCallResult {
    let args = interp.pop_args(argc);
    let text = join_display(&args, " ");
    interp.write_output(&text);
    flush(interp);
    done(interp, Value::Nil)
}

/// `masukan(prompt?)`: read one line, Nil at end of input
pub fn masukan(interp: &mut Interpreter, argc: usize) -> NativeCallResult {
    let args = interp.pop_args(argc);
    if let Some(prompt) = args.first().filter(|p| !p.is_nil()) {
        interp.write_output(&prompt.to_string());
        flush(interp);
    }

    let mut line = String::new();
    let result = match interp.input().read_line(&mut line) {
        Ok(0) => Value::Nil,
        Ok(_) => {
            if line.ends_with('\n') {
                line.pop();
                if line.ends_with('\r') {
                    line.pop();
                }
            }
            Value::string(line)
        }
        Err(e) => {
            warn!(error = %e, "failed to read input");
            Value::Nil
        }
    };
    done(interp, result)
}

fn flush(interp: &mut Interpreter) {
    if let Err(e) = interp.output().flush() {
        warn!(error = %e, "failed to flush program output");
    }
}

/// `panjang(x)`: length of a string, list or mapping
pub fn panjang(interp: &mut Interpreter, argc: usize) -> NativeCallResult {
    let args = interp.pop_args(argc);
    let len = arg(&args, 0).len().map(Value::from).unwrap_or_default();
    done(interp, len)
}

/// `teks(x)`: display form
pub fn teks(interp: &mut Interpreter, argc: usize) -> NativeCallResult {
    let args = interp.pop_args(argc);
    let text = Value::string(arg(&args, 0).to_string());
    done(interp, text)
}

/// `tipe(x)`: Morph type name
pub fn tipe(interp: &mut Interpreter, argc: usize) -> NativeCallResult {
    let args = interp.pop_args(argc);
    let name = Value::string(arg(&args, 0).type_name());
    done(interp, name)
}

pub fn to_int(interp: &mut Interpreter, argc: usize) -> NativeCallResult {
    let args = interp.pop_args(argc);
    let value = coerce_int(&arg(&args, 0));
    done(interp, value)
}

pub fn to_float(interp: &mut Interpreter, argc: usize) -> NativeCallResult {
    let args = interp.pop_args(argc);
    let value = coerce_float(&arg(&args, 0));
    done(interp, value)
}

/// Integer coercion: floats truncate, strings parse, booleans map to 0/1
pub(crate) fn coerce_int(value: &Value) -> Value {
    match value {
        Value::Integer(i) => Value::Integer(*i),
        Value::Float(f) if f.is_finite() => Value::Integer(f.trunc() as i64),
        Value::Boolean(b) => Value::Integer(i64::from(*b)),
        Value::String(s) => {
            let s = s.trim();
            match s.parse::<i64>() {
                Ok(i) => Value::Integer(i),
                Err(_) => match s.parse::<f64>() {
                    Ok(f) if f.is_finite() => Value::Integer(f.trunc() as i64),
                    _ => Value::Nil,
                },
            }
        }
        _ => Value::Nil,
    }
}

pub(crate) fn coerce_float(value: &Value) -> Value {
    match value {
        Value::Integer(i) => Value::Float(*i as f64),
        Value::Float(f) => Value::Float(*f),
        Value::Boolean(b) => Value::Float(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .unwrap_or_default(),
        _ => Value::Nil,
    }
}

/// `_tambah_builtin(list, item)`
pub fn append(interp: &mut Interpreter, argc: usize) -> NativeCallResult {
    let args = interp.pop_args(argc);
    if let Value::List(items) = arg(&args, 0) {
        items.borrow_mut().push(arg(&args, 1));
    }
    done(interp, Value::Nil)
}

/// `_hapus_indeks_builtin(list, index)`: removed element or Nil
pub fn remove_at(interp: &mut Interpreter, argc: usize) -> NativeCallResult {
    let args = interp.pop_args(argc);
    let removed = match (arg(&args, 0), arg(&args, 1)) {
        (Value::List(items), Value::Integer(index)) => {
            let mut items = items.borrow_mut();
            match normalize_index(index, items.len()) {
                Some(i) => items.remove(i),
                None => Value::Nil,
            }
        }
        _ => Value::Nil,
    };
    done(interp, removed)
}

/// `_salin_kamus_builtin(map)`: shallow copy
pub fn copy_mapping(interp: &mut Interpreter, argc: usize) -> NativeCallResult {
    let args = interp.pop_args(argc);
    let copy = match arg(&args, 0) {
        Value::Mapping(map) => Value::mapping(map.borrow().clone()),
        _ => Value::Nil,
    };
    done(interp, copy)
}
