//! String helpers shared by the string opcodes and `_teks` natives

use super::{arg, done};
use crate::vm::interpreter::{Interpreter, NativeCallResult};
use crate::vm::value::Value;

/// Join the display forms of `values`
pub(crate) fn join_display(values: &[Value], sep: &str) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(sep)
}

pub(crate) fn lower(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::string(s.to_lowercase()),
        _ => Value::Nil,
    }
}

pub(crate) fn upper(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::string(s.to_uppercase()),
        _ => Value::Nil,
    }
}

/// Char index of the first occurrence of `needle`, or -1
///
/// Nil unless both operands are strings.
pub(crate) fn find(haystack: &Value, needle: &Value) -> Value {
    match (haystack, needle) {
        (Value::String(h), Value::String(n)) => match h.find(&**n) {
            Some(byte) => Value::from(h[..byte].chars().count()),
            None => Value::Integer(-1),
        },
        _ => Value::Nil,
    }
}

/// Replace every occurrence of `old`
///
/// Nil unless all three operands are strings. An empty pattern leaves the
/// haystack unchanged.
pub(crate) fn replace(haystack: &Value, old: &Value, new: &Value) -> Value {
    match (haystack, old, new) {
        (Value::String(_), Value::String(o), Value::String(_)) if o.is_empty() => {
            haystack.clone()
        }
        (Value::String(h), Value::String(o), Value::String(n)) => {
            Value::string(h.replace(&**o, n))
        }
        _ => Value::Nil,
    }
}

/// `_gabung_builtin(list, sep)`
pub fn join(interp: &mut Interpreter, argc: usize) -> NativeCallResult {
    let args = interp.pop_args(argc);
    let joined = match arg(&args, 0) {
        Value::List(items) => {
            let sep = arg(&args, 1);
            let sep = sep.as_str().unwrap_or("");
            Value::string(join_display(&items.borrow(), sep))
        }
        _ => Value::Nil,
    };
    done(interp, joined)
}

/// `_ord_builtin(s)`: code point of the first char
pub fn ord(interp: &mut Interpreter, argc: usize) -> NativeCallResult {
    let args = interp.pop_args(argc);
    let code = arg(&args, 0)
        .as_str()
        .and_then(|s| s.chars().next())
        .map(|c| Value::Integer(i64::from(u32::from(c))))
        .unwrap_or_default();
    done(interp, code)
}

/// `_chr_builtin(n)`: one-char string, Nil for invalid code points
pub fn chr(interp: &mut Interpreter, argc: usize) -> NativeCallResult {
    let args = interp.pop_args(argc);
    let ch = arg(&args, 0)
        .as_int()
        .and_then(|i| u32::try_from(i).ok())
        .and_then(char::from_u32)
        .map(|c| Value::string(c.to_string()))
        .unwrap_or_default();
    done(interp, ch)
}

pub fn lower_native(interp: &mut Interpreter, argc: usize) -> NativeCallResult {
    let args = interp.pop_args(argc);
    let result = lower(&arg(&args, 0));
    done(interp, result)
}

pub fn upper_native(interp: &mut Interpreter, argc: usize) -> NativeCallResult {
    let args = interp.pop_args(argc);
    let result = upper(&arg(&args, 0));
    done(interp, result)
}

pub fn find_native(interp: &mut Interpreter, argc: usize) -> NativeCallResult {
    let args = interp.pop_args(argc);
    let result = find(&arg(&args, 0), &arg(&args, 1));
    done(interp, result)
}

pub fn replace_native(interp: &mut Interpreter, argc: usize) -> NativeCallResult {
    let args = interp.pop_args(argc);
    let result = replace(&arg(&args, 0), &arg(&args, 1), &arg(&args, 2));
    done(interp, result)
}
