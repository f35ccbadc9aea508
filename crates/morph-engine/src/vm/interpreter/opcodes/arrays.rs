use crate::bytecode::Opcode;
use crate::vm::defaults::MAX_NIL_PADDING;
use crate::vm::interpreter::core::operand_index;
use crate::vm::interpreter::execution::OpcodeResult;
use crate::vm::interpreter::Interpreter;
use crate::vm::value::{Mapping, Value};
use tracing::{debug, warn};

/// Resolve a possibly negative index against `len`
pub(crate) fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let idx = if index < 0 { index + len } else { index };
    (0..len).contains(&idx).then_some(idx as usize)
}

/// Resolve slice bounds, clamping into `0..=len`
fn slice_bounds(start: &Value, end: &Value, len: usize) -> Option<(usize, usize)> {
    let clamp = |v: &Value, default: usize| -> Option<usize> {
        match v {
            Value::Nil => Some(default),
            Value::Integer(i) => {
                let len = len as i64;
                let idx = if *i < 0 { *i + len } else { *i };
                Some(idx.clamp(0, len) as usize)
            }
            _ => None,
        }
    };
    let start = clamp(start, 0)?;
    let end = clamp(end, len)?;
    Some((start, end.max(start)))
}

impl Interpreter {
    pub(in crate::vm::interpreter) fn exec_array_ops(
        &mut self,
        opcode: Opcode,
        arg: Value,
    ) -> OpcodeResult {
        match opcode {
            Opcode::BuildList => {
                let count = operand_index(&arg).unwrap_or(0);
                let items = self.pop_args(count);
                self.push(Value::list(items));
            }

            Opcode::BuildDict => {
                let count = operand_index(&arg).unwrap_or(0);
                let Some(slots) = count.checked_mul(2) else {
                    warn!(count, "BUILD_DICT pair count overflows, substituting nil");
                    self.push(Value::Nil);
                    return OpcodeResult::Continue;
                };
                let flat = self.pop_args(slots);
                // A truncated Nil fill can leave an odd count; pair from the top.
                let mut map = Mapping::default();
                for pair in flat[flat.len() % 2..].chunks_exact(2) {
                    match &pair[0] {
                        Value::String(key) => {
                            map.insert(key.to_string(), pair[1].clone());
                        }
                        other => debug!(key = %other.repr(), "dropping non-string mapping key"),
                    }
                }
                self.push(Value::mapping(map));
            }

            Opcode::LoadIndex => {
                let index = self.pop();
                let target = self.pop();
                self.push(load_index(&target, &index));
            }

            Opcode::StoreIndex => {
                let value = self.pop();
                let index = self.pop();
                let target = self.pop();
                match (&target, &index) {
                    (Value::List(items), Value::Integer(i)) => {
                        let mut items = items.borrow_mut();
                        if let Some(idx) = normalize_index(*i, items.len()) {
                            items[idx] = value;
                        }
                    }
                    (Value::Mapping(map), Value::String(key)) => {
                        map.borrow_mut().insert(key.to_string(), value);
                    }
                    _ => debug!(
                        kind = target.kind_name(),
                        "ignoring STORE_INDEX on unsupported target"
                    ),
                }
            }

            Opcode::UnpackSequence => {
                let count = operand_index(&arg).unwrap_or(0);
                let seq = self.frame_mut().map(|f| f.peek()).unwrap_or_default();
                let items = match &seq {
                    Value::List(items) if items.borrow().len() >= count => {
                        items.borrow()[..count].to_vec()
                    }
                    _ => {
                        if count > MAX_NIL_PADDING {
                            warn!(count, "UNPACK_SEQUENCE count too large, truncating nil fill");
                        }
                        vec![Value::Nil; count.min(MAX_NIL_PADDING)]
                    }
                };
                for item in items.into_iter().rev() {
                    self.push(item);
                }
            }

            Opcode::CheckLen | Opcode::CheckLenMin => {
                let expected = operand_index(&arg).unwrap_or(0);
                let seq = self.frame_mut().map(|f| f.peek()).unwrap_or_default();
                let ok = match seq.len() {
                    Some(len) if opcode == Opcode::CheckLen => len == expected,
                    Some(len) => len >= expected,
                    None => false,
                };
                self.push(Value::Boolean(ok));
            }

            Opcode::Snapshot => {
                if let Some(frame) = self.frame_mut() {
                    let depth = frame.depth();
                    frame.snapshots.push(depth);
                }
            }

            Opcode::Restore => {
                if let Some(frame) = self.frame_mut() {
                    if let Some(depth) = frame.snapshots.pop() {
                        frame.stack.truncate(depth);
                    }
                }
            }

            Opcode::DiscardSnapshot => {
                if let Some(frame) = self.frame_mut() {
                    frame.snapshots.pop();
                }
            }

            Opcode::Slice => {
                let end = self.pop();
                let start = self.pop();
                let target = self.pop();
                self.push(slice(&target, &start, &end));
            }

            Opcode::Len => {
                let target = self.pop();
                let len = target.len().map_or(Value::Nil, Value::from);
                self.push(len);
            }

            _ => unreachable!("Not an array opcode: {:?}", opcode),
        }
        OpcodeResult::Continue
    }
}

fn load_index(target: &Value, index: &Value) -> Value {
    match (target, index) {
        (Value::List(items), Value::Integer(i)) => {
            let items = items.borrow();
            normalize_index(*i, items.len())
                .map(|idx| items[idx].clone())
                .unwrap_or_default()
        }
        (Value::String(s), Value::Integer(i)) => {
            let len = s.chars().count();
            normalize_index(*i, len)
                .and_then(|idx| s.chars().nth(idx))
                .map(|c| Value::string(c.to_string()))
                .unwrap_or_default()
        }
        (Value::Mapping(map), Value::String(key)) => {
            map.borrow().get(&**key).cloned().unwrap_or_default()
        }
        _ => Value::Nil,
    }
}

fn slice(target: &Value, start: &Value, end: &Value) -> Value {
    match target {
        Value::String(s) => {
            let chars: Vec<char> = s.chars().collect();
            match slice_bounds(start, end, chars.len()) {
                Some((a, b)) => Value::string(chars[a..b].iter().collect::<String>()),
                None => Value::Nil,
            }
        }
        Value::List(items) => {
            let items = items.borrow();
            match slice_bounds(start, end, items.len()) {
                Some((a, b)) => Value::list(items[a..b].to_vec()),
                None => Value::Nil,
            }
        }
        _ => Value::Nil,
    }
}
