use crate::bytecode::Opcode;
use crate::vm::interpreter::execution::OpcodeResult;
use crate::vm::interpreter::Interpreter;
use crate::vm::object::{BoundMethod, Class};
use crate::vm::value::Value;
use rustc_hash::FxHashMap;
use std::rc::Rc;
use tracing::debug;

impl Interpreter {
    pub(in crate::vm::interpreter) fn exec_object_ops(
        &mut self,
        opcode: Opcode,
        arg: Value,
    ) -> OpcodeResult {
        match opcode {
            Opcode::BuildClass => {
                let methods = self.pop();
                let superclass = if arg.is_truthy() {
                    match self.pop() {
                        Value::Class(class) => Some(class),
                        other => {
                            debug!(kind = other.kind_name(), "superclass is not a class, ignoring");
                            None
                        }
                    }
                } else {
                    None
                };
                let name = self.pop().to_string();

                let mut table = FxHashMap::default();
                if let Value::Mapping(map) = &methods {
                    for (key, method) in map.borrow().iter() {
                        table.insert(key.clone(), method.clone());
                    }
                }
                self.push(Value::Class(Rc::new(Class::new(name, superclass, table))));
            }

            Opcode::LoadAttr => {
                let obj = self.pop();
                let value = match arg.as_str() {
                    Some(name) => load_attr(&obj, name),
                    None => Value::Nil,
                };
                self.push(value);
            }

            Opcode::StoreAttr => {
                let value = self.pop();
                let obj = self.pop();
                let Some(name) = arg.as_str() else {
                    return OpcodeResult::Continue;
                };
                match &obj {
                    Value::Instance(instance) => instance.set(name, value),
                    Value::Mapping(map) => {
                        map.borrow_mut().insert(name.to_string(), value);
                    }
                    Value::Class(class) => {
                        class.methods.borrow_mut().insert(name.to_string(), value);
                    }
                    other => debug!(kind = other.kind_name(), attr = name, "ignoring STORE_ATTR"),
                }
            }

            Opcode::IsInstance => {
                let obj = self.pop();
                let result = arg.as_str().is_some_and(|name| is_instance(&obj, name));
                self.push(Value::Boolean(result));
            }

            Opcode::LoadSuperMethod => {
                let class = self.pop();
                let receiver = self.pop();
                let method = match (&class, arg.as_str()) {
                    (Value::Class(class), Some(name)) => class
                        .superclass
                        .as_ref()
                        .and_then(|sup| sup.find_method(name)),
                    _ => None,
                };
                let value = match method {
                    Some(method) => Value::BoundMethod(Rc::new(BoundMethod::new(receiver, method))),
                    None => Value::Nil,
                };
                self.push(value);
            }

            _ => unreachable!("Not an object opcode: {:?}", opcode),
        }
        OpcodeResult::Continue
    }
}

/// Attribute lookup
///
/// Instances check their own properties first, then class methods, which
/// come back bound to the instance. Classes expose their methods unbound and
/// mappings expose their keys.
fn load_attr(obj: &Value, name: &str) -> Value {
    match obj {
        Value::Instance(instance) => {
            if let Some(value) = instance.get(name) {
                return value;
            }
            match instance.class.find_method(name) {
                Some(method @ (Value::Function(_) | Value::Native(_))) => {
                    Value::BoundMethod(Rc::new(BoundMethod::new(obj.clone(), method)))
                }
                Some(other) => other,
                None => Value::Nil,
            }
        }
        Value::Class(class) => class.find_method(name).unwrap_or_default(),
        Value::Mapping(map) => map.borrow().get(name).cloned().unwrap_or_default(),
        _ => Value::Nil,
    }
}

/// Builtin type-name check, or class-chain membership for instances
fn is_instance(obj: &Value, name: &str) -> bool {
    match (name, obj) {
        ("Daftar", Value::List(_))
        | ("Kamus", Value::Mapping(_))
        | ("Teks", Value::String(_))
        | ("Angka", Value::Integer(_) | Value::Float(_))
        | ("Boolean", Value::Boolean(_))
        | ("Nil", Value::Nil) => true,
        (_, Value::Instance(instance)) => instance.class.is_named(name),
        _ => false,
    }
}
