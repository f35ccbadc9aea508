//! Closure construction and captured-variable access

use crate::bytecode::{CodeObject, Instruction, Opcode};
use crate::vm::interpreter::execution::OpcodeResult;
use crate::vm::interpreter::Interpreter;
use crate::vm::object::{Cell, Function};
use crate::vm::value::{Mapping, Value};
use std::rc::Rc;
use tracing::warn;

/// Descriptor keys read by BUILD_FUNCTION
const KEY_NAME: &str = "nama";
const KEY_ARGS: &str = "args";
const KEY_INSTRUCTIONS: &str = "instruksi";
const KEY_CONSTANTS: &str = "konstanta";
const KEY_FREE_VARS: &str = "free_vars";
const KEY_CELL_VARS: &str = "cell_vars";

impl Interpreter {
    pub(in crate::vm::interpreter) fn exec_closure_ops(
        &mut self,
        opcode: Opcode,
        arg: Value,
    ) -> OpcodeResult {
        match opcode {
            Opcode::LoadDeref => {
                let value = match (arg.as_str(), self.frame_mut()) {
                    (Some(name), Some(frame)) => frame.cells.get(name).map(|c| c.get()),
                    _ => None,
                };
                self.push(value.unwrap_or_default());
            }

            Opcode::StoreDeref => {
                let value = self.pop();
                if let (Some(name), Some(frame)) = (arg.as_str(), self.frame_mut()) {
                    frame.cell(name).set(value);
                }
            }

            Opcode::LoadClosure => {
                let cell = match (arg.as_str(), self.frame_mut()) {
                    (Some(name), Some(frame)) => Value::Cell(frame.cell(name)),
                    _ => Value::Nil,
                };
                self.push(cell);
            }

            Opcode::MakeClosure => {
                let value = match self.pop() {
                    Value::Code(code) => {
                        let closure = match self.frame_mut() {
                            Some(frame) => {
                                code.free_vars.iter().map(|name| frame.cell(name)).collect()
                            }
                            None => Vec::new(),
                        };
                        Value::Function(Rc::new(Function::new(code, closure)))
                    }
                    _ => Value::Nil,
                };
                self.push(value);
            }

            Opcode::MakeFunction => {
                let code = self.pop();
                let cells = self.pop();
                let value = match code {
                    Value::Code(code) => {
                        Value::Function(Rc::new(Function::new(code, cells_from_list(&cells))))
                    }
                    _ => Value::Nil,
                };
                self.push(value);
            }

            Opcode::BuildFunction => {
                let value = match self.pop() {
                    Value::Mapping(desc) => {
                        Value::Code(Rc::new(code_from_descriptor(&desc.borrow())))
                    }
                    other => {
                        warn!(
                            kind = other.kind_name(),
                            "BUILD_FUNCTION expects a descriptor mapping"
                        );
                        Value::Nil
                    }
                };
                self.push(value);
            }

            _ => unreachable!("Not a closure opcode: {:?}", opcode),
        }
        OpcodeResult::Continue
    }
}

/// Closure cells from an explicit list
///
/// Non-cell entries are wrapped in fresh cells so positions still line up
/// with the code's free variables.
fn cells_from_list(list: &Value) -> Vec<Rc<Cell>> {
    match list {
        Value::List(items) => items
            .borrow()
            .iter()
            .map(|item| match item {
                Value::Cell(cell) => cell.clone(),
                other => Rc::new(Cell::new(other.clone())),
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::List(items)) => items
            .borrow()
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

/// Build a code object from a runtime descriptor
///
/// `instruksi` is a list of `[opcode, operand]` pairs. Entries whose opcode
/// is not a byte-sized integer are skipped.
fn code_from_descriptor(desc: &Mapping) -> CodeObject {
    let name = desc
        .get(KEY_NAME)
        .and_then(Value::as_str)
        .unwrap_or("<lambda>")
        .to_string();

    let mut instructions = Vec::new();
    if let Some(Value::List(items)) = desc.get(KEY_INSTRUCTIONS) {
        for (i, item) in items.borrow().iter().enumerate() {
            let pair = match item {
                Value::List(pair) => pair.borrow().clone(),
                _ => Vec::new(),
            };
            let op = pair.first().and_then(Value::as_int).and_then(|op| u8::try_from(op).ok());
            match op {
                Some(op) => instructions.push(Instruction {
                    op,
                    arg: pair.get(1).cloned().unwrap_or_default(),
                }),
                None => warn!(function = %name, index = i, "skipping malformed instruction"),
            }
        }
    }

    let constants = match desc.get(KEY_CONSTANTS) {
        Some(Value::List(items)) => items.borrow().clone(),
        _ => Vec::new(),
    };

    CodeObject {
        arg_names: string_list(desc.get(KEY_ARGS)),
        constants,
        instructions,
        free_vars: string_list(desc.get(KEY_FREE_VARS)),
        cell_vars: string_list(desc.get(KEY_CELL_VARS)),
        name,
    }
}
