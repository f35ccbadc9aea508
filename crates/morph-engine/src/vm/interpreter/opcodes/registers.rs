use super::arithmetic::binary_op;
use crate::bytecode::Opcode;
use crate::vm::interpreter::core::operand_index;
use crate::vm::interpreter::execution::OpcodeResult;
use crate::vm::interpreter::Interpreter;
use crate::vm::value::Value;

/// Register operands: a single index, or a list `[dest, src...]`
fn register_operands(arg: &Value) -> Vec<Value> {
    match arg {
        Value::List(items) => items.borrow().clone(),
        other => vec![other.clone()],
    }
}

fn reg(operands: &[Value], i: usize) -> Option<usize> {
    operands.get(i).and_then(operand_index)
}

impl Interpreter {
    pub(in crate::vm::interpreter) fn exec_register_ops(
        &mut self,
        opcode: Opcode,
        arg: Value,
    ) -> OpcodeResult {
        let ops = register_operands(&arg);
        match opcode {
            Opcode::LoadReg => {
                if let Some(dest) = reg(&ops, 0) {
                    let value = ops.get(1).cloned().unwrap_or_default();
                    self.registers.set(dest, value);
                }
            }
            Opcode::MoveReg => {
                if let (Some(dest), Some(src)) = (reg(&ops, 0), reg(&ops, 1)) {
                    let value = self.registers.get(src);
                    self.registers.set(dest, value);
                }
            }
            Opcode::AddReg => {
                if let (Some(dest), Some(a), Some(b)) = (reg(&ops, 0), reg(&ops, 1), reg(&ops, 2)) {
                    let sum =
                        binary_op(Opcode::Add, &self.registers.get(a), &self.registers.get(b));
                    self.registers.set(dest, sum);
                }
            }
            Opcode::PushFromReg => {
                let value = reg(&ops, 0)
                    .map(|i| self.registers.get(i))
                    .unwrap_or_default();
                self.push(value);
            }
            Opcode::PopToReg => {
                let value = self.pop();
                if let Some(dest) = reg(&ops, 0) {
                    self.registers.set(dest, value);
                }
            }
            _ => unreachable!("Not a register opcode: {:?}", opcode),
        }
        OpcodeResult::Continue
    }
}
