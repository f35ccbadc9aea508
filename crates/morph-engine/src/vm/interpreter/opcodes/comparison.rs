use crate::bytecode::Opcode;
use crate::vm::interpreter::execution::OpcodeResult;
use crate::vm::interpreter::Interpreter;
use crate::vm::value::Value;

impl Interpreter {
    pub(in crate::vm::interpreter) fn exec_comparison_ops(
        &mut self,
        opcode: Opcode,
    ) -> OpcodeResult {
        if opcode == Opcode::Not {
            let a = self.pop();
            self.push(Value::Boolean(!a.is_truthy()));
            return OpcodeResult::Continue;
        }

        let b = self.pop();
        let a = self.pop();
        let result = match opcode {
            Opcode::Eq => Value::Boolean(a.loose_eq(&b)),
            Opcode::Neq => Value::Boolean(!a.loose_eq(&b)),
            Opcode::Lt => Value::Boolean(a.less_than(&b)),
            Opcode::Gt => Value::Boolean(b.less_than(&a)),
            Opcode::Gte => Value::Boolean(!a.less_than(&b)),
            Opcode::Lte => Value::Boolean(!b.less_than(&a)),
            // Both operands were evaluated before this instruction; these
            // only select which one survives.
            Opcode::And => {
                if a.is_truthy() {
                    b
                } else {
                    a
                }
            }
            Opcode::Or => {
                if a.is_truthy() {
                    a
                } else {
                    b
                }
            }
            _ => unreachable!("Not a comparison opcode: {:?}", opcode),
        };
        self.push(result);
        OpcodeResult::Continue
    }
}
