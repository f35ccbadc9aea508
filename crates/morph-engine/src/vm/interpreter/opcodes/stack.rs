use crate::bytecode::Opcode;
use crate::vm::interpreter::execution::OpcodeResult;
use crate::vm::interpreter::Interpreter;
use crate::vm::value::Value;

impl Interpreter {
    pub(in crate::vm::interpreter) fn exec_stack_ops(
        &mut self,
        opcode: Opcode,
        arg: Value,
    ) -> OpcodeResult {
        match opcode {
            Opcode::PushConst => self.push(arg),
            Opcode::Pop => {
                self.pop();
            }
            Opcode::Dup => {
                if let Some(frame) = self.frame_mut() {
                    let top = frame.peek();
                    frame.push(top);
                }
            }
            _ => unreachable!("Not a stack opcode: {:?}", opcode),
        }
        OpcodeResult::Continue
    }
}
