use crate::bytecode::Opcode;
use crate::vm::interpreter::core::operand_index;
use crate::vm::interpreter::execution::OpcodeResult;
use crate::vm::interpreter::Interpreter;
use crate::vm::stack::ExceptionHandler;
use crate::vm::value::Value;
use tracing::warn;

impl Interpreter {
    pub(in crate::vm::interpreter) fn exec_exception_ops(
        &mut self,
        opcode: Opcode,
        arg: Value,
    ) -> OpcodeResult {
        match opcode {
            Opcode::PushTry => {
                let Some(handler_ip) = operand_index(&arg) else {
                    warn!(arg = %arg.repr(), "invalid handler offset, ignoring PUSH_TRY");
                    return OpcodeResult::Continue;
                };
                if let Some(frame) = self.frame_mut() {
                    let stack_depth = frame.depth();
                    frame.handlers.push(ExceptionHandler {
                        handler_ip,
                        stack_depth,
                    });
                }
                OpcodeResult::Continue
            }
            Opcode::PopTry => {
                if let Some(frame) = self.frame_mut() {
                    frame.handlers.pop();
                }
                OpcodeResult::Continue
            }
            Opcode::Throw => OpcodeResult::Throw(self.pop()),
            _ => unreachable!("Not an exception opcode: {:?}", opcode),
        }
    }
}
