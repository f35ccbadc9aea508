use crate::bytecode::Opcode;
use crate::vm::interpreter::core::operand_index;
use crate::vm::interpreter::execution::OpcodeResult;
use crate::vm::interpreter::Interpreter;
use crate::vm::value::Value;
use tracing::warn;

impl Interpreter {
    pub(in crate::vm::interpreter) fn exec_control_flow_ops(
        &mut self,
        opcode: Opcode,
        arg: Value,
    ) -> OpcodeResult {
        let take = match opcode {
            Opcode::Jmp => true,
            // Conditional jumps always consume the tested value
            Opcode::JmpIfFalse => !self.pop().is_truthy(),
            Opcode::JmpIfTrue => self.pop().is_truthy(),
            _ => unreachable!("Not a control flow opcode: {:?}", opcode),
        };
        if !take {
            return OpcodeResult::Continue;
        }

        match (operand_index(&arg), self.frame_mut()) {
            (Some(target), Some(frame)) => frame.ip = target,
            (None, _) => {
                warn!(op = opcode.name(), arg = %arg.repr(), "invalid jump target, ignoring")
            }
            (_, None) => {}
        }
        OpcodeResult::Continue
    }
}
