use crate::bytecode::Opcode;
use crate::vm::interpreter::execution::OpcodeResult;
use crate::vm::interpreter::Interpreter;
use crate::vm::value::Value;

impl Interpreter {
    pub(in crate::vm::interpreter) fn exec_variable_ops(
        &mut self,
        opcode: Opcode,
        arg: Value,
    ) -> OpcodeResult {
        let Some(name) = arg.as_str() else {
            // Malformed name operand: loads produce Nil, stores drop the value
            match opcode {
                Opcode::LoadVar | Opcode::LoadLocal => self.push(Value::Nil),
                _ => {
                    self.pop();
                }
            }
            return OpcodeResult::Continue;
        };

        match opcode {
            Opcode::LoadVar => {
                let local = self.frame_mut().and_then(|f| f.locals.get(name).cloned());
                let value = local
                    .or_else(|| self.globals.get(name).cloned())
                    .unwrap_or_default();
                self.push(value);
            }
            Opcode::StoreVar => {
                let value = self.pop();
                match self.frames.top_mut() {
                    Some(frame) if frame.is_module() => {
                        frame.locals.insert(name.to_string(), value);
                    }
                    _ => {
                        self.globals.insert(name.to_string(), value);
                    }
                }
            }
            Opcode::LoadLocal => {
                let value = self
                    .frame_mut()
                    .and_then(|f| f.locals.get(name).cloned())
                    .unwrap_or_default();
                self.push(value);
            }
            Opcode::StoreLocal => {
                let value = self.pop();
                if let Some(frame) = self.frame_mut() {
                    frame.locals.insert(name.to_string(), value);
                }
            }
            _ => unreachable!("Not a variable opcode: {:?}", opcode),
        }
        OpcodeResult::Continue
    }
}
