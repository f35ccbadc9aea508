use crate::bytecode::Opcode;
use crate::vm::builtins::string as text;
use crate::vm::interpreter::core::operand_index;
use crate::vm::interpreter::execution::OpcodeResult;
use crate::vm::interpreter::Interpreter;
use crate::vm::value::Value;

impl Interpreter {
    pub(in crate::vm::interpreter) fn exec_string_ops(
        &mut self,
        opcode: Opcode,
        arg: Value,
    ) -> OpcodeResult {
        match opcode {
            Opcode::Print => {
                let count = operand_index(&arg).unwrap_or(0);
                let values = self.pop_args(count);
                let line = text::join_display(&values, " ");
                self.write_output(&line);
                self.write_output("\n");
            }
            Opcode::Str => {
                let value = self.pop();
                self.push(Value::string(value.to_string()));
            }
            Opcode::StrLower => {
                let value = self.pop();
                self.push(text::lower(&value));
            }
            Opcode::StrUpper => {
                let value = self.pop();
                self.push(text::upper(&value));
            }
            Opcode::StrFind => {
                let needle = self.pop();
                let haystack = self.pop();
                self.push(text::find(&haystack, &needle));
            }
            Opcode::StrReplace => {
                let new = self.pop();
                let old = self.pop();
                let haystack = self.pop();
                self.push(text::replace(&haystack, &old, &new));
            }
            _ => unreachable!("Not a string opcode: {:?}", opcode),
        }
        OpcodeResult::Continue
    }
}
