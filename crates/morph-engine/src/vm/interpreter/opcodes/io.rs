use crate::bytecode::Opcode;
use crate::vm::builtins::io as file_io;
use crate::vm::interpreter::execution::OpcodeResult;
use crate::vm::interpreter::Interpreter;

impl Interpreter {
    pub(in crate::vm::interpreter) fn exec_io_ops(&mut self, opcode: Opcode) -> OpcodeResult {
        let result = match opcode {
            Opcode::IoOpen => {
                let mode = self.pop();
                let path = self.pop();
                file_io::open(&path, &mode)
            }
            Opcode::IoRead => {
                let size = self.pop();
                let handle = self.pop();
                file_io::read(&handle, &size)
            }
            Opcode::IoWrite => {
                let content = self.pop();
                let handle = self.pop();
                file_io::write(&handle, &content)
            }
            Opcode::IoClose => {
                let handle = self.pop();
                file_io::close(&handle)
            }
            _ => unreachable!("Not an I/O opcode: {:?}", opcode),
        };
        self.push(result);
        OpcodeResult::Continue
    }
}
