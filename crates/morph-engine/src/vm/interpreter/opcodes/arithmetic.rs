use crate::bytecode::Opcode;
use crate::vm::interpreter::execution::OpcodeResult;
use crate::vm::interpreter::Interpreter;
use crate::vm::value::Value;

impl Interpreter {
    pub(in crate::vm::interpreter) fn exec_arithmetic_ops(
        &mut self,
        opcode: Opcode,
    ) -> OpcodeResult {
        let result = match opcode {
            Opcode::Neg => negate(&self.pop()),
            Opcode::BitNot => match self.pop() {
                Value::Integer(i) => Value::Integer(!i),
                _ => Value::Nil,
            },
            Opcode::Add
            | Opcode::Sub
            | Opcode::Mul
            | Opcode::Div
            | Opcode::Mod
            | Opcode::BitAnd
            | Opcode::BitOr
            | Opcode::BitXor
            | Opcode::Lshift
            | Opcode::Rshift => {
                let b = self.pop();
                let a = self.pop();
                binary_op(opcode, &a, &b)
            }
            _ => unreachable!("Not an arithmetic opcode: {:?}", opcode),
        };
        self.push(result);
        OpcodeResult::Continue
    }
}

/// Apply a two-operand arithmetic or bit opcode
///
/// Integers wrap on overflow. Any float operand promotes to float. Division
/// always produces a float. Mismatched operands and zero divisors yield Nil.
pub(in crate::vm::interpreter) fn binary_op(opcode: Opcode, a: &Value, b: &Value) -> Value {
    if let (Value::Integer(x), Value::Integer(y)) = (a, b) {
        let (x, y) = (*x, *y);
        return match opcode {
            Opcode::Add => Value::Integer(x.wrapping_add(y)),
            Opcode::Sub => Value::Integer(x.wrapping_sub(y)),
            Opcode::Mul => Value::Integer(x.wrapping_mul(y)),
            Opcode::Div if y == 0 => Value::Nil,
            Opcode::Div => Value::Float(x as f64 / y as f64),
            Opcode::Mod if y == 0 => Value::Nil,
            Opcode::Mod => Value::Integer(x.wrapping_rem(y)),
            Opcode::BitAnd => Value::Integer(x & y),
            Opcode::BitOr => Value::Integer(x | y),
            Opcode::BitXor => Value::Integer(x ^ y),
            Opcode::Lshift => {
                shift_amount(y).map_or(Value::Nil, |s| Value::Integer(x.wrapping_shl(s)))
            }
            Opcode::Rshift => shift_amount(y).map_or(Value::Nil, |s| Value::Integer(x >> s)),
            _ => Value::Nil,
        };
    }

    if let (Opcode::Add, Value::String(x), Value::String(y)) = (opcode, a, b) {
        let mut joined = String::with_capacity(x.len() + y.len());
        joined.push_str(x);
        joined.push_str(y);
        return Value::string(joined);
    }

    let (Some(x), Some(y)) = (a.as_number(), b.as_number()) else {
        return Value::Nil;
    };
    match opcode {
        Opcode::Add => Value::Float(x + y),
        Opcode::Sub => Value::Float(x - y),
        Opcode::Mul => Value::Float(x * y),
        Opcode::Div | Opcode::Mod if y == 0.0 => Value::Nil,
        Opcode::Div => Value::Float(x / y),
        Opcode::Mod => Value::Float(x % y),
        _ => Value::Nil,
    }
}

fn shift_amount(y: i64) -> Option<u32> {
    (0..64).contains(&y).then_some(y as u32)
}

fn negate(value: &Value) -> Value {
    match value {
        Value::Integer(i) => Value::Integer(i.wrapping_neg()),
        Value::Float(f) => Value::Float(-f),
        _ => Value::Nil,
    }
}
