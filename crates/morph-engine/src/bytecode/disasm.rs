//! Human-readable listing of code objects

use super::code::CodeObject;
use crate::vm::value::Value;
use std::fmt::Write;

/// Render a code object and every nested code object it references
pub fn disassemble(code: &CodeObject) -> String {
    let mut out = String::new();
    write_code(&mut out, code);
    out
}

fn write_code(out: &mut String, code: &CodeObject) {
    let _ = writeln!(out, "== {} ({}) ==", code.name, code.arg_names.join(", "));
    if !code.free_vars.is_empty() {
        let _ = writeln!(out, "free: {}", code.free_vars.join(", "));
    }
    if !code.cell_vars.is_empty() {
        let _ = writeln!(out, "cells: {}", code.cell_vars.join(", "));
    }
    if !code.constants.is_empty() {
        let _ = writeln!(out, "constants:");
        for (i, constant) in code.constants.iter().enumerate() {
            let _ = writeln!(out, "  {:>4}: {}", i, constant.repr());
        }
    }

    let mut nested = Vec::new();
    for (offset, instr) in code.instructions.iter().enumerate() {
        let name = match instr.opcode() {
            Some(opcode) => opcode.name().to_string(),
            None => format!("??? ({:#04x})", instr.op),
        };
        if matches!(instr.arg, Value::Nil) {
            let _ = writeln!(out, "{:04}  {}", offset, name);
        } else {
            let _ = writeln!(out, "{:04}  {:<18}{}", offset, name, instr.arg.repr());
        }
        if let Value::Code(inner) = &instr.arg {
            nested.push(inner.clone());
        }
    }
    for constant in &code.constants {
        if let Value::Code(inner) = constant {
            nested.push(inner.clone());
        }
    }

    for inner in nested {
        out.push('\n');
        write_code(out, &inner);
    }
}
