//! Integration tests for the bytecode interpreter
//!
//! Tests cover:
//! - Arithmetic and degraded operands
//! - Locals, globals and loops
//! - Function calls and argument binding
//! - Output, unknown opcodes and the instruction budget

mod common;

use common::{call_global, eval, make_closure, run, vm_with_options};
use morph_engine::vm::{Value, VmError};
use morph_engine::{CodeBuilder, ExecutionResult, Opcode, VmOptions};

#[test]
fn test_simple_arithmetic() {
    let mut b = CodeBuilder::new("main");
    b.emit(Opcode::PushConst, 10)
        .emit(Opcode::PushConst, 20)
        .op(Opcode::Add)
        .op(Opcode::Ret);
    assert_eq!(eval(b.finish()), Value::Integer(30));
}

#[test]
fn test_mixed_arithmetic_promotes_to_float() {
    let mut b = CodeBuilder::new("main");
    b.emit(Opcode::PushConst, 7)
        .emit(Opcode::PushConst, 2)
        .op(Opcode::Div)
        .emit(Opcode::PushConst, 0.5)
        .op(Opcode::Add)
        .op(Opcode::Ret);
    assert_eq!(eval(b.finish()), Value::Float(4.0));
}

#[test]
fn test_division_by_zero_continues_with_nil() {
    let mut b = CodeBuilder::new("main");
    b.emit(Opcode::PushConst, 1)
        .emit(Opcode::PushConst, 0)
        .op(Opcode::Div)
        .emit(Opcode::StoreLocal, "hasil")
        .emit(Opcode::PushConst, 9)
        .emit(Opcode::PushConst, 0)
        .op(Opcode::Mod)
        .emit(Opcode::LoadLocal, "hasil")
        .emit(Opcode::BuildList, 2)
        .op(Opcode::Ret);
    assert_eq!(eval(b.finish()).to_string(), "[nil, nil]");
}

#[test]
fn test_type_mismatch_degrades() {
    let mut b = CodeBuilder::new("main");
    b.emit(Opcode::PushConst, "a")
        .emit(Opcode::PushConst, 1)
        .op(Opcode::Sub)
        .op(Opcode::Ret);
    assert!(eval(b.finish()).is_nil());
}

#[test]
fn test_string_concatenation() {
    let mut b = CodeBuilder::new("main");
    b.emit(Opcode::PushConst, "halo ")
        .emit(Opcode::PushConst, "dunia")
        .op(Opcode::Add)
        .op(Opcode::Ret);
    assert_eq!(eval(b.finish()), Value::string("halo dunia"));
}

#[test]
fn test_build_list_preserves_order() {
    let mut b = CodeBuilder::new("main");
    for i in 1..=4 {
        b.emit(Opcode::PushConst, i);
    }
    b.emit(Opcode::BuildList, 4).op(Opcode::Ret);
    assert_eq!(eval(b.finish()).to_string(), "[1, 2, 3, 4]");
}

#[test]
fn test_build_dict_and_index() {
    let mut b = CodeBuilder::new("main");
    b.emit(Opcode::PushConst, "nama")
        .emit(Opcode::PushConst, "morph")
        .emit(Opcode::PushConst, "versi")
        .emit(Opcode::PushConst, 1)
        .emit(Opcode::BuildDict, 2)
        .op(Opcode::Dup)
        .emit(Opcode::PushConst, "versi")
        .emit(Opcode::PushConst, 2)
        .op(Opcode::StoreIndex)
        .emit(Opcode::PushConst, "versi")
        .op(Opcode::LoadIndex)
        .op(Opcode::Ret);
    assert_eq!(eval(b.finish()), Value::Integer(2));
}

#[test]
fn test_loop_sums_range() {
    let mut b = CodeBuilder::new("main");
    b.emit(Opcode::PushConst, 0)
        .emit(Opcode::StoreLocal, "jumlah")
        .emit(Opcode::PushConst, 1)
        .emit(Opcode::StoreLocal, "i");

    let top = b.position();
    b.emit(Opcode::LoadLocal, "i")
        .emit(Opcode::PushConst, 5)
        .op(Opcode::Lte);
    let exit = b.emit_jump(Opcode::JmpIfFalse);
    b.emit(Opcode::LoadLocal, "jumlah")
        .emit(Opcode::LoadLocal, "i")
        .op(Opcode::Add)
        .emit(Opcode::StoreLocal, "jumlah")
        .emit(Opcode::LoadLocal, "i")
        .emit(Opcode::PushConst, 1)
        .op(Opcode::Add)
        .emit(Opcode::StoreLocal, "i")
        .emit(Opcode::Jmp, top);
    b.patch_jump(exit);
    b.emit(Opcode::LoadLocal, "jumlah").op(Opcode::Ret);

    assert_eq!(eval(b.finish()), Value::Integer(15));
}

#[test]
fn test_function_call() {
    let mut body = CodeBuilder::new("tambah");
    body.params(&["a", "b"])
        .emit(Opcode::LoadVar, "a")
        .emit(Opcode::LoadVar, "b")
        .op(Opcode::Add)
        .op(Opcode::Ret);

    let mut b = CodeBuilder::new("main");
    make_closure(&mut b, body.finish());
    b.emit(Opcode::PushConst, 2)
        .emit(Opcode::PushConst, 3)
        .emit(Opcode::Call, 2)
        .op(Opcode::Ret);
    assert_eq!(eval(b.finish()), Value::Integer(5));
}

#[test]
fn test_missing_arguments_bind_nil() {
    let mut body = CodeBuilder::new("kedua");
    body.params(&["a", "b"]).emit(Opcode::LoadVar, "b").op(Opcode::Ret);

    let mut b = CodeBuilder::new("main");
    make_closure(&mut b, body.finish());
    b.emit(Opcode::PushConst, 1)
        .emit(Opcode::Call, 1)
        .op(Opcode::Ret);
    assert!(eval(b.finish()).is_nil());
}

#[test]
fn test_function_without_ret_returns_nil() {
    let mut body = CodeBuilder::new("kosong");
    body.emit(Opcode::PushConst, 42);

    let mut b = CodeBuilder::new("main");
    make_closure(&mut b, body.finish());
    b.emit(Opcode::Call, 0).op(Opcode::Ret);
    assert!(eval(b.finish()).is_nil());
}

#[test]
fn test_store_var_in_function_writes_global() {
    let mut body = CodeBuilder::new("atur");
    body.emit(Opcode::PushConst, 7)
        .emit(Opcode::StoreVar, "hitung")
        .op(Opcode::Ret);

    let mut b = CodeBuilder::new("main");
    make_closure(&mut b, body.finish());
    b.emit(Opcode::Call, 0)
        .op(Opcode::Pop)
        .emit(Opcode::LoadVar, "hitung")
        .op(Opcode::Ret);
    assert_eq!(eval(b.finish()), Value::Integer(7));
}

#[test]
fn test_print_writes_space_separated_line() {
    let mut b = CodeBuilder::new("main");
    b.emit(Opcode::PushConst, "nilai")
        .emit(Opcode::PushConst, 1.5)
        .emit(Opcode::PushConst, true)
        .emit(Opcode::Print, 3)
        .op(Opcode::Halt);
    let (result, out) = run(b.finish());
    assert!(result.is_completed());
    assert_eq!(out, "nilai 1.5 benar\n");
}

#[test]
fn test_logical_operators_evaluate_both_sides() {
    let mut b = CodeBuilder::new("main");
    // salah and tulis(..): the falsy left operand survives
    b.emit(Opcode::PushConst, false);
    call_global(&mut b, "tulis", vec![Value::string("kanan")]);
    b.op(Opcode::And);
    // 7 or tulis(..): the truthy left operand survives
    b.emit(Opcode::PushConst, 7);
    call_global(&mut b, "tulis", vec![Value::string("lagi")]);
    b.op(Opcode::Or);
    // truthy and / falsy or select the right operand
    b.emit(Opcode::PushConst, 1)
        .emit(Opcode::PushConst, "x")
        .op(Opcode::And)
        .emit(Opcode::PushConst, 0)
        .emit(Opcode::PushConst, "y")
        .op(Opcode::Or)
        .emit(Opcode::BuildList, 4)
        .op(Opcode::Ret);

    let (result, out) = run(b.finish());
    assert_eq!(out, "kanan\nlagi\n");
    assert_eq!(
        result.value().map(ToString::to_string).as_deref(),
        Some("[salah, 7, \"x\", \"y\"]")
    );
}

#[test]
fn test_unknown_opcode_is_skipped() {
    let mut b = CodeBuilder::new("main");
    b.emit_raw(200, Value::Nil)
        .emit(Opcode::PushConst, 7)
        .op(Opcode::Ret);
    assert_eq!(eval(b.finish()), Value::Integer(7));
}

#[test]
fn test_halt_stops_execution() {
    let mut b = CodeBuilder::new("main");
    b.op(Opcode::Halt).emit(Opcode::PushConst, "tidak").emit(Opcode::Print, 1);
    let (result, out) = run(b.finish());
    assert!(result.is_completed());
    assert!(out.is_empty());
}

#[test]
fn test_instruction_budget() {
    let mut b = CodeBuilder::new("main");
    b.emit(Opcode::Jmp, 0);

    let (mut vm, _) = vm_with_options(VmOptions::default().with_max_instructions(100));
    let result = vm.execute_code(b.finish());
    assert!(matches!(result, ExecutionResult::Failed(VmError::InstructionLimit(100))));
    assert_eq!(vm.interpreter().instruction_count(), 100);
    assert!(vm.interpreter().call_stack().is_empty());
}

#[test]
fn test_registers() {
    let mut b = CodeBuilder::new("main");
    b.emit(Opcode::LoadReg, Value::list(vec![Value::Integer(0), Value::Integer(4)]))
        .emit(Opcode::PushConst, 6)
        .emit(Opcode::PopToReg, 1)
        .emit(
            Opcode::AddReg,
            Value::list(vec![Value::Integer(2), Value::Integer(0), Value::Integer(1)]),
        )
        .emit(Opcode::PushFromReg, 2)
        .emit(Opcode::PushFromReg, 99)
        .emit(Opcode::BuildList, 2)
        .op(Opcode::Ret);
    assert_eq!(eval(b.finish()).to_string(), "[10, nil]");
}

#[test]
fn test_unpack_and_check_len() {
    let mut b = CodeBuilder::new("main");
    b.emit(Opcode::PushConst, "a")
        .emit(Opcode::PushConst, "b")
        .emit(Opcode::BuildList, 2)
        .emit(Opcode::CheckLen, 2)
        .emit(Opcode::StoreLocal, "cocok")
        .emit(Opcode::UnpackSequence, 2)
        .emit(Opcode::StoreLocal, "x")
        .emit(Opcode::StoreLocal, "y")
        .op(Opcode::Pop)
        .emit(Opcode::LoadLocal, "x")
        .emit(Opcode::LoadLocal, "y")
        .emit(Opcode::LoadLocal, "cocok")
        .emit(Opcode::BuildList, 3)
        .op(Opcode::Ret);
    assert_eq!(eval(b.finish()).to_string(), "[\"a\", \"b\", benar]");
}

#[test]
fn test_snapshot_restore() {
    let mut b = CodeBuilder::new("main");
    b.emit(Opcode::PushConst, 1)
        .op(Opcode::Snapshot)
        .emit(Opcode::PushConst, 2)
        .emit(Opcode::PushConst, 3)
        .op(Opcode::Restore)
        .op(Opcode::Ret);
    assert_eq!(eval(b.finish()), Value::Integer(1));
}

#[test]
fn test_string_opcodes() {
    let mut b = CodeBuilder::new("main");
    b.emit(Opcode::PushConst, "Halo Dunia")
        .op(Opcode::StrUpper)
        .emit(Opcode::PushConst, "DUNIA")
        .op(Opcode::StrFind)
        .emit(Opcode::PushConst, "a-b")
        .emit(Opcode::PushConst, "-")
        .emit(Opcode::PushConst, "+")
        .op(Opcode::StrReplace)
        .emit(Opcode::PushConst, "morph")
        .emit(Opcode::PushConst, 1)
        .emit(Opcode::PushConst, 3)
        .op(Opcode::Slice)
        .emit(Opcode::BuildList, 3)
        .op(Opcode::Ret);
    assert_eq!(eval(b.finish()).to_string(), "[5, \"a+b\", \"or\"]");
}

#[test]
fn test_string_ops_on_non_strings_yield_nil() {
    let mut b = CodeBuilder::new("main");
    b.emit(Opcode::PushConst, 5)
        .emit(Opcode::PushConst, "x")
        .op(Opcode::StrFind)
        .emit(Opcode::PushConst, "a-b")
        .emit(Opcode::PushConst, 1)
        .emit(Opcode::PushConst, "+")
        .op(Opcode::StrReplace)
        .emit(Opcode::BuildList, 2)
        .op(Opcode::Ret);
    assert_eq!(eval(b.finish()).to_string(), "[nil, nil]");
}

#[test]
fn test_build_dict_drops_non_string_keys() {
    let mut b = CodeBuilder::new("main");
    b.emit(Opcode::PushConst, 1)
        .emit(Opcode::PushConst, "satu")
        .emit(Opcode::PushConst, "nama")
        .emit(Opcode::PushConst, "morph")
        .emit(Opcode::BuildDict, 2)
        .emit(Opcode::StoreLocal, "d")
        .emit(Opcode::LoadVar, "panjang")
        .emit(Opcode::LoadLocal, "d")
        .emit(Opcode::Call, 1)
        .emit(Opcode::LoadLocal, "d")
        .emit(Opcode::PushConst, "nama")
        .op(Opcode::LoadIndex)
        .emit(Opcode::LoadLocal, "d")
        .emit(Opcode::PushConst, "1")
        .op(Opcode::LoadIndex)
        .emit(Opcode::BuildList, 3)
        .op(Opcode::Ret);
    assert_eq!(eval(b.finish()).to_string(), "[1, \"morph\", nil]");
}

#[test]
fn test_huge_unpack_count_does_not_abort() {
    let mut b = CodeBuilder::new("main");
    b.emit(Opcode::PushConst, Value::list(vec![]))
        .emit(Opcode::UnpackSequence, i64::MAX)
        .emit(Opcode::PushConst, "selesai")
        .op(Opcode::Ret);
    assert_eq!(eval(b.finish()), Value::string("selesai"));
}

#[test]
fn test_huge_build_dict_count_keeps_top_pairs() {
    let mut b = CodeBuilder::new("main");
    b.emit(Opcode::PushConst, "k")
        .emit(Opcode::PushConst, "v")
        .emit(Opcode::BuildDict, i64::MAX)
        .emit(Opcode::LoadAttr, "k")
        .op(Opcode::Ret);
    assert_eq!(eval(b.finish()), Value::string("v"));
}

#[test]
fn test_huge_list_and_call_counts_do_not_abort() {
    let mut b = CodeBuilder::new("main");
    b.emit(Opcode::PushConst, 1)
        .emit(Opcode::BuildList, i64::MAX)
        .emit(Opcode::PushConst, "tidak")
        .emit(Opcode::Call, i64::MAX)
        .emit(Opcode::PushConst, "selesai")
        .emit(Opcode::BuildList, 2)
        .op(Opcode::Ret);
    assert_eq!(eval(b.finish()).to_string(), "[nil, \"selesai\"]");
}
