//! Integration tests for closures and captured cells

mod common;

use common::{eval, make_closure};
use morph_engine::vm::{Mapping, Value};
use morph_engine::{CodeBuilder, CodeObject, Opcode};
use std::rc::Rc;

/// `pembuat()` returns a counter closure over its own `n` cell
fn counter_factory() -> CodeObject {
    let mut inc = CodeBuilder::new("tambah");
    inc.free_vars(&["n"])
        .emit(Opcode::LoadDeref, "n")
        .emit(Opcode::PushConst, 1)
        .op(Opcode::Add)
        .emit(Opcode::StoreDeref, "n")
        .emit(Opcode::LoadDeref, "n")
        .op(Opcode::Ret);

    let mut factory = CodeBuilder::new("pembuat");
    factory
        .cell_vars(&["n"])
        .emit(Opcode::PushConst, 0)
        .emit(Opcode::StoreDeref, "n");
    make_closure(&mut factory, inc.finish());
    factory.op(Opcode::Ret);
    factory.finish()
}

#[test]
fn test_closure_writes_through_cell() {
    let mut b = CodeBuilder::new("main");
    make_closure(&mut b, counter_factory());
    b.emit(Opcode::Call, 0)
        .emit(Opcode::StoreLocal, "f")
        .emit(Opcode::LoadLocal, "f")
        .emit(Opcode::Call, 0)
        .op(Opcode::Pop)
        .emit(Opcode::LoadLocal, "f")
        .emit(Opcode::Call, 0)
        .op(Opcode::Ret);
    assert_eq!(eval(b.finish()), Value::Integer(2));
}

#[test]
fn test_each_instantiation_gets_fresh_cells() {
    let mut b = CodeBuilder::new("main");
    make_closure(&mut b, counter_factory());
    b.emit(Opcode::StoreLocal, "pembuat");
    for name in ["f", "g"] {
        b.emit(Opcode::LoadLocal, "pembuat")
            .emit(Opcode::Call, 0)
            .emit(Opcode::StoreLocal, name);
    }
    b.emit(Opcode::LoadLocal, "f")
        .emit(Opcode::Call, 0)
        .op(Opcode::Pop)
        .emit(Opcode::LoadLocal, "f")
        .emit(Opcode::Call, 0)
        .emit(Opcode::LoadLocal, "g")
        .emit(Opcode::Call, 0)
        .emit(Opcode::BuildList, 2)
        .op(Opcode::Ret);
    assert_eq!(eval(b.finish()).to_string(), "[2, 1]");
}

#[test]
fn test_outer_write_visible_to_closure() {
    let mut reader = CodeBuilder::new("baca");
    reader.free_vars(&["x"]).emit(Opcode::LoadDeref, "x").op(Opcode::Ret);

    let mut b = CodeBuilder::new("main");
    b.emit(Opcode::PushConst, 1).emit(Opcode::StoreDeref, "x");
    make_closure(&mut b, reader.finish());
    b.emit(Opcode::StoreLocal, "baca")
        .emit(Opcode::PushConst, 5)
        .emit(Opcode::StoreDeref, "x")
        .emit(Opcode::LoadLocal, "baca")
        .emit(Opcode::Call, 0)
        .op(Opcode::Ret);
    assert_eq!(eval(b.finish()), Value::Integer(5));
}

#[test]
fn test_make_function_with_explicit_cells() {
    let mut reader = CodeBuilder::new("baca");
    reader
        .free_vars(&["x", "y"])
        .emit(Opcode::LoadDeref, "x")
        .emit(Opcode::LoadDeref, "y")
        .op(Opcode::Add)
        .op(Opcode::Ret);

    let mut b = CodeBuilder::new("main");
    b.emit(Opcode::PushConst, 10)
        .emit(Opcode::StoreDeref, "x")
        .emit(Opcode::LoadClosure, "x")
        .emit(Opcode::PushConst, 4)
        .emit(Opcode::BuildList, 2)
        .emit(Opcode::PushConst, Value::Code(Rc::new(reader.finish())))
        .op(Opcode::MakeFunction)
        .emit(Opcode::Call, 0)
        .op(Opcode::Ret);
    assert_eq!(eval(b.finish()), Value::Integer(14));
}

#[test]
fn test_build_function_from_descriptor() {
    let pair = |op: Opcode, arg: Value| Value::list(vec![Value::Integer(op.to_u8() as i64), arg]);

    let mut desc = Mapping::default();
    desc.insert("nama".to_string(), Value::string("dua_kali"));
    desc.insert("args".to_string(), Value::list(vec![Value::string("x")]));
    desc.insert(
        "instruksi".to_string(),
        Value::list(vec![
            pair(Opcode::LoadVar, Value::string("x")),
            pair(Opcode::PushConst, Value::Integer(2)),
            pair(Opcode::Mul, Value::Nil),
            pair(Opcode::Ret, Value::Nil),
        ]),
    );

    let mut b = CodeBuilder::new("main");
    b.emit(Opcode::PushConst, Value::mapping(desc))
        .op(Opcode::BuildFunction)
        .op(Opcode::MakeClosure)
        .emit(Opcode::PushConst, 21)
        .emit(Opcode::Call, 1)
        .op(Opcode::Ret);
    assert_eq!(eval(b.finish()), Value::Integer(42));
}

#[test]
fn test_calling_raw_code_object_pushes_nil() {
    let mut body = CodeBuilder::new("mentah");
    body.emit(Opcode::PushConst, 1).op(Opcode::Ret);

    let mut b = CodeBuilder::new("main");
    b.emit(Opcode::PushConst, Value::Code(Rc::new(body.finish())))
        .emit(Opcode::Call, 0)
        .op(Opcode::Ret);
    assert!(eval(b.finish()).is_nil());
}
