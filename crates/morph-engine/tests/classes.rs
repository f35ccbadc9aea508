//! Integration tests for classes, instances and method binding

mod common;

use common::{eval, make_closure};
use morph_engine::vm::Value;
use morph_engine::{CodeBuilder, CodeObject, Opcode};

fn method(name: &str, params: &[&str], body: impl FnOnce(&mut CodeBuilder)) -> CodeObject {
    let mut b = CodeBuilder::new(name);
    b.params(params);
    body(&mut b);
    b.finish()
}

/// Push `name`, optional superclass global, and a method mapping, then BUILD_CLASS
fn build_class(
    b: &mut CodeBuilder,
    name: &str,
    superclass: Option<&str>,
    methods: Vec<(&str, CodeObject)>,
) {
    b.emit(Opcode::PushConst, name);
    if let Some(sup) = superclass {
        b.emit(Opcode::LoadVar, sup);
    }
    let count = methods.len();
    for (method_name, code) in methods {
        b.emit(Opcode::PushConst, method_name);
        make_closure(b, code);
    }
    b.emit(Opcode::BuildDict, count)
        .emit(Opcode::BuildClass, superclass.is_some())
        .emit(Opcode::StoreVar, name);
}

fn point_class(b: &mut CodeBuilder) {
    let init = method("inisiasi", &["diri", "x"], |m| {
        m.emit(Opcode::LoadVar, "diri")
            .emit(Opcode::LoadVar, "x")
            .emit(Opcode::StoreAttr, "x")
            .emit(Opcode::PushConst, 99)
            .op(Opcode::Ret);
    });
    let get = method("ambil", &["diri"], |m| {
        m.emit(Opcode::LoadVar, "diri")
            .emit(Opcode::LoadAttr, "x")
            .op(Opcode::Ret);
    });
    build_class(b, "Titik", None, vec![("inisiasi", init), ("ambil", get)]);
}

#[test]
fn test_constructor_pushes_instance_not_return_value() {
    let mut b = CodeBuilder::new("main");
    point_class(&mut b);
    b.emit(Opcode::LoadVar, "Titik")
        .emit(Opcode::PushConst, 7)
        .emit(Opcode::Call, 1)
        .emit(Opcode::StoreLocal, "t")
        .emit(Opcode::LoadLocal, "t")
        .emit(Opcode::IsInstance, "Titik")
        .emit(Opcode::LoadLocal, "t")
        .emit(Opcode::LoadAttr, "ambil")
        .emit(Opcode::Call, 0)
        .emit(Opcode::BuildList, 2)
        .op(Opcode::Ret);
    assert_eq!(eval(b.finish()).to_string(), "[benar, 7]");
}

#[test]
fn test_class_without_constructor() {
    let mut b = CodeBuilder::new("main");
    build_class(&mut b, "Kosong", None, vec![]);
    b.emit(Opcode::LoadVar, "Kosong")
        .emit(Opcode::PushConst, 1)
        .emit(Opcode::Call, 1)
        .op(Opcode::Dup)
        .emit(Opcode::PushConst, "isi")
        .emit(Opcode::StoreAttr, "baru")
        .emit(Opcode::LoadAttr, "baru")
        .op(Opcode::Ret);
    assert_eq!(eval(b.finish()), Value::string("isi"));
}

#[test]
fn test_inheritance_and_super_method() {
    let base_sound = method("suara", &["diri"], |m| {
        m.emit(Opcode::PushConst, "...").op(Opcode::Ret);
    });
    let base_legs = method("kaki", &["diri"], |m| {
        m.emit(Opcode::PushConst, 4).op(Opcode::Ret);
    });
    let cat_sound = method("suara", &["diri"], |m| {
        m.emit(Opcode::LoadVar, "diri")
            .emit(Opcode::LoadVar, "Kucing")
            .emit(Opcode::LoadSuperMethod, "suara")
            .emit(Opcode::Call, 0)
            .emit(Opcode::PushConst, " meong")
            .op(Opcode::Add)
            .op(Opcode::Ret);
    });

    let mut b = CodeBuilder::new("main");
    build_class(&mut b, "Hewan", None, vec![("suara", base_sound), ("kaki", base_legs)]);
    build_class(&mut b, "Kucing", Some("Hewan"), vec![("suara", cat_sound)]);
    b.emit(Opcode::LoadVar, "Kucing")
        .emit(Opcode::Call, 0)
        .emit(Opcode::StoreLocal, "k")
        .emit(Opcode::LoadLocal, "k")
        .emit(Opcode::LoadAttr, "suara")
        .emit(Opcode::Call, 0)
        .emit(Opcode::LoadLocal, "k")
        .emit(Opcode::LoadAttr, "kaki")
        .emit(Opcode::Call, 0)
        .emit(Opcode::LoadLocal, "k")
        .emit(Opcode::IsInstance, "Hewan")
        .emit(Opcode::LoadLocal, "k")
        .emit(Opcode::IsInstance, "Daftar")
        .emit(Opcode::BuildList, 4)
        .op(Opcode::Ret);
    assert_eq!(eval(b.finish()).to_string(), "[\"... meong\", 4, benar, salah]");
}

#[test]
fn test_native_method_receives_receiver() {
    let mut b = CodeBuilder::new("main");
    b.emit(Opcode::PushConst, "Wadah")
        .emit(Opcode::PushConst, "ukuran")
        .emit(Opcode::LoadVar, "tipe")
        .emit(Opcode::BuildDict, 1)
        .emit(Opcode::BuildClass, 0)
        .emit(Opcode::Call, 0)
        .emit(Opcode::LoadAttr, "ukuran")
        .emit(Opcode::Call, 0)
        .op(Opcode::Ret);
    assert_eq!(eval(b.finish()), Value::string("objek"));
}
