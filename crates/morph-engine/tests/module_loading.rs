//! Integration tests for module loading
//!
//! Tests the pipeline from `.mvm` bytes to executed root code and imported
//! file modules.

mod common;

use common::{vm, vm_with_options};
use morph_engine::bytecode::MAGIC;
use morph_engine::vm::{Value, VmError};
use morph_engine::{
    CodeBuilder, CodeObject, ExecutionResult, Module, ModuleError, Opcode, VmOptions,
};
use std::path::Path;

fn write_module(dir: &Path, name: &str, code: CodeObject) {
    let bytes = Module::new(code).encode();
    std::fs::write(dir.join(format!("{}.mvm", name)), bytes).unwrap();
}

/// `util`: prints once on initialization and exports `nilai = 3`
fn util_module() -> CodeObject {
    let mut b = CodeBuilder::new("util");
    b.emit(Opcode::PushConst, "dimuat")
        .emit(Opcode::Print, 1)
        .emit(Opcode::PushConst, 3)
        .emit(Opcode::StoreVar, "nilai")
        .op(Opcode::Ret);
    b.finish()
}

#[test]
fn test_run_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut b = CodeBuilder::new("utama");
    b.emit(Opcode::PushConst, "halo").emit(Opcode::Print, 1).op(Opcode::Halt);
    write_module(dir.path(), "utama", b.finish());

    let (mut vm, out) = vm();
    let result = vm.run_file(dir.path().join("utama.mvm"));
    assert!(result.is_completed());
    assert_eq!(out.text(), "halo\n");
}

#[test]
fn test_import_file_module_is_cached() {
    let dir = tempfile::tempdir().unwrap();
    write_module(dir.path(), "util", util_module());

    let mut b = CodeBuilder::new("main");
    b.emit(Opcode::Import, "util")
        .emit(Opcode::StoreLocal, "u")
        .emit(Opcode::Import, "util")
        .emit(Opcode::LoadAttr, "nilai")
        .emit(Opcode::LoadLocal, "u")
        .emit(Opcode::LoadAttr, "nilai")
        .op(Opcode::Add)
        .op(Opcode::Ret);

    let (mut vm, out) = vm_with_options(VmOptions::default().with_module_dir(dir.path()));
    let result = vm.execute_code(b.finish());
    assert_eq!(result.value(), Some(&Value::Integer(6)));
    assert_eq!(out.text(), "dimuat\n");
    assert!(vm.interpreter().modules().is_loaded("util"));
    assert!(vm.get_global("nilai").is_none());
}

#[test]
fn test_circular_import_yields_nil() {
    let dir = tempfile::tempdir().unwrap();
    let mut a = CodeBuilder::new("siklus");
    a.emit(Opcode::Import, "siklus")
        .emit(Opcode::StoreVar, "diri")
        .op(Opcode::Ret);
    write_module(dir.path(), "siklus", a.finish());

    let mut b = CodeBuilder::new("main");
    b.emit(Opcode::Import, "siklus")
        .emit(Opcode::LoadAttr, "diri")
        .op(Opcode::Ret);

    let (mut vm, _) = vm_with_options(VmOptions::default().with_module_dir(dir.path()));
    let result = vm.execute_code(b.finish());
    assert!(result.value().is_some_and(Value::is_nil));
}

#[test]
fn test_missing_module_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let mut b = CodeBuilder::new("main");
    b.emit(Opcode::Import, "tidak_ada").op(Opcode::Ret);

    let (mut vm, _) = vm_with_options(VmOptions::default().with_module_dir(dir.path()));
    let result = vm.execute_code(b.finish());
    assert!(matches!(
        result,
        ExecutionResult::Failed(VmError::Module(ModuleError::Io { .. }))
    ));
    assert_eq!(result.exit_code(), 1);
    assert!(vm.interpreter().call_stack().is_empty());
}

#[test]
fn test_exception_in_module_aborts_loading() {
    let dir = tempfile::tempdir().unwrap();
    let mut m = CodeBuilder::new("rusak");
    m.emit(Opcode::PushConst, "gagal init").op(Opcode::Throw);
    write_module(dir.path(), "rusak", m.finish());

    let mut b = CodeBuilder::new("main");
    let handler = b.emit_jump(Opcode::PushTry);
    b.emit(Opcode::Import, "rusak").op(Opcode::Ret);
    b.patch_jump(handler);
    b.op(Opcode::Ret);

    let (mut vm, _) = vm_with_options(VmOptions::default().with_module_dir(dir.path()));
    let result = vm.execute_code(b.finish());
    assert_eq!(result.value(), Some(&Value::string("gagal init")));
    assert!(!vm.interpreter().modules().is_loading("rusak"));
    assert!(!vm.interpreter().modules().is_loaded("rusak"));
}

#[test]
fn test_corrupted_magic_executes_nothing() {
    let mut b = CodeBuilder::new("main");
    b.emit(Opcode::PushConst, "tidak").emit(Opcode::Print, 1);
    let mut bytes = Module::new(b.finish()).encode();
    bytes[0] = b'X';

    let (mut vm, out) = vm();
    let result = vm.run_bytes(&bytes);
    assert!(matches!(
        result,
        ExecutionResult::Failed(VmError::Module(ModuleError::InvalidMagic(_)))
    ));
    assert!(out.text().is_empty());
    assert!(vm.interpreter().call_stack().is_empty());
    assert_eq!(vm.interpreter().instruction_count(), 0);
}

#[test]
fn test_root_must_be_code() {
    let mut bytes = MAGIC.to_vec();
    bytes.extend_from_slice(&[1, 0, 0, 0, 0, 0]);
    bytes.push(1);

    let (vm, _) = vm();
    assert!(matches!(vm.load_bytes(&bytes), Err(ModuleError::RootNotCode(_))));
}

#[test]
fn test_missing_file_reports_path() {
    let (mut vm, _) = vm();
    let result = vm.run_file("/nonexistent/program.mvm");
    match result {
        ExecutionResult::Failed(e) => assert!(e.to_string().contains("program.mvm")),
        other => panic!("expected failure, got {:?}", other),
    }
}
