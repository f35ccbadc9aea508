//! Host builtins
//!
//! Every callback follows the native stack contract: pop exactly `argc`
//! values from the active frame and push exactly one result. Bad arguments
//! degrade to Nil rather than failing the run.

pub mod base;
pub mod generator;
pub mod io;
pub mod string;
pub mod system;

use crate::vm::interpreter::{Interpreter, NativeCallResult, NativeModule, NativeModuleRegistry};
use crate::vm::native_registry::NativeFunctionRegistry;
use crate::vm::value::Value;
use tracing::warn;

/// Push a native's result and report completion
pub(crate) fn done(interp: &mut Interpreter, value: Value) -> NativeCallResult {
    interp.push(value);
    NativeCallResult::Done
}

/// Argument at `index`, Nil if the caller passed fewer
pub(crate) fn arg(args: &[Value], index: usize) -> Value {
    args.get(index).cloned().unwrap_or_default()
}

/// Install the global builtins
pub fn register_builtins(registry: &mut NativeFunctionRegistry) {
    // Printing and input
    registry.register("tulis", base::tulis);
    registry.register("cetak", base::cetak);
    registry.register("masukan", base::masukan);

    // Introspection and coercion
    registry.register("panjang", base::panjang);
    registry.register("_panjang_builtin", base::panjang);
    registry.register("teks", base::teks);
    registry.register("_str_builtin", base::teks);
    registry.register("tipe", base::tipe);
    registry.register("_tipe_objek_builtin", base::tipe);
    registry.register("_int_builtin", base::to_int);
    registry.register("_float_builtin", base::to_float);

    // Containers
    registry.register("_tambah_builtin", base::append);
    registry.register("_hapus_indeks_builtin", base::remove_at);
    registry.register("_salin_kamus_builtin", base::copy_mapping);

    // Strings
    registry.register("_gabung_builtin", string::join);
    registry.register("_ord_builtin", string::ord);
    registry.register("_chr_builtin", string::chr);

    // Files
    registry.register("baca_file", io::read_file);
    registry.register("tulis_file", io::write_file);
    registry.register("_io_buka", io::open_native);
    registry.register("_io_baca", io::read_native);
    registry.register("_io_tulis", io::write_native);
    registry.register("_io_tutup", io::close_native);
    registry.register("_io_ada", io::exists);

    // System
    registry.register("_sistem_cwd", system::cwd);
    registry.register("keluar", system::exit);
    registry.register("_sistem_platform", system::platform);
    registry.register("_sistem_cpu", system::cpu_ticks);
    registry.register("_sistem_memori", system::memory);
    registry.register("_sistem_jumlah_cpu", system::cpu_count);
    registry.register("waktu", system::time);
    registry.register("tidur", system::sleep);

    // Generators
    registry.register("_gen_yield", generator::yield_value);
    registry.register("_gen_resume", generator::resume);
}

/// Install the importable native modules
pub fn register_native_modules(registry: &mut NativeModuleRegistry) {
    let modules = [
        NativeModule::new("_io")
            .function("buka", io::open_native)
            .function("baca", io::read_native)
            .function("tulis", io::write_native)
            .function("tutup", io::close_native)
            .function("ada", io::exists)
            .function("baca_file", io::read_file)
            .function("tulis_file", io::write_file),
        NativeModule::new("_sistem")
            .function("cwd", system::cwd)
            .function("platform", system::platform)
            .function("cpu", system::cpu_ticks)
            .function("memori", system::memory)
            .function("jumlah_cpu", system::cpu_count)
            .function("waktu", system::time)
            .function("tidur", system::sleep)
            .function("keluar", system::exit),
        NativeModule::new("_teks")
            .function("kecil", string::lower_native)
            .function("besar", string::upper_native)
            .function("temukan", string::find_native)
            .function("ganti", string::replace_native)
            .function("gabung", string::join)
            .function("ord", string::ord)
            .function("chr", string::chr),
        NativeModule::new("_generator")
            .function("yield", generator::yield_value)
            .function("resume", generator::resume),
    ];

    for module in modules {
        if let Err(e) = registry.register(module) {
            warn!(error = %e, "skipping native module");
        }
    }
}
