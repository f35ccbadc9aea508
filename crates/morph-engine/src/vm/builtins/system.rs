//! Process and host information builtins

use super::{arg, done};
use crate::vm::interpreter::{Interpreter, NativeCallResult};
use crate::vm::value::{Mapping, Value};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::debug;

/// `_sistem_cwd()`
pub fn cwd(interp: &mut Interpreter, argc: usize) -> NativeCallResult {
    interp.pop_args(argc);
    let dir = match std::env::current_dir() {
        Ok(dir) => Value::string(dir.to_string_lossy().into_owned()),
        Err(e) => {
            debug!(error = %e, "current_dir failed");
            Value::Nil
        }
    };
    done(interp, dir)
}

/// `keluar(code?)`: stop the run with an exit status
pub fn exit(interp: &mut Interpreter, argc: usize) -> NativeCallResult {
    let args = interp.pop_args(argc);
    let code = arg(&args, 0)
        .as_int()
        .and_then(|c| i32::try_from(c).ok())
        .unwrap_or(0);
    interp.push(Value::Nil);
    NativeCallResult::Exit(code)
}

/// `_sistem_platform()`
pub fn platform(interp: &mut Interpreter, argc: usize) -> NativeCallResult {
    interp.pop_args(argc);
    done(interp, Value::string(platform_name()))
}

fn platform_name() -> &'static str {
    if cfg!(target_os = "linux") {
        "linux"
    } else if cfg!(target_os = "macos") {
        "darwin"
    } else if cfg!(target_os = "windows") {
        "windows"
    } else if cfg!(target_os = "freebsd") {
        "freebsd"
    } else {
        "unknown"
    }
}

/// `_sistem_cpu()`: aggregate tick counters from `/proc/stat`
pub fn cpu_ticks(interp: &mut Interpreter, argc: usize) -> NativeCallResult {
    interp.pop_args(argc);
    let ticks = std::fs::read_to_string("/proc/stat")
        .ok()
        .and_then(|stat| parse_cpu_line(&stat))
        .map(|ticks| Value::list(ticks.into_iter().map(Value::Integer).collect()))
        .unwrap_or_default();
    done(interp, ticks)
}

fn parse_cpu_line(stat: &str) -> Option<Vec<i64>> {
    let line = stat.lines().find(|l| l.starts_with("cpu "))?;
    let ticks: Vec<i64> = line
        .split_whitespace()
        .skip(1)
        .filter_map(|field| field.parse().ok())
        .collect();
    (!ticks.is_empty()).then_some(ticks)
}

/// `_sistem_memori()`: `{total, free, available}` in KiB
pub fn memory(interp: &mut Interpreter, argc: usize) -> NativeCallResult {
    interp.pop_args(argc);
    let (total, free, available) = match std::fs::read_to_string("/proc/meminfo") {
        Ok(info) => parse_meminfo(&info),
        Err(_) => (total_memory_kib(), None, None),
    };

    let mut map = Mapping::default();
    map.insert("total".to_string(), opt_int(total));
    map.insert("free".to_string(), opt_int(free));
    map.insert("available".to_string(), opt_int(available));
    done(interp, Value::mapping(map))
}

fn opt_int(value: Option<i64>) -> Value {
    value.map(Value::Integer).unwrap_or_default()
}

fn parse_meminfo(info: &str) -> (Option<i64>, Option<i64>, Option<i64>) {
    let field = |key: &str| -> Option<i64> {
        info.lines()
            .find_map(|line| line.strip_prefix(key))
            .and_then(|rest| rest.trim_start_matches(':').split_whitespace().next())
            .and_then(|n| n.parse().ok())
    };
    (field("MemTotal"), field("MemFree"), field("MemAvailable"))
}

#[cfg(unix)]
fn total_memory_kib() -> Option<i64> {
    // SAFETY: sysconf has no preconditions and only reads system configuration
    let (pages, page_size) = unsafe {
        (
            libc::sysconf(libc::_SC_PHYS_PAGES),
            libc::sysconf(libc::_SC_PAGESIZE),
        )
    };
    if pages <= 0 || page_size <= 0 {
        return None;
    }
    Some((pages as i64).saturating_mul(page_size as i64) / 1024)
}

#[cfg(not(unix))]
fn total_memory_kib() -> Option<i64> {
    None
}

/// `_sistem_jumlah_cpu()`
pub fn cpu_count(interp: &mut Interpreter, argc: usize) -> NativeCallResult {
    interp.pop_args(argc);
    let count = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    done(interp, Value::from(count))
}

/// `waktu()`: seconds since the epoch
pub fn time(interp: &mut Interpreter, argc: usize) -> NativeCallResult {
    interp.pop_args(argc);
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0);
    done(interp, Value::Float(secs))
}

/// `tidur(ms)`: blocks the whole interpreter
pub fn sleep(interp: &mut Interpreter, argc: usize) -> NativeCallResult {
    let args = interp.pop_args(argc);
    let millis = match arg(&args, 0) {
        Value::Integer(ms) if ms > 0 => Some(ms as u64),
        Value::Float(ms) if ms.is_finite() && ms > 0.0 => Some(ms as u64),
        _ => None,
    };
    if let Some(ms) = millis {
        std::thread::sleep(Duration::from_millis(ms));
    }
    done(interp, Value::Nil)
}
