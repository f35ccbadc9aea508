//! `morph run`: execute a module and map its outcome to an exit code.

use crate::output::StyledOutput;
use morph_engine::vm::VmError;
use morph_engine::{ExecutionResult, Vm, VmOptions};
use std::io::Write;
use std::path::PathBuf;
use termcolor::ColorChoice;
use tracing::{debug, warn};

pub struct RunArgs {
    pub file: PathBuf,
    pub args: Vec<String>,
    pub max_instructions: Option<u64>,
    pub module_dir: Option<PathBuf>,
    pub color: ColorChoice,
}

/// Run the module, returning the process exit code
pub fn execute(args: RunArgs) -> anyhow::Result<i32> {
    let mut out = StyledOutput::new(args.color);

    let module_dir = match args.module_dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let mut options = VmOptions::default()
        .with_module_dir(module_dir)
        .with_args(args.args);
    if let Some(limit) = args.max_instructions {
        options = options.with_max_instructions(limit);
    }

    let mut vm = Vm::with_options(options);
    let module = match vm.load_file(&args.file) {
        Ok(module) => module,
        Err(e) => {
            out.error(&e.to_string());
            return Ok(1);
        }
    };

    debug!(file = %args.file.display(), name = module.name(), "running module");
    let result = vm.execute(&module);
    if let Err(e) = std::io::stdout().flush() {
        warn!(error = %e, "failed to flush program output");
    }

    let code = result.exit_code();
    match result {
        ExecutionResult::Completed(_) | ExecutionResult::Exited(_) => {}
        ExecutionResult::Uncaught(exception) => {
            out.error(&format!("uncaught exception: {}", exception));
        }
        ExecutionResult::Failed(VmError::InstructionLimit(limit)) => {
            out.warning(&format!("stopped after {} instructions", limit));
        }
        ExecutionResult::Failed(e) => {
            out.error(&e.to_string());
        }
    }
    out.flush();
    Ok(code)
}
