//! Morph command-line runner
//!
//! Loads compiled `.mvm` modules and either executes them or prints a
//! disassembly.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "morph")]
#[command(about = "Morph bytecode virtual machine", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Color output: auto, always, never
    #[arg(long, global = true)]
    color: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a Morph module
    Run {
        /// Module file (.mvm)
        file: PathBuf,
        /// Arguments to pass to the program
        #[arg(trailing_var_arg = true)]
        args: Vec<String>,
        /// Abort after executing this many instructions
        #[arg(long)]
        max_instructions: Option<u64>,
        /// Directory IMPORT resolves file modules against
        #[arg(long)]
        module_dir: Option<PathBuf>,
    },

    /// Print a module's header and disassembly
    Inspect {
        /// Module file (.mvm)
        file: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "morph_engine=debug,morph_cli=debug" } else { "warn" })
    });

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let color = output::resolve_color_choice(cli.color.as_deref());

    match cli.command {
        Commands::Run {
            file,
            args,
            max_instructions,
            module_dir,
        } => {
            let code = commands::run::execute(commands::run::RunArgs {
                file,
                args,
                max_instructions,
                module_dir,
                color,
            })?;
            if code != 0 {
                std::process::exit(code);
            }
        }

        Commands::Inspect { file } => {
            commands::inspect::execute(&file, color)?;
        }
    }

    Ok(())
}
