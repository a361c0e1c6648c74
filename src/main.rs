//! # `iac-toolkit`
//!
//! `iac-toolkit` runs terraform or terragrunt from a GitHub Actions step.
//! It reads the step's inputs (or a YAML settings file), synthesizes the exact
//! command line, executes it and publishes `command`, `command-args`,
//! `command-string`, `exit-code`, `stdout` and `stderr` as step outputs.
//!
//! Terragrunt flags and commands are rendered in the spelling of the installed
//! major version: `--terragrunt-*` flags and `run-all` for v0, the prefix-free
//! flags and `run --all` for v1 and later.
//!
//! ## Usage
//!
//! ```sh
//! iac-toolkit terraform
//! iac-toolkit terragrunt --config iac.yaml --print-command --output-format multiline
//! ```

use anyhow::Result;
use clap::Parser as _;
use iac_toolkit::cli::Args;
use iac_toolkit::error::IacError;
use iac_toolkit::runner::outputs::error_annotation;
use iac_toolkit::system::RealSystem;
use iac_toolkit::system::System as _;
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> Result<()> {
    let args = Args::parse();
    let run_args = args.tool.run_args();
    let tool = args.tool.tool();

    // Keep stdout clean when printing the command
    let log_level = if run_args.print_command {
        "error"
    } else if args.verbose {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt().with_target(false).with_env_filter(filter).init();

    let system = RealSystem::new();
    let result = if run_args.print_command {
        iac_toolkit::run_print_command(&system, run_args, tool)
    } else {
        iac_toolkit::run(&system, run_args, tool)
    };

    match result {
        Ok(()) => std::process::exit(0),
        Err(err) => {
            error!("{err:#}");
            if system.env_var("GITHUB_ACTIONS").is_ok_and(|v| v == "true") {
                println!("{}", error_annotation(&format!("{err:#}")));
            }
            std::process::exit(
                err.downcast_ref::<IacError>()
                    .map_or(1, IacError::exit_code),
            );
        }
    }
}
