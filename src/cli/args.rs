use clap::{Parser, Subcommand};

use crate::iac::Tool;

/// Command-line arguments for iac-toolkit
#[derive(Parser, Debug, Clone)]
#[command(name = "iac-toolkit")]
#[command(about = "Synthesize and run terraform and terragrunt commands in GitHub Actions")]
#[command(long_about = None)]
#[command(version)]
pub struct Args {
    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub tool: ToolCommand,
}

/// Wrapped tool to run
#[derive(Subcommand, Debug, Clone)]
pub enum ToolCommand {
    /// Run terraform
    Terraform(RunArgs),
    /// Run terragrunt
    Terragrunt(RunArgs),
}

impl ToolCommand {
    #[must_use]
    pub const fn tool(&self) -> Tool {
        match self {
            Self::Terraform(_) => Tool::Terraform,
            Self::Terragrunt(_) => Tool::Terragrunt,
        }
    }

    #[must_use]
    pub const fn run_args(&self) -> &RunArgs {
        match self {
            Self::Terraform(args) | Self::Terragrunt(args) => args,
        }
    }
}

/// Options shared by both tool subcommands
#[derive(clap::Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// YAML settings file; action inputs are read when omitted
    #[arg(long, value_name = "PATH", env = "IAC_TOOLKIT_CONFIG")]
    pub config: Option<String>,

    /// Synthesize the command without executing it
    #[arg(long)]
    pub dry_run: bool,

    /// Print the command instead of running it
    #[arg(long)]
    pub print_command: bool,

    /// Output format for --print-command: shell, multiline or json
    #[arg(
        long = "output-format",
        value_name = "FORMAT",
        default_value = "shell",
        requires = "print_command"
    )]
    pub output_format: String,
}
