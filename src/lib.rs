//! `iac-toolkit` - terraform and terragrunt command synthesis for GitHub Actions
//!
//! This library turns action inputs or a YAML settings file into the exact
//! argument vector terraform or terragrunt expects, translating terragrunt
//! flags and commands between its v0 and v1 spellings, then runs it through
//! a swappable `System` and publishes the step outputs.

pub mod cli;
pub mod config;
pub mod error;
pub mod iac;
pub mod runner;
pub mod system;
pub mod version;

use anyhow::Result;
use cli::RunArgs;
use config::Settings;
use config::inputs::ActionInputs;
use iac::Tool;
use iac::format::OutputFormat;
use runner::Runner;
use system::System;
use tracing::error;
use version::PathVersionManager;

/// Settings from `--config` when given, action inputs otherwise
pub fn load_settings(system: &dyn System, args: &RunArgs, tool: Tool) -> Result<Settings> {
    let mut settings = match args.config.as_deref() {
        Some(path) => Settings::load_from_file(system, path)?,
        None => Settings::from_inputs(&ActionInputs::new(system), tool)?,
    };
    if args.dry_run {
        settings.dry_run = true;
    }
    Ok(settings)
}

/// Main entry point: run `tool` and publish its outputs
pub fn run(system: &dyn System, args: &RunArgs, tool: Tool) -> Result<()> {
    let settings = load_settings(system, args, tool)?;
    let versions = PathVersionManager::new(system);
    let runner = Runner::new(system, &versions);

    let outcome = runner.run(&settings, tool);
    let published = runner.publish(&outcome);

    if let Some(err) = outcome.error {
        if let Err(publish_err) = published {
            error!("{publish_err}");
        }
        return Err(err.into());
    }
    published?;
    Ok(())
}

/// Print the synthesized command without running it
pub fn run_print_command(system: &dyn System, args: &RunArgs, tool: Tool) -> Result<()> {
    let format = args.output_format.parse::<OutputFormat>()?;
    let settings = load_settings(system, args, tool)?;
    let versions = PathVersionManager::new(system);
    let runner = Runner::new(system, &versions);

    // Output to stdout (not using logging)
    println!("{}", runner.render(&settings, tool, format)?);

    Ok(())
}
