//! Run orchestration
//!
//! Resolves the tool version, synthesizes the command from `Settings`,
//! executes it through the agent (or stops at a dry run) and collects the
//! action outputs.

pub mod outputs;

use std::path::Path;

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::error::IacError;
use crate::iac::format::{self, OutputFormat};
use crate::iac::{IacService, Tool};
use crate::system::{ExecRequest, System};
use crate::version::{InstalledVersion, ResolvedVersion, VersionManager};

pub use outputs::publish_outputs;

/// Output names
pub const OUTPUT_COMMAND: &str = "command";
pub const OUTPUT_COMMAND_ARGS: &str = "command-args";
pub const OUTPUT_COMMAND_STRING: &str = "command-string";
pub const OUTPUT_EXIT_CODE: &str = "exit-code";
pub const OUTPUT_STDOUT: &str = "stdout";
pub const OUTPUT_STDERR: &str = "stderr";

/// Result of one run
///
/// Outputs computed before a failure are kept so they can still be
/// published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub success: bool,
    pub outputs: IndexMap<String, String>,
    pub error: Option<IacError>,
}

impl RunOutcome {
    fn from_result(result: Result<(), IacError>, outputs: IndexMap<String, String>) -> Self {
        match result {
            Ok(()) => Self {
                success: true,
                outputs,
                error: None,
            },
            Err(error) => Self {
                success: false,
                outputs,
                error: Some(error),
            },
        }
    }

    /// Exit code for the process, 0 on success
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        self.error.as_ref().map_or(0, IacError::exit_code)
    }
}

/// Drives one terraform or terragrunt invocation
pub struct Runner<'a> {
    system: &'a dyn System,
    versions: &'a dyn VersionManager,
}

impl<'a> Runner<'a> {
    #[must_use]
    pub fn new(system: &'a dyn System, versions: &'a dyn VersionManager) -> Self {
        Self { system, versions }
    }

    pub fn run_terraform(&self, settings: &Settings) -> RunOutcome {
        self.run(settings, Tool::Terraform)
    }

    pub fn run_terragrunt(&self, settings: &Settings) -> RunOutcome {
        self.run(settings, Tool::Terragrunt)
    }

    /// Run `tool`; never fails, errors land in the outcome
    pub fn run(&self, settings: &Settings, tool: Tool) -> RunOutcome {
        let mut outputs = IndexMap::new();
        let result = self.try_run(settings, tool, &mut outputs);
        if let Err(err) = &result {
            debug!("{tool} run failed: {err}");
        }
        RunOutcome::from_result(result, outputs)
    }

    /// Write the outcome's outputs through the agent
    ///
    /// # Errors
    ///
    /// Returns `IacError::System` if the output file cannot be written
    pub fn publish(&self, outcome: &RunOutcome) -> Result<(), IacError> {
        publish_outputs(self.system, &outcome.outputs)
    }

    /// Render the command `settings` describe without running it
    ///
    /// # Errors
    ///
    /// Returns an error if the version cannot be determined or the settings
    /// are invalid
    pub fn render(
        &self,
        settings: &Settings,
        tool: Tool,
        output_format: OutputFormat,
    ) -> anyhow::Result<String> {
        let service = self.synthesize(settings, tool)?;
        let tokens = service.command_line()?;
        format::render(&tokens, output_format)
    }

    fn try_run(
        &self,
        settings: &Settings,
        tool: Tool,
        outputs: &mut IndexMap<String, String>,
    ) -> Result<(), IacError> {
        let service = self.synthesize(settings, tool)?;
        let tokens = service.command_line()?;

        outputs.insert(OUTPUT_COMMAND.to_owned(), service.command_name().to_owned());
        outputs.insert(
            OUTPUT_COMMAND_ARGS.to_owned(),
            format::to_json(&tokens).map_err(|e| IacError::system(e.to_string()))?,
        );
        outputs.insert(OUTPUT_COMMAND_STRING.to_owned(), format::single_line(&tokens));

        if service.core().dry_run {
            info!("Dry run: {}", format::single_line(&tokens));
            return Ok(());
        }

        let cwd = Path::new(&service.core().working_directory);
        if !self.system.is_dir(cwd) {
            return Err(IacError::input(
                "working-directory",
                format!("Directory does not exist: {}", cwd.display()),
            ));
        }

        let request = ExecRequest::from_tokens(&tokens)
            .ok_or_else(|| IacError::system("Synthesized an empty command line"))?
            .with_cwd(cwd)
            .with_env(service.core().environment.clone())
            .ignoring_return_code();

        info!("Running: {}", request.display());
        let output = self.system.exec(&request).map_err(|e| {
            IacError::system(format!("Failed to run '{}': {e}", request.program))
        })?;

        outputs.insert(OUTPUT_EXIT_CODE.to_owned(), output.exit_code.to_string());
        outputs.insert(OUTPUT_STDOUT.to_owned(), output.stdout);
        outputs.insert(OUTPUT_STDERR.to_owned(), output.stderr);

        if output.exit_code != 0 {
            return Err(IacError::Execution {
                exit_code: output.exit_code,
                message: format!("{tool} {} failed", service.command_name()),
            });
        }
        Ok(())
    }

    fn synthesize(&self, settings: &Settings, tool: Tool) -> Result<Box<dyn IacService>, IacError> {
        match tool {
            Tool::Terraform => {
                self.check_version(settings, tool)?;
                Ok(Box::new(settings.terraform_builder()?.build()?))
            }
            Tool::Terragrunt => {
                let major_version = self.terragrunt_major_version(settings)?;
                debug!("Rendering for terragrunt v{major_version}.x");
                Ok(Box::new(settings.terragrunt_builder(major_version)?.build()?))
            }
        }
    }

    fn resolve(&self, settings: &Settings, tool: Tool) -> Result<Option<ResolvedVersion>, IacError> {
        let working_dir = if settings.working_directory.is_empty() {
            Path::new(".")
        } else {
            Path::new(&settings.working_directory)
        };
        let resolved = self
            .versions
            .resolve(tool, settings.version.as_deref(), working_dir)?;
        match &resolved {
            Some(version) => info!(
                "Using {tool} {} (from {})",
                version.resolved, version.source
            ),
            None => debug!("No {tool} version requested, using PATH"),
        }
        Ok(resolved)
    }

    /// Resolve and, when a version was requested, compare with PATH
    fn check_version(&self, settings: &Settings, tool: Tool) -> Result<(), IacError> {
        if let Some(resolved) = self.resolve(settings, tool)? {
            self.detect(tool, Some(&resolved));
        }
        Ok(())
    }

    fn detect(&self, tool: Tool, resolved: Option<&ResolvedVersion>) -> Option<InstalledVersion> {
        match self.versions.detect_installed(tool) {
            Ok(installed) => {
                if let Some(resolved) = resolved
                    && !installed.triple().starts_with(&resolved.resolved)
                {
                    warn!(
                        "Requested {tool} {} but {} is installed",
                        resolved.resolved,
                        installed.triple()
                    );
                }
                Some(installed)
            }
            Err(err) => {
                warn!("{err}");
                None
            }
        }
    }

    /// Override, then the installed binary, then the requested version, then 0
    fn terragrunt_major_version(&self, settings: &Settings) -> Result<u64, IacError> {
        if let Some(major) = settings.terragrunt.terragrunt_major_version {
            debug!("terragrunt major version {major} set explicitly");
            return Ok(major);
        }

        let resolved = self.resolve(settings, Tool::Terragrunt)?;
        if let Some(installed) = self.detect(Tool::Terragrunt, resolved.as_ref()) {
            return Ok(installed.major);
        }
        if let Some(major) = resolved.as_ref().and_then(ResolvedVersion::major) {
            return Ok(major);
        }
        warn!(
            "Could not determine the terragrunt major version, rendering for v0. \
            Set terragrunt-major-version to choose explicitly"
        );
        Ok(0)
    }
}
