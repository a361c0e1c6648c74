//! Settings model
//!
//! One `Settings` value describes a single terraform or terragrunt
//! invocation. It is filled either from the action's `with:` inputs or from a
//! YAML settings file, then applied to the matching builder.

pub mod inputs;
pub mod schema;
pub mod yaml;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::IacError;
use crate::iac::{SharedBuilder, TerraformBuilder, TerragruntBuilder, Tool};
use crate::system::System;
use inputs::{ActionInputs, value_to_arg};

const fn default_true() -> bool {
    true
}

/// Settings shared by both tools
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Settings {
    /// Subcommand, e.g. `plan` or `run-all`
    pub command: String,

    /// Empty means the builder default (`.`)
    #[serde(default)]
    pub working_directory: String,

    /// Requested tool version; `latest` or unset uses whatever is on PATH
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default)]
    pub environment: IndexMap<String, Value>,

    #[serde(default)]
    pub variables: IndexMap<String, Value>,

    #[serde(default)]
    pub backend_config: IndexMap<String, Value>,

    #[serde(default)]
    pub var_files: Vec<String>,

    #[serde(default)]
    pub targets: Vec<String>,

    #[serde(default)]
    pub auto_approve: bool,

    #[serde(default)]
    pub dry_run: bool,

    #[serde(default)]
    pub no_color: bool,

    #[serde(default)]
    pub compact_warnings: bool,

    #[serde(default = "default_true")]
    pub refresh: bool,

    #[serde(default)]
    pub reconfigure: bool,

    #[serde(default)]
    pub migrate_state: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_file: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_file: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallelism: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_timeout: Option<String>,

    #[serde(flatten)]
    pub terragrunt: TerragruntSettings,
}

/// Terragrunt-only settings, ignored for terraform runs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TerragruntSettings {
    #[serde(default)]
    pub run_all: bool,

    #[serde(default)]
    pub no_auto_init: bool,

    #[serde(default)]
    pub no_auto_retry: bool,

    #[serde(default)]
    pub non_interactive: bool,

    #[serde(default)]
    pub ignore_dependency_errors: bool,

    #[serde(default)]
    pub ignore_external_dependencies: bool,

    #[serde(default)]
    pub include_external_dependencies: bool,

    #[serde(default)]
    pub strict_include: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terragrunt_config: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terragrunt_working_dir: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terragrunt_parallelism: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terragrunt_source: Option<String>,

    #[serde(default)]
    pub source_map: IndexMap<String, String>,

    #[serde(default)]
    pub include_dirs: Vec<String>,

    #[serde(default)]
    pub exclude_dirs: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_dir: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iam_role: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iam_role_session_name: Option<String>,

    /// Skips installed-version detection when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terragrunt_major_version: Option<u64>,
}

impl Settings {
    /// Settings with only a command set and every other field at its default
    #[must_use]
    pub fn for_command(command: &str) -> Self {
        Self {
            command: command.to_owned(),
            working_directory: String::new(),
            version: None,
            environment: IndexMap::new(),
            variables: IndexMap::new(),
            backend_config: IndexMap::new(),
            var_files: Vec::new(),
            targets: Vec::new(),
            auto_approve: false,
            dry_run: false,
            no_color: false,
            compact_warnings: false,
            refresh: true,
            reconfigure: false,
            migrate_state: false,
            plan_file: None,
            out_file: None,
            parallelism: None,
            lock_timeout: None,
            terragrunt: TerragruntSettings::default(),
        }
    }

    /// Read every input the action declares for `tool`
    ///
    /// The version input is tool-prefixed (`terraform-version`,
    /// `terragrunt-version`); terragrunt-only inputs are read for terraform
    /// too but have no effect there.
    ///
    /// # Errors
    ///
    /// Returns an error if `command` is missing or an input is malformed
    pub fn from_inputs(inputs: &ActionInputs<'_>, tool: Tool) -> Result<Self, IacError> {
        let command = inputs
            .get_input("command", true)?
            .ok_or_else(|| IacError::MissingCommand { tool: tool.as_str() })?;

        let terragrunt = TerragruntSettings {
            run_all: inputs.get_bool_input("run-all", false)?,
            no_auto_init: inputs.get_bool_input("no-auto-init", false)?,
            no_auto_retry: inputs.get_bool_input("no-auto-retry", false)?,
            non_interactive: inputs.get_bool_input("non-interactive", false)?,
            ignore_dependency_errors: inputs.get_bool_input("ignore-dependency-errors", false)?,
            ignore_external_dependencies: inputs
                .get_bool_input("ignore-external-dependencies", false)?,
            include_external_dependencies: inputs
                .get_bool_input("include-external-dependencies", false)?,
            strict_include: inputs.get_bool_input("strict-include", false)?,
            terragrunt_config: inputs.get_input("terragrunt-config", false)?,
            terragrunt_working_dir: inputs.get_input("terragrunt-working-dir", false)?,
            terragrunt_parallelism: inputs.get_int_input("terragrunt-parallelism")?,
            terragrunt_source: inputs.get_input("terragrunt-source", false)?,
            source_map: inputs
                .get_map_input("source-map")?
                .into_iter()
                .map(|(k, v)| (k, value_to_arg(&v)))
                .collect(),
            include_dirs: inputs.get_list_input("include-dirs")?,
            exclude_dirs: inputs.get_list_input("exclude-dirs")?,
            download_dir: inputs.get_input("download-dir", false)?,
            iam_role: inputs.get_input("iam-role", false)?,
            iam_role_session_name: inputs.get_input("iam-role-session-name", false)?,
            terragrunt_major_version: inputs
                .get_int_input("terragrunt-major-version")?
                .map(|major| {
                    u64::try_from(major).map_err(|_| {
                        IacError::input(
                            "terragrunt-major-version",
                            format!("'{major}' is not a valid major version"),
                        )
                    })
                })
                .transpose()?,
        };

        Ok(Self {
            command,
            working_directory: inputs
                .get_input("working-directory", false)?
                .unwrap_or_default(),
            version: inputs.get_input(&format!("{tool}-version"), false)?,
            environment: inputs.get_map_input("environment")?,
            variables: inputs.get_map_input("variables")?,
            backend_config: inputs.get_map_input("backend-config")?,
            var_files: inputs.get_list_input("var-files")?,
            targets: inputs.get_list_input("targets")?,
            auto_approve: inputs.get_bool_input("auto-approve", false)?,
            dry_run: inputs.get_bool_input("dry-run", false)?,
            no_color: inputs.get_bool_input("no-color", false)?,
            compact_warnings: inputs.get_bool_input("compact-warnings", false)?,
            refresh: inputs.get_bool_input("refresh", true)?,
            reconfigure: inputs.get_bool_input("reconfigure", false)?,
            migrate_state: inputs.get_bool_input("migrate-state", false)?,
            plan_file: inputs.get_input("plan-file", false)?,
            out_file: inputs.get_input("out-file", false)?,
            parallelism: inputs.get_int_input("parallelism")?,
            lock_timeout: inputs.get_input("lock-timeout", false)?,
            terragrunt,
        })
    }

    /// Load settings from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unparsable or fails schema
    /// validation
    pub fn load_from_file(system: &dyn System, path: &str) -> anyhow::Result<Self> {
        yaml::load_settings(system, path)
    }

    /// Apply the settings every tool shares
    ///
    /// # Errors
    ///
    /// Surfaces the first builder validation error
    pub fn apply_shared<B: SharedBuilder>(&self, builder: &mut B) -> Result<(), IacError> {
        if !self.working_directory.is_empty() {
            builder.with_working_directory(&self.working_directory)?;
        }
        for (key, value) in &self.environment {
            builder.with_environment_variable(key, &value_to_arg(value))?;
        }
        for (key, value) in &self.variables {
            builder.with_variable(key, &value_to_arg(value))?;
        }
        for (key, value) in &self.backend_config {
            builder.with_backend_config(key, &value_to_arg(value))?;
        }
        builder.with_var_files(&self.var_files)?;
        builder.with_targets(&self.targets)?;

        builder
            .with_auto_approve(self.auto_approve)
            .with_dry_run(self.dry_run)
            .with_no_color(self.no_color)
            .with_compact_warnings(self.compact_warnings)
            .with_refresh(self.refresh)
            .with_reconfigure(self.reconfigure)
            .with_migrate_state(self.migrate_state);

        if let Some(plan_file) = &self.plan_file {
            builder.with_plan_file(plan_file)?;
        }
        if let Some(out_file) = &self.out_file {
            builder.with_out_file(out_file)?;
        }
        if let Some(parallelism) = self.parallelism {
            builder.with_parallelism(parallelism)?;
        }
        if let Some(timeout) = &self.lock_timeout {
            builder.with_lock_timeout(timeout)?;
        }
        Ok(())
    }

    /// Terraform builder populated from these settings
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown command or an invalid value
    pub fn terraform_builder(&self) -> Result<TerraformBuilder, IacError> {
        let mut builder = TerraformBuilder::new();
        builder.with_command_name(&self.command)?;
        self.apply_shared(&mut builder)?;
        Ok(builder)
    }

    /// Terragrunt builder populated from these settings for `major_version`
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown command or an invalid value
    pub fn terragrunt_builder(&self, major_version: u64) -> Result<TerragruntBuilder, IacError> {
        let tg = &self.terragrunt;
        let mut builder = TerragruntBuilder::new();
        builder.with_command_name(&self.command)?;
        self.apply_shared(&mut builder)?;

        builder
            .with_major_version(major_version)
            .with_run_all(tg.run_all)
            .with_no_auto_init(tg.no_auto_init)
            .with_no_auto_retry(tg.no_auto_retry)
            .with_non_interactive(tg.non_interactive)
            .with_ignore_dependency_errors(tg.ignore_dependency_errors)
            .with_ignore_external_dependencies(tg.ignore_external_dependencies)
            .with_include_external_dependencies(tg.include_external_dependencies)
            .with_strict_include(tg.strict_include);

        if let Some(config) = &tg.terragrunt_config {
            builder.with_terragrunt_config(config)?;
        }
        if let Some(dir) = &tg.terragrunt_working_dir {
            builder.with_terragrunt_working_dir(dir)?;
        }
        if let Some(parallelism) = tg.terragrunt_parallelism {
            builder.with_terragrunt_parallelism(parallelism)?;
        }
        if let Some(source) = &tg.terragrunt_source {
            builder.with_terragrunt_source(source)?;
        }
        builder.with_source_maps(&tg.source_map)?;
        builder.with_include_dirs(&tg.include_dirs)?;
        builder.with_exclude_dirs(&tg.exclude_dirs)?;
        if let Some(dir) = &tg.download_dir {
            builder.with_download_dir(dir)?;
        }
        if let Some(role) = &tg.iam_role {
            builder.with_iam_role(role)?;
        }
        if let Some(name) = &tg.iam_role_session_name {
            builder.with_iam_role_session_name(name)?;
        }
        Ok(builder)
    }
}
