//! Terragrunt builder and service
//!
//! Terragrunt takes every terraform argument plus its own global flags.
//! The global flags and several command names changed spelling in
//! terragrunt 1.0; the installed major version decides which spelling is
//! rendered (see `flags`).

use core::num::NonZeroU32;

use indexmap::IndexMap;

use super::command::TerragruntCommand;
use super::shared::{
    CoreConfig, SharedBuilder, non_empty, positive, push_unique, render_shared_arguments,
};
use super::flags::{is_removed_command, renamed_command, select_flag};
use super::format;
use super::service::IacService;
use crate::error::IacError;

pub const TERRAGRUNT_EXECUTOR: &str = "terragrunt";

/// Terragrunt-only configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TerragruntOptions {
    pub run_all: bool,
    pub no_auto_init: bool,
    pub no_auto_retry: bool,
    pub non_interactive: bool,
    pub ignore_dependency_errors: bool,
    pub ignore_external_dependencies: bool,
    pub include_external_dependencies: bool,
    pub strict_include: bool,
    pub config: Option<String>,
    pub working_dir: Option<String>,
    pub parallelism: Option<NonZeroU32>,
    pub source: Option<String>,
    pub download_dir: Option<String>,
    pub iam_role: Option<String>,
    pub iam_role_session_name: Option<String>,
    pub include_dirs: Vec<String>,
    pub exclude_dirs: Vec<String>,
    pub source_map: IndexMap<String, String>,
    pub major_version: u64,
}

/// Append terragrunt's global flags in their fixed order
///
/// # Errors
///
/// Returns `IacError::UnknownFlag` if a key is missing from the flag table
#[inline]
pub fn render_terragrunt_arguments(
    options: &TerragruntOptions,
    args: &mut Vec<String>,
) -> Result<(), IacError> {
    let major = options.major_version;
    let push_value = |args: &mut Vec<String>, key: &str, value: &str| -> Result<(), IacError> {
        args.push(select_flag(key, major)?.to_owned());
        args.push(value.to_owned());
        Ok(())
    };
    let push_switch = |args: &mut Vec<String>, key: &str, enabled: bool| -> Result<(), IacError> {
        if enabled {
            args.push(select_flag(key, major)?.to_owned());
        }
        Ok(())
    };

    if let Some(config) = options.config.as_ref() {
        push_value(args, "config", config)?;
    }
    if let Some(dir) = options.working_dir.as_ref() {
        push_value(args, "working-dir", dir)?;
    }
    push_switch(args, "no-auto-init", options.no_auto_init)?;
    push_switch(args, "no-auto-retry", options.no_auto_retry)?;
    push_switch(args, "non-interactive", options.non_interactive)?;
    if options.run_all
        && let Some(parallelism) = options.parallelism
    {
        push_value(args, "parallelism", &parallelism.to_string())?;
    }
    for dir in &options.include_dirs {
        push_value(args, "include-dir", dir)?;
    }
    for dir in &options.exclude_dirs {
        push_value(args, "exclude-dir", dir)?;
    }
    push_switch(args, "ignore-dependency-errors", options.ignore_dependency_errors)?;
    push_switch(
        args,
        "ignore-external-dependencies",
        options.ignore_external_dependencies,
    )?;
    push_switch(
        args,
        "include-external-dependencies",
        options.include_external_dependencies,
    )?;
    if let Some(source) = options.source.as_ref() {
        push_value(args, "source", source)?;
    }
    for (original, replacement) in &options.source_map {
        push_value(args, "source-map", &format!("{original}={replacement}"))?;
    }
    if let Some(dir) = options.download_dir.as_ref() {
        push_value(args, "download-dir", dir)?;
    }
    if let Some(role) = options.iam_role.as_ref() {
        push_value(args, "iam-role", role)?;
        if let Some(session) = options.iam_role_session_name.as_ref() {
            push_value(args, "iam-role-session-name", session)?;
        }
    }
    push_switch(args, "strict-include", options.strict_include)?;

    Ok(())
}

/// Command tokens that follow the executable
///
/// # Errors
///
/// Returns `IacError::UnsupportedCommand` for a command removed in v1 when
/// the major version is 1 or later
#[inline]
pub fn command_tokens(
    command: TerragruntCommand,
    run_all: bool,
    major_version: u64,
) -> Result<Vec<String>, IacError> {
    let name = command.as_str();

    if run_all && let Some(terraform) = command.terraform_command() {
        let prefix: &[&str] = if major_version == 0 {
            &["run-all"]
        } else {
            &["run", "--all"]
        };
        let mut tokens: Vec<String> = prefix.iter().map(|t| (*t).to_owned()).collect();
        tokens.push(terraform.as_str().to_owned());
        return Ok(tokens);
    }

    if major_version >= 1 {
        if is_removed_command(name) {
            return Err(IacError::UnsupportedCommand {
                command: name.to_owned(),
                major_version,
            });
        }
        if let Some(tokens) = renamed_command(name) {
            return Ok(tokens.iter().map(|t| (*t).to_owned()).collect());
        }
    }

    Ok(vec![name.to_owned()])
}

/// Fluent, validating accumulator for a terragrunt invocation
#[derive(Debug, Clone, Default)]
pub struct TerragruntBuilder {
    command: Option<TerragruntCommand>,
    core: CoreConfig,
    options: TerragruntOptions,
}

impl TerragruntBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn for_command<C: Into<TerragruntCommand>>(command: C) -> Self {
        Self {
            command: Some(command.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn for_plan() -> Self {
        Self::for_command(super::TerraformCommand::Plan)
    }

    #[must_use]
    pub fn for_apply() -> Self {
        Self::for_command(super::TerraformCommand::Apply)
    }

    #[must_use]
    pub fn for_destroy() -> Self {
        Self::for_command(super::TerraformCommand::Destroy)
    }

    #[must_use]
    pub fn for_init() -> Self {
        Self::for_command(super::TerraformCommand::Init)
    }

    #[must_use]
    pub fn for_run_all<C: Into<TerragruntCommand>>(command: C) -> Self {
        let mut builder = Self::for_command(command);
        builder.options.run_all = true;
        builder
    }

    pub fn with_command<C: Into<TerragruntCommand>>(&mut self, command: C) -> &mut Self {
        self.command = Some(command.into());
        self
    }

    /// Set the command by name
    ///
    /// # Errors
    ///
    /// Returns `IacError::InvalidCommand` listing every valid name
    pub fn with_command_name(&mut self, name: &str) -> Result<&mut Self, IacError> {
        self.command = Some(name.parse()?);
        Ok(self)
    }

    /// Major version of the installed terragrunt, drives flag spelling
    pub const fn with_major_version(&mut self, major_version: u64) -> &mut Self {
        self.options.major_version = major_version;
        self
    }

    pub const fn with_run_all(&mut self, enabled: bool) -> &mut Self {
        self.options.run_all = enabled;
        self
    }

    pub const fn with_no_auto_init(&mut self, enabled: bool) -> &mut Self {
        self.options.no_auto_init = enabled;
        self
    }

    pub const fn with_no_auto_retry(&mut self, enabled: bool) -> &mut Self {
        self.options.no_auto_retry = enabled;
        self
    }

    pub const fn with_non_interactive(&mut self, enabled: bool) -> &mut Self {
        self.options.non_interactive = enabled;
        self
    }

    pub const fn with_ignore_dependency_errors(&mut self, enabled: bool) -> &mut Self {
        self.options.ignore_dependency_errors = enabled;
        self
    }

    pub const fn with_ignore_external_dependencies(&mut self, enabled: bool) -> &mut Self {
        self.options.ignore_external_dependencies = enabled;
        self
    }

    pub const fn with_include_external_dependencies(&mut self, enabled: bool) -> &mut Self {
        self.options.include_external_dependencies = enabled;
        self
    }

    pub const fn with_strict_include(&mut self, enabled: bool) -> &mut Self {
        self.options.strict_include = enabled;
        self
    }

    /// # Errors
    /// Returns an error if `path` is empty
    pub fn with_terragrunt_config(&mut self, path: &str) -> Result<&mut Self, IacError> {
        self.options.config = Some(non_empty("terragrunt config", path)?);
        Ok(self)
    }

    /// # Errors
    /// Returns an error if `dir` is empty
    pub fn with_terragrunt_working_dir(&mut self, dir: &str) -> Result<&mut Self, IacError> {
        self.options.working_dir = Some(non_empty("terragrunt working dir", dir)?);
        Ok(self)
    }

    /// Rendered only together with run-all
    ///
    /// # Errors
    /// Returns an error if `parallelism` is less than one
    pub fn with_terragrunt_parallelism(&mut self, parallelism: i64) -> Result<&mut Self, IacError> {
        self.options.parallelism = Some(positive("terragrunt parallelism", parallelism)?);
        Ok(self)
    }

    /// # Errors
    /// Returns an error if `source` is empty
    pub fn with_terragrunt_source(&mut self, source: &str) -> Result<&mut Self, IacError> {
        self.options.source = Some(non_empty("terragrunt source", source)?);
        Ok(self)
    }

    /// Replace module source `original` with `replacement`
    ///
    /// # Errors
    /// Returns an error if either side is empty
    pub fn with_source_map(
        &mut self,
        original: &str,
        replacement: &str,
    ) -> Result<&mut Self, IacError> {
        let original = non_empty("source map source", original)?;
        let replacement = non_empty("source map replacement", replacement)?;
        self.options.source_map.insert(original, replacement);
        Ok(self)
    }

    /// # Errors
    /// Returns an error if any entry is empty
    pub fn with_source_maps<I, K, V>(&mut self, entries: I) -> Result<&mut Self, IacError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (original, replacement) in entries {
            self.with_source_map(original.as_ref(), replacement.as_ref())?;
        }
        Ok(self)
    }

    /// # Errors
    /// Returns an error if `dir` is empty
    pub fn with_include_dir(&mut self, dir: &str) -> Result<&mut Self, IacError> {
        let dir = non_empty("include dir", dir)?;
        push_unique(&mut self.options.include_dirs, dir);
        Ok(self)
    }

    /// # Errors
    /// Returns an error if any entry is empty
    pub fn with_include_dirs<I, S>(&mut self, dirs: I) -> Result<&mut Self, IacError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for dir in dirs {
            self.with_include_dir(dir.as_ref())?;
        }
        Ok(self)
    }

    /// # Errors
    /// Returns an error if `dir` is empty
    pub fn with_exclude_dir(&mut self, dir: &str) -> Result<&mut Self, IacError> {
        let dir = non_empty("exclude dir", dir)?;
        push_unique(&mut self.options.exclude_dirs, dir);
        Ok(self)
    }

    /// # Errors
    /// Returns an error if any entry is empty
    pub fn with_exclude_dirs<I, S>(&mut self, dirs: I) -> Result<&mut Self, IacError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for dir in dirs {
            self.with_exclude_dir(dir.as_ref())?;
        }
        Ok(self)
    }

    /// # Errors
    /// Returns an error if `dir` is empty
    pub fn with_download_dir(&mut self, dir: &str) -> Result<&mut Self, IacError> {
        self.options.download_dir = Some(non_empty("download dir", dir)?);
        Ok(self)
    }

    /// # Errors
    /// Returns an error if `role` is empty
    pub fn with_iam_role(&mut self, role: &str) -> Result<&mut Self, IacError> {
        self.options.iam_role = Some(non_empty("iam role", role)?);
        Ok(self)
    }

    /// Only rendered when an IAM role is set
    ///
    /// # Errors
    /// Returns an error if `name` is empty
    pub fn with_iam_role_session_name(&mut self, name: &str) -> Result<&mut Self, IacError> {
        self.options.iam_role_session_name = Some(non_empty("iam role session name", name)?);
        Ok(self)
    }

    /// Back to the just-constructed state, terragrunt options included
    pub fn reset(&mut self) -> &mut Self {
        *self = Self::default();
        self
    }

    /// Snapshot the accumulated configuration into a service
    ///
    /// # Errors
    ///
    /// Returns `IacError::MissingCommand` if no command was set
    pub fn build(&self) -> Result<TerragruntService, IacError> {
        let command = self.command.ok_or(IacError::MissingCommand {
            tool: TERRAGRUNT_EXECUTOR,
        })?;
        Ok(TerragruntService {
            command,
            core: self.core.clone(),
            options: self.options.clone(),
        })
    }
}

impl SharedBuilder for TerragruntBuilder {
    fn core_mut(&mut self) -> &mut CoreConfig {
        &mut self.core
    }
}

/// Immutable terragrunt invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerragruntService {
    command: TerragruntCommand,
    core: CoreConfig,
    options: TerragruntOptions,
}

impl TerragruntService {
    #[must_use]
    pub const fn command(&self) -> TerragruntCommand {
        self.command
    }

    #[must_use]
    pub fn working_directory(&self) -> &str {
        &self.core.working_directory
    }

    #[must_use]
    pub const fn environment(&self) -> &IndexMap<String, String> {
        &self.core.environment
    }

    #[must_use]
    pub const fn variables(&self) -> &IndexMap<String, String> {
        &self.core.variables
    }

    #[must_use]
    pub const fn backend_config(&self) -> &IndexMap<String, String> {
        &self.core.backend_config
    }

    #[must_use]
    pub fn var_files(&self) -> &[String] {
        &self.core.var_files
    }

    #[must_use]
    pub fn targets(&self) -> &[String] {
        &self.core.targets
    }

    #[must_use]
    pub const fn auto_approve(&self) -> bool {
        self.core.auto_approve
    }

    #[must_use]
    pub const fn dry_run(&self) -> bool {
        self.core.dry_run
    }

    #[must_use]
    pub const fn no_color(&self) -> bool {
        self.core.no_color
    }

    #[must_use]
    pub const fn compact_warnings(&self) -> bool {
        self.core.compact_warnings
    }

    #[must_use]
    pub const fn refresh(&self) -> bool {
        self.core.refresh
    }

    #[must_use]
    pub const fn reconfigure(&self) -> bool {
        self.core.reconfigure
    }

    #[must_use]
    pub const fn migrate_state(&self) -> bool {
        self.core.migrate_state
    }

    #[must_use]
    pub fn plan_file(&self) -> Option<&str> {
        self.core.plan_file.as_deref()
    }

    #[must_use]
    pub fn out_file(&self) -> Option<&str> {
        self.core.out_file.as_deref()
    }

    #[must_use]
    pub const fn parallelism(&self) -> Option<NonZeroU32> {
        self.core.parallelism
    }

    #[must_use]
    pub fn lock_timeout(&self) -> Option<&str> {
        self.core.lock_timeout.as_deref()
    }

    /// Terragrunt-only settings
    #[must_use]
    pub const fn options(&self) -> &TerragruntOptions {
        &self.options
    }

    #[must_use]
    pub const fn run_all(&self) -> bool {
        self.options.run_all
    }

    #[must_use]
    pub const fn no_auto_init(&self) -> bool {
        self.options.no_auto_init
    }

    #[must_use]
    pub const fn no_auto_retry(&self) -> bool {
        self.options.no_auto_retry
    }

    #[must_use]
    pub const fn non_interactive(&self) -> bool {
        self.options.non_interactive
    }

    #[must_use]
    pub const fn ignore_dependency_errors(&self) -> bool {
        self.options.ignore_dependency_errors
    }

    #[must_use]
    pub const fn ignore_external_dependencies(&self) -> bool {
        self.options.ignore_external_dependencies
    }

    #[must_use]
    pub const fn include_external_dependencies(&self) -> bool {
        self.options.include_external_dependencies
    }

    #[must_use]
    pub const fn strict_include(&self) -> bool {
        self.options.strict_include
    }

    #[must_use]
    pub fn terragrunt_config(&self) -> Option<&str> {
        self.options.config.as_deref()
    }

    #[must_use]
    pub fn terragrunt_working_dir(&self) -> Option<&str> {
        self.options.working_dir.as_deref()
    }

    /// Only rendered together with run-all
    #[must_use]
    pub const fn terragrunt_parallelism(&self) -> Option<NonZeroU32> {
        self.options.parallelism
    }

    #[must_use]
    pub fn terragrunt_source(&self) -> Option<&str> {
        self.options.source.as_deref()
    }

    #[must_use]
    pub fn download_dir(&self) -> Option<&str> {
        self.options.download_dir.as_deref()
    }

    #[must_use]
    pub fn iam_role(&self) -> Option<&str> {
        self.options.iam_role.as_deref()
    }

    #[must_use]
    pub fn iam_role_session_name(&self) -> Option<&str> {
        self.options.iam_role_session_name.as_deref()
    }

    #[must_use]
    pub const fn major_version(&self) -> u64 {
        self.options.major_version
    }

    #[must_use]
    pub fn include_dirs(&self) -> &[String] {
        &self.options.include_dirs
    }

    #[must_use]
    pub fn exclude_dirs(&self) -> &[String] {
        &self.options.exclude_dirs
    }

    #[must_use]
    pub const fn source_map(&self) -> &IndexMap<String, String> {
        &self.options.source_map
    }

    /// `terragrunt <command tokens> [args]`
    ///
    /// # Errors
    ///
    /// Returns `IacError::UnsupportedCommand` when the command was removed in
    /// the configured major version
    pub fn build_command(&self) -> Result<Vec<String>, IacError> {
        let mut tokens = vec![TERRAGRUNT_EXECUTOR.to_owned()];
        tokens.extend(command_tokens(
            self.command,
            self.options.run_all,
            self.options.major_version,
        )?);
        tokens.extend(self.to_command_args()?);
        Ok(tokens)
    }

    /// Terragrunt global flags followed by the terraform arguments
    ///
    /// # Errors
    ///
    /// Returns `IacError::UnknownFlag` on a flag table defect
    pub fn to_command_args(&self) -> Result<Vec<String>, IacError> {
        let mut args = Vec::new();
        render_terragrunt_arguments(&self.options, &mut args)?;
        render_shared_arguments(self.command.terraform_command(), &self.core, &mut args);
        Ok(args)
    }

    /// # Errors
    /// Propagates `build_command` errors
    pub fn to_command_string(&self) -> Result<String, IacError> {
        Ok(format::single_line(&self.build_command()?))
    }

    /// # Errors
    /// Propagates `build_command` errors
    pub fn to_multi_line_command(&self) -> Result<String, IacError> {
        Ok(format::multi_line(&self.build_command()?))
    }

    /// Back to defaults, keeping the command
    pub fn reset(&mut self) {
        self.core = CoreConfig::default();
        self.options = TerragruntOptions::default();
    }
}

impl IacService for TerragruntService {
    fn executor(&self) -> &'static str {
        TERRAGRUNT_EXECUTOR
    }

    fn command_name(&self) -> &'static str {
        self.command.as_str()
    }

    fn core(&self) -> &CoreConfig {
        &self.core
    }

    fn command_line(&self) -> Result<Vec<String>, IacError> {
        self.build_command()
    }

    fn command_args(&self) -> Result<Vec<String>, IacError> {
        self.to_command_args()
    }
}
