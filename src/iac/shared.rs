//! Configuration shared by every terraform-compatible tool
//!
//! `CoreConfig` holds the fields terraform and terragrunt have in common,
//! `SharedBuilder` gives both builders the same validating setters on top
//! of it, and `render_shared_arguments` emits the terraform argument
//! categories in the order the CLI expects.

use core::num::NonZeroU32;

use indexmap::IndexMap;

use super::command::TerraformCommand;
use crate::error::IacError;

pub const DEFAULT_WORKING_DIRECTORY: &str = ".";

/// Tool-agnostic configuration snapshot
///
/// Maps keep first-insertion order with last-write-wins values; lists are
/// ordered sets, so re-adding an entry is a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub working_directory: String,
    pub environment: IndexMap<String, String>,
    pub variables: IndexMap<String, String>,
    pub backend_config: IndexMap<String, String>,
    pub var_files: Vec<String>,
    pub targets: Vec<String>,
    pub auto_approve: bool,
    pub dry_run: bool,
    pub no_color: bool,
    pub compact_warnings: bool,
    pub refresh: bool,
    pub reconfigure: bool,
    pub migrate_state: bool,
    pub plan_file: Option<String>,
    pub out_file: Option<String>,
    pub parallelism: Option<NonZeroU32>,
    pub lock_timeout: Option<String>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            working_directory: DEFAULT_WORKING_DIRECTORY.to_owned(),
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
        }
    }
}

/// Reject empty or whitespace-only strings
///
/// # Errors
///
/// Returns `IacError::InvalidValue` naming `field`
#[inline]
pub fn non_empty(field: &'static str, value: &str) -> Result<String, IacError> {
    if value.trim().is_empty() {
        return Err(IacError::invalid_value(field, value, "must not be empty"));
    }
    Ok(value.to_owned())
}

/// Accept integers of at least one
///
/// # Errors
///
/// Returns `IacError::InvalidValue` for zero, negative or oversized values
#[inline]
pub fn positive(field: &'static str, value: i64) -> Result<NonZeroU32, IacError> {
    u32::try_from(value)
        .ok()
        .and_then(NonZeroU32::new)
        .ok_or_else(|| {
            IacError::invalid_value(field, value.to_string(), "must be an integer >= 1")
        })
}

/// Append unless already present, keeping first-seen order
#[inline]
pub fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

/// Validating setters shared by the terraform and terragrunt builders
///
/// Every string setter rejects empty input at call time; list setters ignore
/// duplicates; map setters overwrite the value of an existing key.
pub trait SharedBuilder: Sized {
    fn core_mut(&mut self) -> &mut CoreConfig;

    /// # Errors
    /// Returns an error if `directory` is empty
    fn with_working_directory(&mut self, directory: &str) -> Result<&mut Self, IacError> {
        self.core_mut().working_directory = non_empty("working directory", directory)?;
        Ok(self)
    }

    /// Environment variable passed to the spawned process
    ///
    /// # Errors
    /// Returns an error if `key` is empty
    fn with_environment_variable(&mut self, key: &str, value: &str) -> Result<&mut Self, IacError> {
        let key = non_empty("environment variable name", key)?;
        self.core_mut().environment.insert(key, value.to_owned());
        Ok(self)
    }

    /// # Errors
    /// Returns an error if any key is empty
    fn with_environment<I, K, V>(&mut self, environment: I) -> Result<&mut Self, IacError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in environment {
            self.with_environment_variable(key.as_ref(), value.as_ref())?;
        }
        Ok(self)
    }

    /// `-var key=value`
    ///
    /// # Errors
    /// Returns an error if `key` is empty
    fn with_variable(&mut self, key: &str, value: &str) -> Result<&mut Self, IacError> {
        let key = non_empty("variable name", key)?;
        self.core_mut().variables.insert(key, value.to_owned());
        Ok(self)
    }

    /// # Errors
    /// Returns an error if any key is empty
    fn with_variables<I, K, V>(&mut self, variables: I) -> Result<&mut Self, IacError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in variables {
            self.with_variable(key.as_ref(), value.as_ref())?;
        }
        Ok(self)
    }

    /// `-backend-config=key=value`, rendered for `init` only
    ///
    /// # Errors
    /// Returns an error if `key` is empty
    fn with_backend_config(&mut self, key: &str, value: &str) -> Result<&mut Self, IacError> {
        let key = non_empty("backend config key", key)?;
        self.core_mut().backend_config.insert(key, value.to_owned());
        Ok(self)
    }

    /// # Errors
    /// Returns an error if any key is empty
    fn with_backend_configs<I, K, V>(&mut self, entries: I) -> Result<&mut Self, IacError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in entries {
            self.with_backend_config(key.as_ref(), value.as_ref())?;
        }
        Ok(self)
    }

    /// # Errors
    /// Returns an error if `path` is empty
    fn with_var_file(&mut self, path: &str) -> Result<&mut Self, IacError> {
        let path = non_empty("var file", path)?;
        push_unique(&mut self.core_mut().var_files, path);
        Ok(self)
    }

    /// # Errors
    /// Returns an error if any path is empty
    fn with_var_files<I, S>(&mut self, paths: I) -> Result<&mut Self, IacError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for path in paths {
            self.with_var_file(path.as_ref())?;
        }
        Ok(self)
    }

    /// # Errors
    /// Returns an error if `address` is empty
    fn with_target(&mut self, address: &str) -> Result<&mut Self, IacError> {
        let address = non_empty("target", address)?;
        push_unique(&mut self.core_mut().targets, address);
        Ok(self)
    }

    /// # Errors
    /// Returns an error if any address is empty
    fn with_targets<I, S>(&mut self, addresses: I) -> Result<&mut Self, IacError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for address in addresses {
            self.with_target(address.as_ref())?;
        }
        Ok(self)
    }

    fn with_auto_approve(&mut self, enabled: bool) -> &mut Self {
        self.core_mut().auto_approve = enabled;
        self
    }

    fn with_dry_run(&mut self, enabled: bool) -> &mut Self {
        self.core_mut().dry_run = enabled;
        self
    }

    fn with_no_color(&mut self, enabled: bool) -> &mut Self {
        self.core_mut().no_color = enabled;
        self
    }

    fn with_compact_warnings(&mut self, enabled: bool) -> &mut Self {
        self.core_mut().compact_warnings = enabled;
        self
    }

    fn with_refresh(&mut self, enabled: bool) -> &mut Self {
        self.core_mut().refresh = enabled;
        self
    }

    fn with_reconfigure(&mut self, enabled: bool) -> &mut Self {
        self.core_mut().reconfigure = enabled;
        self
    }

    fn with_migrate_state(&mut self, enabled: bool) -> &mut Self {
        self.core_mut().migrate_state = enabled;
        self
    }

    /// Saved plan: positional for `apply`, `-out` fallback for `plan`
    ///
    /// # Errors
    /// Returns an error if `path` is empty
    fn with_plan_file(&mut self, path: &str) -> Result<&mut Self, IacError> {
        self.core_mut().plan_file = Some(non_empty("plan file", path)?);
        Ok(self)
    }

    /// # Errors
    /// Returns an error if `path` is empty
    fn with_out_file(&mut self, path: &str) -> Result<&mut Self, IacError> {
        self.core_mut().out_file = Some(non_empty("out file", path)?);
        Ok(self)
    }

    /// # Errors
    /// Returns an error if `parallelism` is less than one
    fn with_parallelism(&mut self, parallelism: i64) -> Result<&mut Self, IacError> {
        self.core_mut().parallelism = Some(positive("parallelism", parallelism)?);
        Ok(self)
    }

    /// # Errors
    /// Returns an error if `timeout` is empty
    fn with_lock_timeout(&mut self, timeout: &str) -> Result<&mut Self, IacError> {
        self.core_mut().lock_timeout = Some(non_empty("lock timeout", timeout)?);
        Ok(self)
    }
}

/// Append the terraform-compatible arguments for `command`
///
/// `None` means a tool-native command that only takes the flags common to
/// every command.
#[inline]
pub fn render_shared_arguments(
    command: Option<TerraformCommand>,
    config: &CoreConfig,
    args: &mut Vec<String>,
) {
    if let Some(command) = command {
        if command.accepts_backend_config() {
            render_init_arguments(config, args);
        }
        if command.accepts_variables() {
            render_variable_arguments(config, args);
        }
        if command.accepts_targets() {
            args.extend(config.targets.iter().map(|t| format!("-target={t}")));
        }
        if command == TerraformCommand::Plan {
            render_plan_arguments(config, args);
        }
        if command.accepts_auto_approve() {
            render_auto_approve_arguments(config, args);
        }
    }

    render_common_arguments(config, args);

    // Positional plan file has to be the last token
    if command == Some(TerraformCommand::Apply)
        && let Some(plan_file) = config.plan_file.as_ref()
    {
        args.push(plan_file.clone());
    }
}

fn render_init_arguments(config: &CoreConfig, args: &mut Vec<String>) {
    args.extend(
        config
            .backend_config
            .iter()
            .map(|(key, value)| format!("-backend-config={key}={value}")),
    );
    if config.reconfigure {
        args.push("-reconfigure".to_owned());
    }
    if config.migrate_state {
        args.push("-migrate-state".to_owned());
    }
}

fn render_variable_arguments(config: &CoreConfig, args: &mut Vec<String>) {
    args.extend(config.var_files.iter().map(|f| format!("-var-file={f}")));
    for (key, value) in &config.variables {
        args.push("-var".to_owned());
        args.push(format!("{key}={value}"));
    }
}

fn render_plan_arguments(config: &CoreConfig, args: &mut Vec<String>) {
    if let Some(out) = config.out_file.as_ref().or(config.plan_file.as_ref()) {
        args.push(format!("-out={out}"));
    }
    if !config.refresh {
        args.push("-refresh=false".to_owned());
    }
}

fn render_auto_approve_arguments(config: &CoreConfig, args: &mut Vec<String>) {
    if config.auto_approve {
        args.push("-auto-approve".to_owned());
    }
    if !config.refresh {
        args.push("-refresh=false".to_owned());
    }
}

fn render_common_arguments(config: &CoreConfig, args: &mut Vec<String>) {
    if let Some(parallelism) = config.parallelism {
        args.push(format!("-parallelism={parallelism}"));
    }
    if let Some(timeout) = config.lock_timeout.as_ref() {
        args.push(format!("-lock-timeout={timeout}"));
    }
    if config.no_color {
        args.push("-no-color".to_owned());
    }
    if config.compact_warnings {
        args.push("-compact-warnings".to_owned());
    }
}
