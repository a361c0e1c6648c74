//! Terraform builder and service

use core::fmt;
use core::num::NonZeroU32;

use indexmap::IndexMap;

use super::command::TerraformCommand;
use super::shared::{CoreConfig, SharedBuilder, render_shared_arguments};
use super::format;
use super::service::IacService;
use crate::error::IacError;

pub const TERRAFORM_EXECUTOR: &str = "terraform";

/// Fluent, validating accumulator for a terraform invocation
///
/// # Example
/// ```
/// use iac_toolkit::iac::{SharedBuilder as _, TerraformBuilder};
///
/// let service = TerraformBuilder::for_apply()
///     .with_auto_approve(true)
///     .with_plan_file("plan.tfplan").unwrap()
///     .build()
///     .unwrap();
///
/// assert_eq!(
///     service.build_command(),
///     vec!["terraform", "apply", "-auto-approve", "plan.tfplan"]
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct TerraformBuilder {
    command: Option<TerraformCommand>,
    core: CoreConfig,
}

impl TerraformBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn for_command(command: TerraformCommand) -> Self {
        Self {
            command: Some(command),
            core: CoreConfig::default(),
        }
    }

    #[must_use]
    pub fn for_init() -> Self {
        Self::for_command(TerraformCommand::Init)
    }

    #[must_use]
    pub fn for_plan() -> Self {
        Self::for_command(TerraformCommand::Plan)
    }

    #[must_use]
    pub fn for_apply() -> Self {
        Self::for_command(TerraformCommand::Apply)
    }

    #[must_use]
    pub fn for_destroy() -> Self {
        Self::for_command(TerraformCommand::Destroy)
    }

    #[must_use]
    pub fn for_validate() -> Self {
        Self::for_command(TerraformCommand::Validate)
    }

    #[must_use]
    pub fn for_output() -> Self {
        Self::for_command(TerraformCommand::Output)
    }

    #[must_use]
    pub fn for_fmt() -> Self {
        Self::for_command(TerraformCommand::Fmt)
    }

    pub fn with_command(&mut self, command: TerraformCommand) -> &mut Self {
        self.command = Some(command);
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

    /// Back to the just-constructed state, command included
    pub fn reset(&mut self) -> &mut Self {
        *self = Self::default();
        self
    }

    /// Snapshot the accumulated configuration into a service
    ///
    /// # Errors
    ///
    /// Returns `IacError::MissingCommand` if no command was set
    pub fn build(&self) -> Result<TerraformService, IacError> {
        let command = self.command.ok_or(IacError::MissingCommand {
            tool: TERRAFORM_EXECUTOR,
        })?;
        Ok(TerraformService {
            command,
            core: self.core.clone(),
        })
    }
}

impl SharedBuilder for TerraformBuilder {
    fn core_mut(&mut self) -> &mut CoreConfig {
        &mut self.core
    }
}

/// Immutable terraform invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerraformService {
    command: TerraformCommand,
    core: CoreConfig,
}

impl TerraformService {
    #[must_use]
    pub const fn command(&self) -> TerraformCommand {
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

    /// `terraform <command> [args]`
    #[must_use]
    pub fn build_command(&self) -> Vec<String> {
        let mut tokens = vec![
            TERRAFORM_EXECUTOR.to_owned(),
            self.command.as_str().to_owned(),
        ];
        tokens.extend(self.to_command_args());
        tokens
    }

    #[must_use]
    pub fn to_command_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        render_shared_arguments(Some(self.command), &self.core, &mut args);
        args
    }

    #[must_use]
    pub fn to_command_string(&self) -> String {
        format::single_line(&self.build_command())
    }

    #[must_use]
    pub fn to_multi_line_command(&self) -> String {
        format::multi_line(&self.build_command())
    }

    /// Back to defaults, keeping the command
    pub fn reset(&mut self) {
        self.core = CoreConfig::default();
    }
}

impl fmt::Display for TerraformService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_command_string())
    }
}

impl IacService for TerraformService {
    fn executor(&self) -> &'static str {
        TERRAFORM_EXECUTOR
    }

    fn command_name(&self) -> &'static str {
        self.command.as_str()
    }

    fn core(&self) -> &CoreConfig {
        &self.core
    }

    fn command_line(&self) -> Result<Vec<String>, IacError> {
        Ok(self.build_command())
    }

    fn command_args(&self) -> Result<Vec<String>, IacError> {
        Ok(self.to_command_args())
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "These are unit tests")]
mod tests {
    use super::*;

    #[test]
    fn basic_plan() {
        let service = TerraformBuilder::for_plan().build().unwrap();
        assert_eq!(service.build_command(), vec!["terraform", "plan"]);
        assert!(service.to_command_args().is_empty());
    }

    #[test]
    fn build_without_command_fails() {
        let err = TerraformBuilder::new().build().unwrap_err();
        assert_eq!(err, IacError::MissingCommand { tool: "terraform" });
    }

    #[test]
    fn command_name_is_validated() {
        let mut builder = TerraformBuilder::new();
        builder.with_command_name("deploy").unwrap_err();
        builder.with_command_name("validate").unwrap();
        assert_eq!(
            builder.build().unwrap().command(),
            TerraformCommand::Validate
        );
    }

    #[test]
    fn full_plan_ordering() {
        let service = TerraformBuilder::for_plan()
            .with_var_file("common.tfvars")
            .unwrap()
            .with_variable("region", "eu-west-1")
            .unwrap()
            .with_target("module.vpc")
            .unwrap()
            .with_out_file("plan.tfplan")
            .unwrap()
            .with_refresh(false)
            .with_parallelism(4)
            .unwrap()
            .with_lock_timeout("5m")
            .unwrap()
            .with_no_color(true)
            .with_compact_warnings(true)
            .build()
            .unwrap();

        assert_eq!(
            service.build_command(),
            vec![
                "terraform",
                "plan",
                "-var-file=common.tfvars",
                "-var",
                "region=eu-west-1",
                "-target=module.vpc",
                "-out=plan.tfplan",
                "-refresh=false",
                "-parallelism=4",
                "-lock-timeout=5m",
                "-no-color",
                "-compact-warnings",
            ]
        );
    }

    #[test]
    fn positional_plan_file_is_last() {
        let service = TerraformBuilder::for_apply()
            .with_auto_approve(true)
            .with_plan_file("plan.tfplan")
            .unwrap()
            .with_no_color(true)
            .build()
            .unwrap();
        let tokens = service.build_command();
        assert_eq!(tokens.last().unwrap(), "plan.tfplan");
        assert_eq!(tokens[tokens.len() - 2], "-no-color");
        assert!(!tokens.iter().any(|t| t.starts_with("-out")));
    }

    #[test]
    fn plan_file_ignored_outside_plan_and_apply() {
        let service = TerraformBuilder::for_destroy()
            .with_plan_file("plan.tfplan")
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(service.build_command(), vec!["terraform", "destroy"]);
    }

    #[test]
    fn display_is_single_line() {
        let service = TerraformBuilder::for_plan()
            .with_variable("name", "my app")
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(service.to_string(), r#"terraform plan -var "name=my app""#);
        assert_eq!(service.to_command_string(), service.to_string());
    }

    #[test]
    fn builder_mutation_after_build_is_isolated() {
        let mut builder = TerraformBuilder::for_plan();
        builder.with_target("a").unwrap();
        let service = builder.build().unwrap();
        builder.with_target("b").unwrap().with_variable("x", "1").unwrap();
        assert_eq!(service.targets(), ["a".to_owned()]);
        assert!(service.variables().is_empty());
    }

    #[test]
    fn builder_reset_clears_command() {
        let mut builder = TerraformBuilder::for_plan();
        builder.with_no_color(true).reset();
        builder.build().unwrap_err();
    }

    #[test]
    fn service_reset_keeps_command() {
        let mut service = TerraformBuilder::for_apply()
            .with_auto_approve(true)
            .build()
            .unwrap();
        service.reset();
        assert_eq!(service.build_command(), vec!["terraform", "apply"]);
        assert_eq!(service.working_directory(), ".");
    }
}
