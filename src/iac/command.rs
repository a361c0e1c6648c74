//! Command enumerations for the wrapped tools

use core::fmt;
use core::str::FromStr;

use crate::error::IacError;

/// Wrapped tool identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Tool {
    Terraform,
    Terragrunt,
}

impl Tool {
    /// Executable name, also used as the input prefix (`<tool>-version`)
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Terraform => "terraform",
            Self::Terragrunt => "terragrunt",
        }
    }

    /// Pin file read from the working directory when no version is given
    #[must_use]
    pub const fn version_file(self) -> &'static str {
        match self {
            Self::Terraform => ".terraform-version",
            Self::Terragrunt => ".terragrunt-version",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terraform subcommands the toolkit knows how to render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum TerraformCommand {
    Init,
    Plan,
    Apply,
    Destroy,
    Output,
    Show,
    State,
    Import,
    Refresh,
    Taint,
    Untaint,
    Workspace,
    Validate,
    Fmt,
}

impl TerraformCommand {
    pub const ALL: [Self; 14] = [
        Self::Init,
        Self::Plan,
        Self::Apply,
        Self::Destroy,
        Self::Output,
        Self::Show,
        Self::State,
        Self::Import,
        Self::Refresh,
        Self::Taint,
        Self::Untaint,
        Self::Workspace,
        Self::Validate,
        Self::Fmt,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Plan => "plan",
            Self::Apply => "apply",
            Self::Destroy => "destroy",
            Self::Output => "output",
            Self::Show => "show",
            Self::State => "state",
            Self::Import => "import",
            Self::Refresh => "refresh",
            Self::Taint => "taint",
            Self::Untaint => "untaint",
            Self::Workspace => "workspace",
            Self::Validate => "validate",
            Self::Fmt => "fmt",
        }
    }

    /// All command names, in declaration order
    #[must_use]
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|c| c.as_str()).collect()
    }

    /// `-backend-config`, `-reconfigure`, `-migrate-state`
    #[must_use]
    pub const fn accepts_backend_config(self) -> bool {
        matches!(self, Self::Init)
    }

    /// `-var-file` and `-var`
    #[must_use]
    pub const fn accepts_variables(self) -> bool {
        matches!(
            self,
            Self::Plan | Self::Apply | Self::Destroy | Self::Refresh | Self::Import
        )
    }

    /// `-target`
    #[must_use]
    pub const fn accepts_targets(self) -> bool {
        matches!(
            self,
            Self::Plan
                | Self::Apply
                | Self::Destroy
                | Self::Refresh
                | Self::Taint
                | Self::Untaint
        )
    }

    /// `-auto-approve`
    #[must_use]
    pub const fn accepts_auto_approve(self) -> bool {
        matches!(self, Self::Apply | Self::Destroy)
    }
}

impl fmt::Display for TerraformCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TerraformCommand {
    type Err = IacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| IacError::InvalidCommand {
                tool: "terraform",
                value: s.to_owned(),
                valid: Self::names(),
            })
    }
}

/// Terragrunt commands: every terraform command plus terragrunt's own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum TerragruntCommand {
    Terraform(TerraformCommand),
    RunAll,
    GraphDependencies,
    Hclfmt,
    AwsProviderPatch,
    RenderJson,
    OutputModuleGroups,
    ValidateInputs,
}

impl TerragruntCommand {
    const NATIVE: [Self; 7] = [
        Self::RunAll,
        Self::GraphDependencies,
        Self::Hclfmt,
        Self::AwsProviderPatch,
        Self::RenderJson,
        Self::OutputModuleGroups,
        Self::ValidateInputs,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Terraform(command) => command.as_str(),
            Self::RunAll => "run-all",
            Self::GraphDependencies => "graph-dependencies",
            Self::Hclfmt => "hclfmt",
            Self::AwsProviderPatch => "aws-provider-patch",
            Self::RenderJson => "render-json",
            Self::OutputModuleGroups => "output-module-groups",
            Self::ValidateInputs => "validate-inputs",
        }
    }

    /// Every terragrunt command, terraform-compatible ones first
    #[must_use]
    pub fn all() -> Vec<Self> {
        TerraformCommand::ALL
            .into_iter()
            .map(Self::Terraform)
            .chain(Self::NATIVE)
            .collect()
    }

    #[must_use]
    pub fn names() -> Vec<&'static str> {
        Self::all().into_iter().map(Self::as_str).collect()
    }

    /// The terraform command this passes through to, if any
    #[must_use]
    pub const fn terraform_command(self) -> Option<TerraformCommand> {
        match self {
            Self::Terraform(command) => Some(command),
            _ => None,
        }
    }
}

impl From<TerraformCommand> for TerragruntCommand {
    fn from(command: TerraformCommand) -> Self {
        Self::Terraform(command)
    }
}

impl fmt::Display for TerragruntCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TerragruntCommand {
    type Err = IacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| IacError::InvalidCommand {
                tool: "terragrunt",
                value: s.to_owned(),
                valid: Self::names(),
            })
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "These are unit tests")]
mod tests {
    use super::*;

    #[test]
    fn terraform_parse_round_trips_names() {
        for command in TerraformCommand::ALL {
            assert_eq!(command.as_str().parse::<TerraformCommand>().unwrap(), command);
        }
    }

    #[test]
    fn terraform_rejects_unknown_with_valid_list() {
        let err = "deploy".parse::<TerraformCommand>().unwrap_err();
        match err {
            IacError::InvalidCommand { value, valid, .. } => {
                assert_eq!(value, "deploy");
                assert_eq!(valid.len(), 14);
                assert!(valid.contains(&"plan"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn terraform_rejects_terragrunt_only_commands() {
        "hclfmt".parse::<TerraformCommand>().unwrap_err();
        "run-all".parse::<TerraformCommand>().unwrap_err();
    }

    #[test]
    fn terragrunt_parses_both_families() {
        assert_eq!(
            "plan".parse::<TerragruntCommand>().unwrap(),
            TerragruntCommand::Terraform(TerraformCommand::Plan)
        );
        assert_eq!(
            "render-json".parse::<TerragruntCommand>().unwrap(),
            TerragruntCommand::RenderJson
        );
        assert_eq!(TerragruntCommand::names().len(), 21);
    }

    #[test]
    fn category_membership() {
        assert!(TerraformCommand::Init.accepts_backend_config());
        assert!(!TerraformCommand::Plan.accepts_backend_config());
        assert!(TerraformCommand::Import.accepts_variables());
        assert!(!TerraformCommand::Import.accepts_targets());
        assert!(TerraformCommand::Taint.accepts_targets());
        assert!(!TerraformCommand::Taint.accepts_variables());
        assert!(TerraformCommand::Destroy.accepts_auto_approve());
        assert!(!TerraformCommand::Plan.accepts_auto_approve());
    }
}
