//! Common surface of the built services

use super::shared::CoreConfig;
use super::format;
use crate::error::IacError;

/// A built, immutable command configuration
///
/// Implemented by `TerraformService` and `TerragruntService`; the runner
/// drives either through this trait.
pub trait IacService {
    /// Executable name, e.g. `terraform`
    fn executor(&self) -> &'static str;

    /// Subcommand name as configured (before any version translation)
    fn command_name(&self) -> &'static str;

    fn core(&self) -> &CoreConfig;

    /// Full invocation: executable, command tokens, arguments
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be expressed for the
    /// configured tool version
    fn command_line(&self) -> Result<Vec<String>, IacError>;

    /// Arguments only, without executable or command tokens
    ///
    /// # Errors
    ///
    /// Returns an error if a flag spelling cannot be resolved
    fn command_args(&self) -> Result<Vec<String>, IacError>;

    /// Single shell-safe line
    ///
    /// # Errors
    ///
    /// Propagates `command_line` errors
    fn command_string(&self) -> Result<String, IacError> {
        Ok(format::single_line(&self.command_line()?))
    }

    /// Backslash-continued block, one flag per line
    ///
    /// # Errors
    ///
    /// Propagates `command_line` errors
    fn multi_line_command(&self) -> Result<String, IacError> {
        Ok(format::multi_line(&self.command_line()?))
    }
}
