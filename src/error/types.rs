//! Custom error types with exit codes

use thiserror::Error;

/// Main error type for iac-toolkit operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IacError {
    /// Command name is not part of the tool's command set
    #[error("Invalid {tool} command '{value}'. Valid commands: {}", valid.join(", "))]
    InvalidCommand {
        tool: &'static str,
        value: String,
        valid: Vec<&'static str>,
    },

    /// A configuration value failed validation
    #[error("Invalid value for {field} '{value}': {reason}")]
    InvalidValue {
        field: &'static str,
        value: String,
        reason: String,
    },

    /// `build()` was called before any command was set
    #[error("Configuration error: no {tool} command was set")]
    MissingCommand { tool: &'static str },

    /// Flag key missing from the terragrunt flag table
    #[error("Unknown terragrunt flag key '{key}'")]
    UnknownFlag { key: String },

    /// Command has no equivalent in the installed terragrunt major version
    #[error(
        "Terragrunt command '{command}' is not available in v{major_version}.x: it was removed in v1 and has no v1 equivalent"
    )]
    UnsupportedCommand { command: String, major_version: u64 },

    /// Missing or malformed action input
    #[error("Input error ({name}): {message}")]
    Input { name: String, message: String },

    /// Version resolution or detection failed
    #[error("Version error: {message}")]
    Version { message: String },

    /// The wrapped tool exited with a non-zero status
    #[error("Execution error: {message} (exit code {exit_code})")]
    Execution { exit_code: i32, message: String },

    /// The agent failed to spawn a process or publish outputs
    #[error("System error: {message}")]
    System { message: String },
}

impl IacError {
    /// Get the appropriate exit code for this error type
    #[must_use]
    #[inline]
    pub const fn exit_code(&self) -> i32 {
        match *self {
            Self::InvalidCommand { .. }
            | Self::InvalidValue { .. }
            | Self::MissingCommand { .. }
            | Self::UnsupportedCommand { .. }
            | Self::Input { .. } => 1,
            Self::Version { .. } => 2,
            Self::Execution { .. } => 3,
            Self::System { .. } => 4,
            Self::UnknownFlag { .. } => 70,
        }
    }

    /// Create an invalid value error
    #[inline]
    pub fn invalid_value<V: Into<String>, R: Into<String>>(
        field: &'static str,
        value: V,
        reason: R,
    ) -> Self {
        Self::InvalidValue {
            field,
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an input error
    #[inline]
    pub fn input<N: Into<String>, M: Into<String>>(name: N, message: M) -> Self {
        Self::Input {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a version error
    #[inline]
    pub fn version<S: Into<String>>(message: S) -> Self {
        Self::Version {
            message: message.into(),
        }
    }

    /// Create a system error
    #[inline]
    pub fn system<S: Into<String>>(message: S) -> Self {
        Self::System {
            message: message.into(),
        }
    }
}
