//! Tool version resolution and detection
//!
//! Installing binaries is left to the workflow; this module only decides
//! which version was asked for and reports what is actually on PATH.

use core::fmt;
use std::path::Path;

use regex::Regex;
use tracing::debug;

use crate::error::IacError;
use crate::iac::Tool;
use crate::system::{ExecRequest, System};

/// Where a resolved version came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionSource {
    /// The `<tool>-version` input or settings key
    Input,
    /// `.terraform-version` / `.terragrunt-version` in the working directory
    VersionFile,
}

impl fmt::Display for VersionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Input => "input",
            Self::VersionFile => "version file",
        })
    }
}

/// A requested version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersion {
    /// Text as written by the user
    pub input: String,
    /// Normalized version, `v` prefix removed
    pub resolved: String,
    pub source: VersionSource,
}

impl ResolvedVersion {
    /// Leading numeric component of `resolved`
    #[must_use]
    pub fn major(&self) -> Option<u64> {
        self.resolved.split('.').next()?.parse().ok()
    }
}

/// Version reported by the binary on PATH
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    /// Full `--version` output
    pub raw: String,
}

impl InstalledVersion {
    /// Parse the first `X.Y.Z` triple out of `--version` output
    ///
    /// # Errors
    ///
    /// Returns `IacError::Version` if no triple is present
    pub fn parse(raw: &str) -> Result<Self, IacError> {
        let pattern = Regex::new(r"(\d+)\.(\d+)\.(\d+)")
            .map_err(|e| IacError::version(format!("Invalid version pattern: {e}")))?;
        let captures = pattern
            .captures(raw)
            .ok_or_else(|| IacError::version(format!("No version number in '{}'", raw.trim())))?;

        let component = |index: usize| -> Result<u64, IacError> {
            captures[index]
                .parse()
                .map_err(|e| IacError::version(format!("Invalid version component: {e}")))
        };

        Ok(Self {
            major: component(1)?,
            minor: component(2)?,
            patch: component(3)?,
            raw: raw.to_owned(),
        })
    }

    /// `X.Y.Z` without any surrounding text
    #[must_use]
    pub fn triple(&self) -> String {
        format!("{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Version collaborator consumed by the runner
pub trait VersionManager {
    /// Decide which version of `tool` is wanted
    ///
    /// `None` means use whatever is already on PATH.
    ///
    /// # Errors
    ///
    /// Returns `IacError::Version` for a malformed version specifier
    fn resolve(
        &self,
        tool: Tool,
        input: Option<&str>,
        working_dir: &Path,
    ) -> Result<Option<ResolvedVersion>, IacError>;

    /// Ask the installed binary for its version
    ///
    /// # Errors
    ///
    /// Returns `IacError::Version` if the binary cannot be run or its output
    /// has no version number
    fn detect_installed(&self, tool: Tool) -> Result<InstalledVersion, IacError>;
}

/// Resolves against inputs and pin files, detects through `<tool> --version`
pub struct PathVersionManager<'sys> {
    system: &'sys dyn System,
}

impl<'sys> PathVersionManager<'sys> {
    #[must_use]
    pub fn new(system: &'sys dyn System) -> Self {
        Self { system }
    }

    fn read_version_file(&self, tool: Tool, working_dir: &Path) -> Option<String> {
        let path = working_dir.join(tool.version_file());
        if !self.system.exists(&path) {
            return None;
        }
        let contents = self.system.read_to_string(&path).ok()?;
        debug!("Read {}", path.display());
        contents
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_owned)
    }
}

fn is_latest(value: &str) -> bool {
    value.is_empty() || value.eq_ignore_ascii_case("latest")
}

fn normalize(input: &str, source: VersionSource) -> Result<ResolvedVersion, IacError> {
    let trimmed = input.trim();
    let resolved = trimmed.strip_prefix('v').unwrap_or(trimmed);

    let pattern = Regex::new(r"^\d+(\.\d+){0,2}(-[0-9A-Za-z.-]+)?$")
        .map_err(|e| IacError::version(format!("Invalid version pattern: {e}")))?;
    if !pattern.is_match(resolved) {
        return Err(IacError::version(format!(
            "'{input}' from {source} is not a version number"
        )));
    }

    Ok(ResolvedVersion {
        input: input.to_owned(),
        resolved: resolved.to_owned(),
        source,
    })
}

impl VersionManager for PathVersionManager<'_> {
    fn resolve(
        &self,
        tool: Tool,
        input: Option<&str>,
        working_dir: &Path,
    ) -> Result<Option<ResolvedVersion>, IacError> {
        if let Some(input) = input
            && !is_latest(input.trim())
        {
            return normalize(input, VersionSource::Input).map(Some);
        }

        match self.read_version_file(tool, working_dir) {
            Some(pinned) if !is_latest(&pinned) => {
                normalize(&pinned, VersionSource::VersionFile).map(Some)
            }
            _ => Ok(None),
        }
    }

    fn detect_installed(&self, tool: Tool) -> Result<InstalledVersion, IacError> {
        let request = ExecRequest {
            program: tool.as_str().to_owned(),
            args: vec!["--version".to_owned()],
            ..ExecRequest::default()
        };
        let output = self
            .system
            .exec(&request)
            .map_err(|e| IacError::version(format!("Failed to run '{tool} --version': {e}")))?;

        let installed = InstalledVersion::parse(&output.stdout)?;
        debug!("Detected {tool} {}", installed.triple());
        Ok(installed)
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "These are unit tests")]
mod tests {
    use super::*;
    use crate::system::{ExecOutput, MockSystem};

    fn stdout(text: &str) -> ExecOutput {
        ExecOutput {
            exit_code: 0,
            stdout: text.to_owned(),
            stderr: String::new(),
        }
    }

    #[test]
    fn explicit_input_wins_over_file() {
        let system = MockSystem::new()
            .with_file("/work/.terraform-version", "1.5.7\n")
            .unwrap();
        let manager = PathVersionManager::new(&system);
        let resolved = manager
            .resolve(Tool::Terraform, Some("v1.9.0"), Path::new("/work"))
            .unwrap()
            .unwrap();
        assert_eq!(resolved.input, "v1.9.0");
        assert_eq!(resolved.resolved, "1.9.0");
        assert_eq!(resolved.source, VersionSource::Input);
        assert_eq!(resolved.major(), Some(1));
    }

    #[test]
    fn falls_back_to_version_file() {
        let system = MockSystem::new()
            .with_file("/work/.terragrunt-version", "# pinned\n0.67.4\n")
            .unwrap();
        let manager = PathVersionManager::new(&system);
        let resolved = manager
            .resolve(Tool::Terragrunt, Some("latest"), Path::new("/work"))
            .unwrap()
            .unwrap();
        assert_eq!(resolved.resolved, "0.67.4");
        assert_eq!(resolved.source, VersionSource::VersionFile);
        assert_eq!(resolved.major(), Some(0));
    }

    #[test]
    fn nothing_requested_uses_path() {
        let system = MockSystem::new();
        let manager = PathVersionManager::new(&system);
        assert!(
            manager
                .resolve(Tool::Terraform, None, Path::new("/work"))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn malformed_version_is_rejected() {
        let system = MockSystem::new();
        let manager = PathVersionManager::new(&system);
        let err = manager
            .resolve(Tool::Terraform, Some("~> 1.5"), Path::new("."))
            .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn detects_terragrunt_output() {
        let system = MockSystem::new()
            .with_exec_response(
                "terragrunt",
                Some(&["--version"]),
                stdout("terragrunt version v0.67.4\n"),
            )
            .unwrap();
        let manager = PathVersionManager::new(&system);
        let installed = manager.detect_installed(Tool::Terragrunt).unwrap();
        assert_eq!((installed.major, installed.minor, installed.patch), (0, 67, 4));
        assert_eq!(installed.triple(), "0.67.4");
    }

    #[test]
    fn detects_terraform_output() {
        let installed =
            InstalledVersion::parse("Terraform v1.9.8\non linux_amd64\n").unwrap();
        assert_eq!(installed.major, 1);
        assert_eq!(installed.minor, 9);
    }

    #[test]
    fn missing_binary_is_a_version_error() {
        let system = MockSystem::new();
        let manager = PathVersionManager::new(&system);
        let err = manager.detect_installed(Tool::Terragrunt).unwrap_err();
        assert!(matches!(err, IacError::Version { .. }));
    }

    #[test]
    fn output_without_number() {
        InstalledVersion::parse("terragrunt dev build").unwrap_err();
    }
}
