//! Terragrunt v0.x / v1.x flag and command spellings
//!
//! Terragrunt 1.0 dropped the `--terragrunt-` prefix from its own flags,
//! moved the run-queue flags under `--queue-*`, folded `run-all` into
//! `run --all` and regrouped several commands under multi-word forms. These
//! tables are the single source of truth for both spellings; when the wrapped
//! CLI renames something, this is the only file that changes.

use crate::error::IacError;

/// Prefix every v0 terragrunt flag carries
pub const LEGACY_PREFIX: &str = "--terragrunt-";

/// One semantic flag and its two spellings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagMapping {
    pub key: &'static str,
    pub v0: &'static str,
    pub v1: &'static str,
}

impl FlagMapping {
    /// Spelling for a given terragrunt major version
    #[must_use]
    pub const fn spelling(&self, major_version: u64) -> &'static str {
        if major_version == 0 { self.v0 } else { self.v1 }
    }
}

const fn flag(key: &'static str, v0: &'static str, v1: &'static str) -> FlagMapping {
    FlagMapping { key, v0, v1 }
}

pub const FLAG_MAPPINGS: &[FlagMapping] = &[
    flag("config", "--terragrunt-config", "--config"),
    flag("working-dir", "--terragrunt-working-dir", "--working-dir"),
    flag("no-auto-init", "--terragrunt-no-auto-init", "--no-auto-init"),
    flag("no-auto-retry", "--terragrunt-no-auto-retry", "--no-auto-retry"),
    flag(
        "non-interactive",
        "--terragrunt-non-interactive",
        "--non-interactive",
    ),
    flag("parallelism", "--terragrunt-parallelism", "--parallelism"),
    flag("include-dir", "--terragrunt-include-dir", "--queue-include-dir"),
    flag("exclude-dir", "--terragrunt-exclude-dir", "--queue-exclude-dir"),
    flag(
        "ignore-dependency-errors",
        "--terragrunt-ignore-dependency-errors",
        "--queue-ignore-errors",
    ),
    flag(
        "ignore-external-dependencies",
        "--terragrunt-ignore-external-dependencies",
        "--queue-exclude-external",
    ),
    flag(
        "include-external-dependencies",
        "--terragrunt-include-external-dependencies",
        "--queue-include-external",
    ),
    flag("source", "--terragrunt-source", "--source"),
    flag("source-map", "--terragrunt-source-map", "--source-map"),
    flag("download-dir", "--terragrunt-download-dir", "--download-dir"),
    flag("iam-role", "--terragrunt-iam-role", "--iam-assume-role"),
    flag(
        "iam-role-session-name",
        "--terragrunt-iam-role-session-name",
        "--iam-assume-role-session-name",
    ),
    flag(
        "strict-include",
        "--terragrunt-strict-include",
        "--queue-strict-include",
    ),
];

/// v0 command name and the tokens that replace it from v1 on
pub const COMMAND_MAPPINGS: &[(&str, &[&str])] = &[
    ("run-all", &["run", "--all"]),
    ("graph-dependencies", &["dag", "graph"]),
    ("hclfmt", &["hcl", "fmt"]),
    ("render-json", &["render", "--json", "-w"]),
    ("validate-inputs", &["validate", "inputs"]),
    ("output-module-groups", &["find", "--dag", "--json"]),
];

/// Commands with no v1 equivalent
pub const REMOVED_COMMANDS: &[&str] = &["aws-provider-patch"];

/// Resolve a semantic flag key to its spelling for `major_version`
///
/// # Errors
///
/// Returns `IacError::UnknownFlag` when `key` is not in the table. That is
/// a defect in the argument builder, not a user error.
#[inline]
pub fn select_flag(key: &str, major_version: u64) -> Result<&'static str, IacError> {
    FLAG_MAPPINGS
        .iter()
        .find(|mapping| mapping.key == key)
        .map(|mapping| mapping.spelling(major_version))
        .ok_or_else(|| IacError::UnknownFlag {
            key: key.to_owned(),
        })
}

/// v1 token sequence for a renamed command
#[must_use]
pub fn renamed_command(command: &str) -> Option<&'static [&'static str]> {
    COMMAND_MAPPINGS
        .iter()
        .find(|(name, _)| *name == command)
        .map(|(_, tokens)| *tokens)
}

#[must_use]
pub fn is_removed_command(command: &str) -> bool {
    REMOVED_COMMANDS.contains(&command)
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "These are unit tests")]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_mapping_is_well_formed() {
        for mapping in FLAG_MAPPINGS {
            assert!(!mapping.key.is_empty());
            assert!(mapping.v0.starts_with(LEGACY_PREFIX), "{}", mapping.v0);
            assert!(!mapping.v1.starts_with(LEGACY_PREFIX), "{}", mapping.v1);
            assert!(mapping.v1.starts_with("--"), "{}", mapping.v1);
            assert_ne!(mapping.v0, mapping.v1);
        }
    }

    #[test]
    fn keys_are_unique() {
        let keys: HashSet<_> = FLAG_MAPPINGS.iter().map(|m| m.key).collect();
        assert_eq!(keys.len(), FLAG_MAPPINGS.len());
    }

    #[test]
    fn select_by_version() {
        assert_eq!(
            select_flag("non-interactive", 0).unwrap(),
            "--terragrunt-non-interactive"
        );
        assert_eq!(select_flag("non-interactive", 1).unwrap(), "--non-interactive");
        assert_eq!(select_flag("include-dir", 1).unwrap(), "--queue-include-dir");
        assert_eq!(select_flag("include-dir", 2).unwrap(), "--queue-include-dir");
    }

    #[test]
    fn unknown_key_is_an_error() {
        let err = select_flag("no-such-flag", 0).unwrap_err();
        assert_eq!(
            err,
            IacError::UnknownFlag {
                key: "no-such-flag".to_owned()
            }
        );
    }

    #[test]
    fn renamed_and_removed_are_disjoint() {
        for removed in REMOVED_COMMANDS {
            assert!(renamed_command(removed).is_none());
        }
        assert_eq!(renamed_command("hclfmt").unwrap(), &["hcl", "fmt"]);
        assert!(renamed_command("plan").is_none());
        assert!(is_removed_command("aws-provider-patch"));
        assert!(!is_removed_command("hclfmt"));
    }
}
