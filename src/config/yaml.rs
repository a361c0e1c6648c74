//! YAML settings loading and parsing

use crate::config::Settings;
use crate::system::System;
use anyhow::{Context as _, Result, anyhow};
use std::path::Path;

/// Load, validate and deserialize a YAML settings file
pub fn load_settings(system: &dyn System, path: &str) -> Result<Settings> {
    let path_obj = Path::new(path);

    if !system.exists(path_obj) {
        return Err(anyhow!(
            "Settings file not found: {path}\n\
            Pass an existing file with --config or set IAC_TOOLKIT_CONFIG"
        ));
    }

    let content = system
        .read_to_string(path_obj)
        .with_context(|| format!("Failed to read settings file: {path}"))?;

    parse_settings(&content).with_context(|| format!("Invalid settings file: {path}"))
}

/// Parse settings from YAML text
///
/// The document is validated against the schema before deserialization so
/// that unknown keys and wrong types are reported with their path.
pub fn parse_settings(content: &str) -> Result<Settings> {
    let value: serde_json::Value = serde_yaml::from_str(content).context(
        "Failed to parse YAML settings\n\
        Please check the syntax and structure of your settings file",
    )?;

    crate::config::schema::validate_against_schema(&value)
        .context("Settings validation failed")?;

    serde_json::from_value(value).context("Failed to convert settings")
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "These are unit tests")]
mod tests {
    use super::*;
    use crate::system::MockSystem;

    #[test]
    fn minimal_document() {
        let settings = parse_settings("command: plan\n").unwrap();
        assert_eq!(settings.command, "plan");
        assert!(settings.refresh);
        assert!(settings.var_files.is_empty());
    }

    #[test]
    fn full_document() {
        let settings = parse_settings(
            r"
command: plan
working-directory: live/prod
variables:
  region: eu-west-1
  replicas: 3
var-files: [common.tfvars]
refresh: false
run-all: true
include-dirs:
  - modules/a
source-map:
  git::https://example.com/a.git: ../a
terragrunt-major-version: 1
",
        )
        .unwrap();
        assert_eq!(settings.working_directory, "live/prod");
        assert_eq!(settings.variables.len(), 2);
        assert!(!settings.refresh);
        assert!(settings.terragrunt.run_all);
        assert_eq!(settings.terragrunt.include_dirs, vec!["modules/a"]);
        assert_eq!(settings.terragrunt.terragrunt_major_version, Some(1));
        assert_eq!(
            settings.terragrunt.source_map["git::https://example.com/a.git"],
            "../a"
        );
    }

    #[test]
    fn unknown_key_rejected() {
        let err = parse_settings("command: plan\nauto-aprove: true\n").unwrap_err();
        assert!(format!("{err:#}").contains("validation"));
    }

    #[test]
    fn missing_command_rejected() {
        parse_settings("working-directory: .\n").unwrap_err();
    }

    #[test]
    fn missing_file() {
        let system = MockSystem::new();
        let err = load_settings(&system, "/nowhere.yaml").unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn loads_through_system() {
        let system = MockSystem::new()
            .with_file("/work/iac.yaml", "command: apply\nauto-approve: true\n")
            .unwrap();
        let settings = load_settings(&system, "/work/iac.yaml").unwrap();
        assert!(settings.auto_approve);
    }
}
