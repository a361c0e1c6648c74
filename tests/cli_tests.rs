//! CLI interface tests

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn iac_toolkit() -> Command {
    let mut cmd = Command::cargo_bin("iac-toolkit").unwrap();
    cmd.env_remove("GITHUB_OUTPUT")
        .env_remove("GITHUB_ACTIONS")
        .env_remove("IAC_TOOLKIT_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

fn write_settings(dir: &TempDir, contents: &str) -> String {
    let path = dir.path().join("iac.yaml");
    fs::write(&path, contents).unwrap();
    path.to_str().unwrap().to_owned()
}

#[test]
fn test_version_flag() {
    iac_toolkit()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("iac-toolkit"));
}

#[test]
fn test_help_flag() {
    iac_toolkit()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("terraform"))
        .stdout(predicate::str::contains("terragrunt"));
}

#[test]
fn test_print_terraform_command() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_settings(
        &temp_dir,
        "command: plan\nvariables:\n  name: my app\nno-color: true\n",
    );

    iac_toolkit()
        .args(["terraform", "--config", &config, "--print-command"])
        .assert()
        .success()
        .stdout("terraform plan -var \"name=my app\" -no-color\n");
}

#[test]
fn test_print_terragrunt_command_as_json() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_settings(
        &temp_dir,
        "command: graph-dependencies\nterragrunt-major-version: 1\n",
    );

    iac_toolkit()
        .args(["terragrunt", "--config", &config, "--print-command"])
        .args(["--output-format", "json"])
        .assert()
        .success()
        .stdout("[\"terragrunt\",\"dag\",\"graph\"]\n");
}

#[test]
fn test_config_from_environment() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_settings(&temp_dir, "command: validate\n");

    iac_toolkit()
        .env("IAC_TOOLKIT_CONFIG", &config)
        .args(["terraform", "--print-command", "--output-format", "multiline"])
        .assert()
        .success()
        .stdout("terraform \\\n  validate\n");
}

#[test]
fn test_dry_run_publishes_outputs() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_settings(&temp_dir, "command: apply\nauto-approve: true\n");
    let output_file = temp_dir.path().join("github_output");

    iac_toolkit()
        .env("GITHUB_OUTPUT", &output_file)
        .args(["terraform", "--config", &config, "--dry-run"])
        .assert()
        .success();

    let published = fs::read_to_string(&output_file).unwrap();
    assert!(published.contains("command-string<<ghadelimiter_0\nterraform apply -auto-approve\n"));
    assert!(published.contains("command-args<<ghadelimiter_0\n[\"terraform\",\"apply\",\"-auto-approve\"]\n"));
    assert!(!published.contains("exit-code"));
}

#[test]
fn test_missing_config_error() {
    iac_toolkit()
        .args(["terraform", "--config", "nonexistent.yaml"])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("Settings file not found"));
}

#[test]
fn test_removed_command_at_v1() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_settings(
        &temp_dir,
        "command: aws-provider-patch\nterragrunt-major-version: 1\n",
    );

    iac_toolkit()
        .env("GITHUB_ACTIONS", "true")
        .args(["terragrunt", "--config", &config, "--dry-run"])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("::error::"))
        .stdout(predicate::str::contains("aws-provider-patch"));
}

#[test]
fn test_missing_command_input() {
    iac_toolkit()
        .env_remove("INPUT_COMMAND")
        .args(["terraform", "--dry-run"])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("command"));
}

#[test]
fn test_invalid_output_format() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_settings(&temp_dir, "command: plan\n");

    iac_toolkit()
        .args(["terraform", "--config", &config, "--print-command"])
        .args(["--output-format", "yaml"])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("output format"));
}
