//! Real system implementation using `std::env`, `std::fs` and `std::process`

use super::{ExecOutput, ExecRequest, System};
use std::env::VarError;
use std::fs::{self, OpenOptions};
use std::io::{self, Write as _};
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

/// Production implementation of System trait
///
/// This implementation directly delegates to the standard library.
/// Processes are spawned without a shell.
#[derive(Debug, Clone, Copy)]
pub struct RealSystem;

impl RealSystem {
    /// Create a new `RealSystem` instance
    #[must_use]
    pub const fn new() -> Self {
        return Self;
    }
}

impl Default for RealSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for RealSystem {
    fn env_var(&self, key: &str) -> Result<String, VarError> {
        std::env::var(key)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn append(&self, path: &Path, contents: &str) -> io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(contents.as_bytes())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn exec(&self, request: &ExecRequest) -> io::Result<ExecOutput> {
        debug!("Spawning: {}", request.display());

        let mut command = Command::new(&request.program);
        command
            .args(&request.args)
            .envs(request.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(cwd) = request.cwd.as_ref() {
            command.current_dir(cwd);
        }

        let output = command.output().map_err(|e| {
            io::Error::new(
                e.kind(),
                format!("Failed to spawn '{}': {e}", request.program),
            )
        })?;

        // Killed by a signal: no exit code
        let result = ExecOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if !request.ignore_return_code && !result.success() {
            return Err(io::Error::other(format!(
                "'{}' exited with code {}: {}",
                request.program,
                result.exit_code,
                result.stderr.trim()
            )));
        }

        Ok(result)
    }
}

#[cfg(all(test, unix))]
#[expect(clippy::unwrap_used, reason = "These are unit tests")]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn exec_captures_stdout() {
        let system = RealSystem::new();
        let request = ExecRequest {
            program: "echo".to_owned(),
            args: vec!["hello world".to_owned()],
            ..ExecRequest::default()
        };
        let output = system.exec(&request).unwrap();
        assert!(output.success());
        assert_eq!(output.stdout.trim(), "hello world");
    }

    #[test]
    fn exec_does_not_expand_shell_syntax() {
        let system = RealSystem::new();
        let request = ExecRequest {
            program: "echo".to_owned(),
            args: vec!["$HOME;`id`".to_owned()],
            ..ExecRequest::default()
        };
        let output = system.exec(&request).unwrap();
        assert_eq!(output.stdout.trim(), "$HOME;`id`");
    }

    #[test]
    fn exec_non_zero_exit() {
        let system = RealSystem::new();
        let request = ExecRequest {
            program: "false".to_owned(),
            ..ExecRequest::default()
        };
        system.exec(&request).unwrap_err();

        let output = system.exec(&request.ignoring_return_code()).unwrap();
        assert!(!output.success());
        assert_eq!(output.exit_code, 1);
    }

    #[test]
    fn exec_uses_cwd_and_env() {
        let temp_dir = TempDir::new().unwrap();
        let system = RealSystem::new();
        let request = ExecRequest {
            program: "pwd".to_owned(),
            ..ExecRequest::default()
        }
        .with_cwd(temp_dir.path())
        .with_env([("IAC_TOOLKIT_TEST", "1")]);
        let output = system.exec(&request).unwrap();
        let printed = fs::canonicalize(output.stdout.trim()).unwrap();
        assert_eq!(printed, fs::canonicalize(temp_dir.path()).unwrap());
    }

    #[test]
    fn append_creates_and_extends() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.txt");
        let system = RealSystem::new();
        system.append(&path, "a\n").unwrap();
        system.append(&path, "b\n").unwrap();
        assert_eq!(system.read_to_string(&path).unwrap(), "a\nb\n");
    }
}
