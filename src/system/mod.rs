//! System abstraction for the CI agent
//!
//! This module provides a unified trait for all external interactions the
//! toolkit performs: environment access (action inputs), the handful of
//! filesystem reads and appends it needs, and process execution.
//! Tests swap in `MockSystem` to run without spawning anything.

use std::env::VarError;
use std::io;
use std::path::{Path, PathBuf};

pub mod mock;
pub mod real;

pub use mock::MockSystem;
pub use real::RealSystem;

/// A process invocation handed to the agent
///
/// The program is spawned directly with `args` as its argument vector.
/// Nothing here is ever interpreted by a shell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecRequest {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub env: Vec<(String, String)>,
    /// When false, a non-zero exit status is reported as an error
    pub ignore_return_code: bool,
}

impl ExecRequest {
    /// Build a request from a full token array (`[program, args...]`)
    ///
    /// Returns `None` for an empty token array.
    #[must_use]
    pub fn from_tokens(tokens: &[String]) -> Option<Self> {
        let (program, args) = tokens.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
            ..Self::default()
        })
    }

    #[must_use]
    pub fn with_cwd<P: Into<PathBuf>>(mut self, cwd: P) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    #[must_use]
    pub fn with_env<I, K, V>(mut self, env: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env
            .extend(env.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    #[must_use]
    pub const fn ignoring_return_code(mut self) -> Self {
        self.ignore_return_code = true;
        self
    }

    /// Human-readable form used in log lines
    #[must_use]
    pub fn display(&self) -> String {
        let mut tokens = Vec::with_capacity(self.args.len() + 1);
        tokens.push(self.program.clone());
        tokens.extend(self.args.iter().cloned());
        crate::iac::format::single_line(&tokens)
    }
}

/// Captured result of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecOutput {
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Unified trait for agent operations (environment + filesystem + processes)
///
/// # Implementations
/// - `RealSystem`: Production implementation using `std::env`, `std::fs`
///   and `std::process`
/// - `MockSystem`: Test implementation using in-memory storage and canned
///   process responses
pub trait System: Send + Sync {
    // ==================== Environment Operations ====================

    /// Get an environment variable
    fn env_var(&self, key: &str) -> Result<String, VarError>;

    // ==================== Filesystem Operations ====================

    /// Read entire file contents as a string
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Append to a file, creating it if it doesn't exist
    fn append(&self, path: &Path, contents: &str) -> io::Result<()>;

    /// Check if a path exists
    fn exists(&self, path: &Path) -> bool;

    /// Check if a path points to a directory
    fn is_dir(&self, path: &Path) -> bool;

    // ==================== Process Operations ====================

    /// Spawn `request.program` with `request.args` and wait for it
    ///
    /// Stdout and stderr are captured. A non-zero exit status is an error
    /// unless `request.ignore_return_code` is set.
    fn exec(&self, request: &ExecRequest) -> io::Result<ExecOutput>;
}
