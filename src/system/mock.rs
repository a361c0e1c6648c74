//! Mock system implementation for testing

#![expect(clippy::module_name_repetitions)]

use super::{ExecOutput, ExecRequest, System};
use std::collections::{HashMap, HashSet};
use std::env::VarError;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// In-memory implementation of System trait for testing
///
/// `MockSystem` keeps environment, files and process responses in memory
/// and records every `exec` call for later inspection.
///
/// # Example
/// ```
/// use iac_toolkit::system::{mock::MockSystem, ExecOutput, ExecRequest, System};
///
/// let system = MockSystem::new()
///     .with_env("INPUT_COMMAND", "plan").unwrap()
///     .with_exec_response("terraform", None, ExecOutput::default()).unwrap();
///
/// assert_eq!(system.env_var("INPUT_COMMAND").unwrap(), "plan");
///
/// let request = ExecRequest {
///     program: "terraform".to_owned(),
///     args: vec!["plan".to_owned()],
///     ..ExecRequest::default()
/// };
/// assert!(system.exec(&request).unwrap().success());
/// assert_eq!(system.executed().len(), 1);
/// ```
#[derive(Clone)]
pub struct MockSystem {
    state: Arc<RwLock<MockSystemState>>,
}

struct MockSystemState {
    env_vars: HashMap<String, String>,
    files: HashMap<PathBuf, String>,
    dirs: HashSet<PathBuf>,
    responses: Vec<CannedResponse>,
    executed: Vec<ExecRequest>,
}

struct CannedResponse {
    program: String,
    /// `None` matches any argument list
    args: Option<Vec<String>>,
    output: ExecOutput,
}

impl MockSystem {
    /// Create a new `MockSystem` with default state
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(MockSystemState {
                env_vars: HashMap::new(),
                files: HashMap::new(),
                dirs: HashSet::from([PathBuf::from("/"), PathBuf::from(".")]),
                responses: Vec::new(),
                executed: Vec::new(),
            })),
        }
    }

    /// Set an environment variable (builder pattern)
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned
    #[inline]
    pub fn with_env(self, key: &str, value: &str) -> io::Result<Self> {
        let mut state = self
            .state
            .write()
            .map_err(|e| io::Error::other(e.to_string()))?;
        state.env_vars.insert(key.to_owned(), value.to_owned());
        drop(state);
        Ok(self)
    }

    /// Set an action input, stored the way the runner exposes it (`INPUT_<NAME>`)
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned
    #[inline]
    pub fn with_input(self, name: &str, value: &str) -> io::Result<Self> {
        let key = crate::config::inputs::input_env_key(name);
        self.with_env(&key, value)
    }

    /// Add a file with contents (builder pattern)
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned
    #[inline]
    pub fn with_file<P: AsRef<Path>>(self, path: P, contents: &str) -> io::Result<Self> {
        let path_buf = path.as_ref().to_path_buf();
        let mut state = self
            .state
            .write()
            .map_err(|e| io::Error::other(e.to_string()))?;
        if let Some(parent) = path_buf.parent() {
            Self::ensure_parent_dirs(&mut state.dirs, parent);
        }
        state.files.insert(path_buf, contents.to_owned());
        drop(state);
        Ok(self)
    }

    /// Add a directory (builder pattern)
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned
    #[inline]
    pub fn with_dir<P: AsRef<Path>>(self, path: P) -> io::Result<Self> {
        let path_buf = path.as_ref().to_path_buf();
        let mut state = self
            .state
            .write()
            .map_err(|e| io::Error::other(e.to_string()))?;
        Self::ensure_parent_dirs(&mut state.dirs, &path_buf);
        drop(state);
        Ok(self)
    }

    /// Register the output returned when `program` is executed
    ///
    /// With `args == None` the response matches any argument list. Later
    /// registrations take precedence over earlier ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned
    #[inline]
    pub fn with_exec_response(
        self,
        program: &str,
        args: Option<&[&str]>,
        output: ExecOutput,
    ) -> io::Result<Self> {
        let mut state = self
            .state
            .write()
            .map_err(|e| io::Error::other(e.to_string()))?;
        state.responses.push(CannedResponse {
            program: program.to_owned(),
            args: args.map(|a| a.iter().map(|s| (*s).to_owned()).collect()),
            output,
        });
        drop(state);
        Ok(self)
    }

    /// All requests passed to `exec`, in call order
    #[must_use]
    #[inline]
    pub fn executed(&self) -> Vec<ExecRequest> {
        self.state
            .read()
            .map(|state| state.executed.clone())
            .unwrap_or_default()
    }

    /// Current contents of an in-memory file
    #[must_use]
    #[inline]
    pub fn file_contents<P: AsRef<Path>>(&self, path: P) -> Option<String> {
        self.state
            .read()
            .ok()
            .and_then(|state| state.files.get(path.as_ref()).cloned())
    }

    #[inline]
    fn ensure_parent_dirs(dirs: &mut HashSet<PathBuf>, path: &Path) {
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            dirs.insert(ancestor.to_path_buf());
        }
    }
}

impl Default for MockSystem {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl System for MockSystem {
    #[inline]
    #[expect(clippy::map_err_ignore, reason = "This is for VarError")]
    fn env_var(&self, key: &str) -> Result<String, VarError> {
        let state = self.state.read().map_err(|_| VarError::NotPresent)?;
        state.env_vars.get(key).cloned().ok_or(VarError::NotPresent)
    }

    #[inline]
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let state = self
            .state
            .read()
            .map_err(|e| io::Error::other(e.to_string()))?;
        state.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("File not found: {}", path.display()),
            )
        })
    }

    #[inline]
    fn append(&self, path: &Path, contents: &str) -> io::Result<()> {
        let mut state = self
            .state
            .write()
            .map_err(|e| io::Error::other(e.to_string()))?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !state.dirs.contains(parent)
        {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Parent directory does not exist: {}", parent.display()),
            ));
        }
        state
            .files
            .entry(path.to_path_buf())
            .or_default()
            .push_str(contents);
        drop(state);
        Ok(())
    }

    #[inline]
    fn exists(&self, path: &Path) -> bool {
        self.state
            .read()
            .map(|state| state.files.contains_key(path) || state.dirs.contains(path))
            .unwrap_or(false)
    }

    #[inline]
    fn is_dir(&self, path: &Path) -> bool {
        self.state
            .read()
            .map(|state| state.dirs.contains(path))
            .unwrap_or(false)
    }

    #[inline]
    fn exec(&self, request: &ExecRequest) -> io::Result<ExecOutput> {
        let mut state = self
            .state
            .write()
            .map_err(|e| io::Error::other(e.to_string()))?;
        state.executed.push(request.clone());

        let output = state
            .responses
            .iter()
            .rev()
            .find(|canned| {
                canned.program == request.program
                    && canned.args.as_ref().is_none_or(|args| *args == request.args)
            })
            .map(|canned| canned.output.clone())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("{}: command not found", request.program),
                )
            })?;
        drop(state);

        if !request.ignore_return_code && !output.success() {
            return Err(io::Error::other(format!(
                "'{}' exited with code {}: {}",
                request.program,
                output.exit_code,
                output.stderr.trim()
            )));
        }

        Ok(output)
    }
}
