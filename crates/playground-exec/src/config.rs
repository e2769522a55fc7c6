//! Runner configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ExecError;

/// Default artifact extension.
pub const DEFAULT_EXTENSION: &str = "py";

/// Default wall-clock limit for one interpreter run.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything the runner needs to know about where and how to execute.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Interpreter executable. Receives the artifact path as its only argument.
    pub interpreter: PathBuf,
    /// Directory artifacts are created in.
    pub scratch_dir: PathBuf,
    /// Artifact file name prefix; a random suffix is appended per execution.
    pub base_name: String,
    /// Artifact extension, without the leading dot.
    pub extension: String,
    /// Wall-clock limit per run. `None` waits for the interpreter indefinitely.
    pub timeout: Option<Duration>,
}

impl RunnerConfig {
    /// Creates a config with the default extension and timeout.
    pub fn new(
        interpreter: impl Into<PathBuf>,
        scratch_dir: impl Into<PathBuf>,
        base_name: impl Into<String>,
    ) -> Self {
        RunnerConfig {
            interpreter: interpreter.into(),
            scratch_dir: scratch_dir.into(),
            base_name: base_name.into(),
            extension: DEFAULT_EXTENSION.to_string(),
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }

    /// Sets the artifact extension. A leading dot is stripped.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    /// Sets the per-run wall-clock limit.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Checks the config is usable. Called once when the runner is built.
    pub fn validate(&self) -> Result<(), ExecError> {
        if self.interpreter.as_os_str().is_empty() {
            return Err(ExecError::Config("interpreter path is empty".to_string()));
        }
        if self.scratch_dir.as_os_str().is_empty() {
            return Err(ExecError::Config("scratch directory is empty".to_string()));
        }
        if self.base_name.is_empty() {
            return Err(ExecError::Config("scratch base name is empty".to_string()));
        }
        let has_separator = |s: &str| s.contains('/') || s.contains('\\');
        if has_separator(&self.base_name) || has_separator(&self.extension) {
            return Err(ExecError::Config(
                "scratch base name and extension must not contain path separators".to_string(),
            ));
        }
        if self.timeout == Some(Duration::ZERO) {
            return Err(ExecError::Config("timeout must be non-zero".to_string()));
        }
        Ok(())
    }
}
