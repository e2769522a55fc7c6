//! Transient source artifacts.
//!
//! An [`Artifact`] is one code fragment written to a uniquely named file in
//! the scratch directory. The name is `<base><random>.<ext>`, so concurrent
//! executions never collide. The file handle is closed before the
//! interpreter runs; only the path is kept.
//!
//! Removal is explicit through [`Artifact::remove`], which reports failure.
//! If an artifact is dropped without being removed (a cancelled request),
//! the underlying `TempPath` still deletes it.

use std::io::Write;
use std::path::Path;

use tempfile::TempPath;

use crate::config::RunnerConfig;
use crate::error::ExecError;

/// Random characters appended to the base name.
const RANDOM_SUFFIX_LEN: usize = 12;

/// A source file owned by exactly one execution.
#[derive(Debug)]
pub struct Artifact {
    path: TempPath,
}

impl Artifact {
    /// Writes `source` to a fresh file in the configured scratch directory.
    pub fn create(config: &RunnerConfig, source: &str) -> Result<Self, ExecError> {
        let suffix = if config.extension.is_empty() {
            String::new()
        } else {
            format!(".{}", config.extension)
        };

        let mut file = tempfile::Builder::new()
            .prefix(&config.base_name)
            .suffix(&suffix)
            .rand_bytes(RANDOM_SUFFIX_LEN)
            .tempfile_in(&config.scratch_dir)
            .map_err(ExecError::ArtifactCreate)?;

        // On a failed write the NamedTempFile is dropped and the file removed.
        file.write_all(source.as_bytes())
            .map_err(ExecError::ArtifactCreate)?;
        file.flush().map_err(ExecError::ArtifactCreate)?;

        Ok(Artifact {
            path: file.into_temp_path(),
        })
    }

    /// Path handed to the interpreter.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Deletes the artifact, returning the I/O error if deletion failed.
    pub fn remove(self) -> std::io::Result<()> {
        self.path.close()
    }
}
