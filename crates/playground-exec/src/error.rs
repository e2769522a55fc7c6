//! Error types for playground-exec.
//!
//! An interpreter that fails or times out is not an error here: that is a
//! normal [`ExecutionResult::Failure`](crate::ExecutionResult::Failure).
//! [`ExecError`] covers the cases where execution could not be attempted.

use thiserror::Error;

/// Errors produced before or around an interpreter run.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The submission carried nothing to execute.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The artifact could not be created or written.
    #[error("failed to create execution artifact: {0}")]
    ArtifactCreate(#[source] std::io::Error),

    /// Runner configuration is unusable.
    #[error("runner configuration error: {0}")]
    Config(String),
}
