//! Execution of submitted program snippets against an external interpreter.
//!
//! [`ExecutionRunner`] materializes one code fragment as a uniquely named
//! artifact in a scratch directory, runs the configured interpreter on it,
//! captures stdout, and removes the artifact on every exit path.
//!
//! # Modules
//!
//! - [`config`]: RunnerConfig (interpreter, scratch dir, naming, timeout)
//! - [`error`]: ExecError for failures that are not "the code didn't run"
//! - [`artifact`]: Artifact creation and best-effort cleanup
//! - [`runner`]: ExecutionRunner and ExecutionResult

pub mod artifact;
pub mod config;
pub mod error;
pub mod runner;

pub use config::RunnerConfig;
pub use error::ExecError;
pub use runner::{ExecutionResult, ExecutionRunner, FailureKind};
