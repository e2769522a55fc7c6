//! Application state shared by all handlers.
//!
//! [`AppState`] is built once at startup and cloned into each request. It
//! holds no per-request mutable state: the store owns its own connection
//! handling and every execution gets a private artifact.

use std::sync::Arc;

use playground_exec::{ExecError, ExecutionRunner, RunnerConfig};
use playground_storage::{DgraphStore, InMemoryStore, ProgramStore, SqliteStore, StorageError};

use crate::config::{Config, StorageBackend};
use crate::service::ProgramService;

/// Failures that prevent the server from starting.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("storage backend unavailable: {0}")]
    Storage(#[from] StorageError),

    #[error("invalid runner configuration: {0}")]
    Runner(#[from] ExecError),

    #[error("cannot prepare scratch directory {path}: {source}")]
    ScratchDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} backend requires DB to be set")]
    MissingAddress(&'static str),

    #[error("startup task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    /// Storage operations.
    pub programs: ProgramService,
    /// Interpreter runs. Shared so the cleanup counter is process-wide.
    pub runner: Arc<ExecutionRunner>,
}

impl AppState {
    /// Builds state from the resolved configuration.
    ///
    /// Creates the scratch directory if needed and connects the configured
    /// store, so a bad setup fails here rather than on the first request.
    pub async fn from_config(config: &Config) -> Result<Self, StartupError> {
        let scratch = &config.runner.scratch_dir;
        std::fs::create_dir_all(scratch).map_err(|source| StartupError::ScratchDir {
            path: scratch.display().to_string(),
            source,
        })?;
        let runner = ExecutionRunner::new(config.runner.clone())?;

        let store = open_store(config.storage, config.db_address.clone()).await?;
        tracing::info!(
            backend = store.backend_name(),
            scratch_dir = %scratch.display(),
            interpreter = %config.runner.interpreter.display(),
            "application state ready"
        );

        Ok(AppState {
            programs: ProgramService::new(store, config.page_size),
            runner: Arc::new(runner),
        })
    }

    /// Creates state over an in-memory store (for testing).
    pub fn in_memory(runner: RunnerConfig, page_size: usize) -> Result<Self, StartupError> {
        Ok(AppState {
            programs: ProgramService::new(Arc::new(InMemoryStore::new()), page_size),
            runner: Arc::new(ExecutionRunner::new(runner)?),
        })
    }
}

async fn open_store(
    backend: StorageBackend,
    address: Option<String>,
) -> Result<Arc<dyn ProgramStore>, StartupError> {
    let store: Arc<dyn ProgramStore> = match backend {
        StorageBackend::Memory => Arc::new(InMemoryStore::new()),
        StorageBackend::Sqlite => {
            let path = address.ok_or(StartupError::MissingAddress("sqlite"))?;
            Arc::new(tokio::task::spawn_blocking(move || SqliteStore::new(&path)).await??)
        }
        StorageBackend::Dgraph => {
            let address = address.ok_or(StartupError::MissingAddress("dgraph"))?;
            // The blocking HTTP client must not be built on a runtime thread.
            Arc::new(tokio::task::spawn_blocking(move || DgraphStore::new(&address)).await??)
        }
    };
    Ok(store)
}
