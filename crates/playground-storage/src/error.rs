//! Storage error types for playground-storage.
//!
//! [`StorageError`] separates failures by the operation that produced them
//! (mutation vs. query) so the HTTP layer can report which step failed, plus
//! backend-specific transport and schema failures.

use thiserror::Error;

/// Errors produced by storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backend rejected or failed a write.
    #[error("mutation failed: {0}")]
    Mutate(String),

    /// The backend rejected or failed a read.
    #[error("query failed: {0}")]
    Query(String),

    /// The supplied identifier is not a well-formed uid.
    #[error("invalid program uid: {0:?}")]
    InvalidUid(String),

    /// SQLite driver error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Schema migration failed.
    #[error("migration error: {0}")]
    Migration(String),

    /// Backend could not be reached or constructed.
    #[error("connection error: {0}")]
    Connection(String),
}
