//! Storage abstraction for submitted playground programs.
//!
//! Provides the [`ProgramStore`] trait defining the storage contract that all
//! backends implement, plus [`InMemoryStore`], [`SqliteStore`] and
//! [`DgraphStore`] as interchangeable backends.
//!
//! # Architecture
//!
//! The contract is narrow: a commit-immediately `save` and a
//! filter-driven `query`. Callers build a [`ProgramFilter`] and hand it to the
//! backend verbatim; the Dgraph backend renders it to DQL via [`query`], the
//! others evaluate it directly.
//!
//! # Modules
//!
//! - [`error`]: StorageError enum with all failure modes
//! - [`types`]: ProgramUid, StoredProgram storage-layer types
//! - [`traits`]: ProgramStore trait definition
//! - [`query`]: ProgramFilter and DQL rendering
//! - [`memory`]: InMemoryStore implementation
//! - [`schema`]: SQL migrations for the SQLite backend
//! - [`sqlite`]: SqliteStore implementation
//! - [`dgraph`]: DgraphStore implementation over the Dgraph HTTP API

pub mod dgraph;
pub mod error;
pub mod memory;
pub mod query;
pub mod schema;
pub mod sqlite;
pub mod traits;
pub mod types;

// Re-export key types for ergonomic use.
pub use dgraph::DgraphStore;
pub use error::StorageError;
pub use memory::InMemoryStore;
pub use query::ProgramFilter;
pub use sqlite::SqliteStore;
pub use traits::ProgramStore;
pub use types::{ProgramUid, StoredProgram};
