//! The [`ProgramStore`] trait defining the storage contract for programs.
//!
//! All backends (InMemoryStore, SqliteStore, DgraphStore) implement this
//! trait, so the server can swap them through configuration alone.

use crate::error::StorageError;
use crate::query::ProgramFilter;
use crate::types::StoredProgram;

/// The storage contract for submitted programs.
///
/// The trait is synchronous; async callers are expected to run it on a
/// blocking thread. Implementations take `&self` and handle their own
/// interior synchronization so a single store can be shared across requests.
pub trait ProgramStore: Send + Sync {
    /// Persists a code sequence and commits immediately.
    ///
    /// The write is durable before this returns. Returns the stored record
    /// with its newly assigned uid.
    fn save(&self, code: &[String]) -> Result<StoredProgram, StorageError>;

    /// Returns every record matching `filter`, ordered by ascending uid.
    fn query(&self, filter: &ProgramFilter) -> Result<Vec<StoredProgram>, StorageError>;

    /// Short backend name for logs and health output.
    fn backend_name(&self) -> &'static str;
}
