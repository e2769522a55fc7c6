//! Health check response type.

use serde::Serialize;

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Storage backend in use.
    pub storage: &'static str,
    /// Artifacts that could not be removed since startup.
    pub cleanup_failures: u64,
    pub version: &'static str,
}
