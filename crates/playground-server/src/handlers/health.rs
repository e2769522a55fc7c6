//! Liveness handlers.

use axum::extract::State;
use axum::Json;

use crate::schema::health::HealthResponse;
use crate::state::AppState;

/// Plain-text welcome banner.
///
/// `GET /`
pub async fn index() -> &'static str {
    "Bienvenido-Go!!"
}

/// Reports the storage backend and the artifact cleanup failure count.
///
/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        storage: state.programs.backend_name(),
        cleanup_failures: state.runner.cleanup_failures(),
        version: env!("CARGO_PKG_VERSION"),
    })
}
