//! Router assembly for the playground HTTP API.
//!
//! [`build_router`] wires all handler functions to their routes with
//! CORS and tracing middleware layers.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Builds the complete axum router with all API routes.
///
/// Routes use axum 0.8 `/{param}` path syntax. The paths served by earlier
/// versions of the service (`/program/{uid}`, `/page/{uid}`, `/run/program`)
/// stay mounted as aliases. CORS is permissive since the editor frontend is
/// served from a different origin.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health::index))
        .route("/health", get(handlers::health::health))
        // Storage
        .route(
            "/programs",
            get(handlers::programs::list_programs).post(handlers::programs::save_program),
        )
        .route("/programs/{uid}", get(handlers::programs::get_program))
        .route("/program/{uid}", get(handlers::programs::get_program))
        .route("/programs-page/{uid}", get(handlers::programs::programs_page))
        .route("/page/{uid}", get(handlers::programs::programs_page))
        // Execution
        .route("/program/run", post(handlers::run::run_program))
        .route("/run/program", post(handlers::run::run_program))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
