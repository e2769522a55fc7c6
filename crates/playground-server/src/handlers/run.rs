//! Program execution handler.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use playground_exec::ExecutionResult;

use crate::error::ApiError;
use crate::schema::programs::ProgramSubmission;
use crate::state::AppState;

/// Runs the first code fragment and returns its stdout as a JSON string.
///
/// Code that fails to run is a normal outcome: the body is the failure
/// marker and the status is still 200.
///
/// `POST /program/run`
pub async fn run_program(
    State(state): State<AppState>,
    body: Result<Json<ProgramSubmission>, JsonRejection>,
) -> Result<Json<String>, ApiError> {
    let Json(submission) = body?;
    let result = state.runner.execute(&submission.code).await?;
    let body = match result {
        ExecutionResult::Output(stdout) => stdout,
        ExecutionResult::Failure(kind) => {
            tracing::info!(?kind, "submitted program did not run");
            kind.marker().to_string()
        }
    };
    Ok(Json(body))
}
