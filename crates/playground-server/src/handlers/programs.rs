//! Program storage handlers (save, list, fetch, page).

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::error::ApiError;
use crate::schema::programs::{ProgramListResponse, ProgramSubmission, ProgramView};
use crate::state::AppState;

/// Lists every stored program.
///
/// `GET /programs`
pub async fn list_programs(
    State(state): State<AppState>,
) -> Result<Json<ProgramListResponse>, ApiError> {
    let programs = state.programs.get_all_programs().await?;
    Ok(Json(programs.into()))
}

/// Persists a submission and echoes the stored record.
///
/// `POST /programs`
pub async fn save_program(
    State(state): State<AppState>,
    body: Result<Json<ProgramSubmission>, JsonRejection>,
) -> Result<(StatusCode, Json<ProgramView>), ApiError> {
    let Json(submission) = body?;
    if let Some(uid) = submission.uid.as_deref() {
        tracing::debug!(client_uid = uid, "ignoring client-supplied uid");
    }
    let saved = state.programs.save_program(submission.code).await?;
    Ok((StatusCode::CREATED, Json(saved.into())))
}

/// Fetches one program.
///
/// `GET /programs/{uid}`
pub async fn get_program(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<Json<ProgramView>, ApiError> {
    let program = state.programs.get_program(&uid).await?;
    Ok(Json(program.into()))
}

/// Fetches the page of programs following `uid`.
///
/// `GET /programs-page/{uid}`
pub async fn programs_page(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<Json<ProgramListResponse>, ApiError> {
    let programs = state.programs.get_programs_page(&uid).await?;
    Ok(Json(programs.into()))
}
