//! API error types with HTTP status code mapping.
//!
//! [`ApiError`] is the unified error type for all API endpoints. It implements
//! `axum::response::IntoResponse` to produce the error envelope
//! `{"message": ..., "codeError": ...}`. `codeError` names the step that
//! failed (decode, serialize, storage write, storage read, execution), not a
//! retryable class.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use playground_exec::ExecError;
use playground_storage::StorageError;

/// `codeError` for a request body that could not be decoded or is unusable.
pub const CODE_DECODE: u16 = 1;
/// `codeError` for a record that could not be encoded.
pub const CODE_SERIALIZE: u16 = 2;
/// `codeError` for a failed storage write.
pub const CODE_STORAGE_MUTATE: u16 = 3;
/// `codeError` for a failed storage read.
pub const CODE_STORAGE_QUERY: u16 = 4;
/// `codeError` for an execution that could not be attempted.
pub const CODE_EXECUTION: u16 = 5;

/// The error body returned for every failure.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope {
    /// Human-readable error message.
    pub message: String,
    /// Which operation failed.
    #[serde(rename = "codeError")]
    pub code_error: u16,
}

/// API errors with HTTP status code mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed request payload (400).
    #[error("could not decode request: {0}")]
    Decode(String),

    /// Well-formed payload that cannot be acted on (400).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Internal encoding failure (400).
    #[error("could not encode program: {0}")]
    Serialize(String),

    /// Storage write failed (400).
    #[error("could not save program: {0}")]
    StorageMutate(String),

    /// Storage read failed (404).
    #[error("could not query programs: {0}")]
    StorageQuery(String),

    /// The requested program does not exist (404).
    #[error("program not found: {0}")]
    NotFound(String),

    /// Execution could not be attempted (400).
    #[error("could not execute program: {0}")]
    Execution(String),
}

impl ApiError {
    /// Maps a storage failure raised while saving.
    pub fn mutation(err: StorageError) -> Self {
        match err {
            StorageError::Serialization(e) => ApiError::Serialize(e.to_string()),
            other => ApiError::StorageMutate(other.to_string()),
        }
    }

    /// Maps a storage failure raised while querying.
    pub fn query(err: StorageError) -> Self {
        match err {
            StorageError::Serialization(e) => ApiError::Serialize(e.to_string()),
            StorageError::InvalidUid(uid) => ApiError::NotFound(uid),
            other => ApiError::StorageQuery(other.to_string()),
        }
    }

    /// The envelope's `codeError`.
    pub fn code_error(&self) -> u16 {
        match self {
            ApiError::Decode(_) | ApiError::InvalidInput(_) => CODE_DECODE,
            ApiError::Serialize(_) => CODE_SERIALIZE,
            ApiError::StorageMutate(_) => CODE_STORAGE_MUTATE,
            ApiError::StorageQuery(_) | ApiError::NotFound(_) => CODE_STORAGE_QUERY,
            ApiError::Execution(_) => CODE_EXECUTION,
        }
    }

    /// HTTP status for the response.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::StorageQuery(_) | ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// The envelope sent to the client.
    pub fn envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            message: self.to_string(),
            code_error: self.code_error(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Decode(_) | ApiError::InvalidInput(_) | ApiError::NotFound(_) => {
                tracing::debug!(code_error = self.code_error(), "{}", self)
            }
            _ => tracing::warn!(code_error = self.code_error(), "{}", self),
        }
        (self.status(), axum::Json(self.envelope())).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Decode(rejection.body_text())
    }
}

impl From<ExecError> for ApiError {
    fn from(err: ExecError) -> Self {
        match err {
            ExecError::InvalidInput(msg) => ApiError::InvalidInput(msg),
            other => ApiError::Execution(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_uses_code_error_key() {
        let err = ApiError::StorageMutate("connection refused".to_string());
        let json = serde_json::to_value(err.envelope()).unwrap();
        assert_eq!(json["codeError"], 3);
        assert!(json["message"].as_str().unwrap().contains("connection refused"));
    }

    #[test]
    fn read_failures_are_404_write_failures_400() {
        assert_eq!(
            ApiError::StorageQuery(String::new()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ApiError::NotFound(String::new()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::StorageMutate(String::new()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::Decode(String::new()).status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn storage_errors_map_by_operation() {
        let mutate = ApiError::mutation(StorageError::Connection("down".to_string()));
        assert_eq!(mutate.code_error(), CODE_STORAGE_MUTATE);

        let query = ApiError::query(StorageError::Connection("down".to_string()));
        assert_eq!(query.code_error(), CODE_STORAGE_QUERY);

        let bad_uid = ApiError::query(StorageError::InvalidUid("zz".to_string()));
        assert!(matches!(bad_uid, ApiError::NotFound(_)));
    }

    #[test]
    fn empty_code_maps_to_decode_code() {
        let err: ApiError = ExecError::InvalidInput("empty".to_string()).into();
        assert_eq!(err.code_error(), CODE_DECODE);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn artifact_failure_maps_to_execution_code() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: ApiError = ExecError::ArtifactCreate(io).into();
        assert_eq!(err.code_error(), CODE_EXECUTION);
    }
}
