//! Program request/response types.

use playground_storage::{ProgramUid, StoredProgram};
use serde::{Deserialize, Serialize};

/// Body of `POST /programs` and `POST /program/run`.
///
/// Older clients send the code under `Code`; both spellings are accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct ProgramSubmission {
    /// Ordered code fragments. Only the first is executed by a run.
    #[serde(alias = "Code")]
    pub code: Vec<String>,
    /// Client-supplied uid. Ignored: the store always assigns one.
    #[serde(default)]
    pub uid: Option<String>,
}

/// A stored program as returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct ProgramView {
    pub uid: ProgramUid,
    pub code: Vec<String>,
}

impl From<StoredProgram> for ProgramView {
    fn from(program: StoredProgram) -> Self {
        ProgramView {
            uid: program.uid,
            code: program.code,
        }
    }
}

/// Response for listing or paging programs.
#[derive(Debug, Clone, Serialize)]
pub struct ProgramListResponse {
    pub programs: Vec<ProgramView>,
}

impl From<Vec<StoredProgram>> for ProgramListResponse {
    fn from(programs: Vec<StoredProgram>) -> Self {
        ProgramListResponse {
            programs: programs.into_iter().map(ProgramView::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submission_accepts_both_code_keys() {
        let lower: ProgramSubmission = serde_json::from_str(r#"{"code":["a"]}"#).unwrap();
        let upper: ProgramSubmission =
            serde_json::from_str(r#"{"Code":["a"],"uid":"0x1"}"#).unwrap();
        assert_eq!(lower.code, upper.code);
        assert_eq!(upper.uid.as_deref(), Some("0x1"));
    }

    #[test]
    fn view_serializes_lowercase_keys() {
        let view = ProgramView::from(StoredProgram {
            uid: ProgramUid(0x2a),
            code: vec!["print(1)".to_string()],
        });
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json, serde_json::json!({"uid": "0x2a", "code": ["print(1)"]}));
    }
}
