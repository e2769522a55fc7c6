//! Dgraph implementation of [`ProgramStore`] over the HTTP API.
//!
//! Writes go to `POST /mutate?commitNow=true` with a JSON `set` payload that
//! names the new node with a blank-node label, so the assigned uid can be read
//! back from the response. Reads go to `POST /query` with a DQL body rendered
//! from the [`ProgramFilter`].
//!
//! The blocking reqwest client must be built and used off the async runtime;
//! callers construct this store inside `spawn_blocking`.

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use crate::error::StorageError;
use crate::query::{render_dql, ProgramFilter};
use crate::traits::ProgramStore;
use crate::types::{ProgramUid, StoredProgram};

/// Blank-node label used for the node created by a save.
const BLANK_NODE: &str = "program";

/// Dgraph-backed implementation of [`ProgramStore`].
#[derive(Debug, Clone)]
pub struct DgraphStore {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl DgraphStore {
    /// Creates a store for the Dgraph alpha at `address`.
    ///
    /// `address` may be a bare `host:port` (http is assumed) or a full URL.
    pub fn new(address: &str) -> Result<Self, StorageError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(StorageError::Connection(
                "dgraph address is empty".to_string(),
            ));
        }
        let base_url = if address.starts_with("http://") || address.starts_with("https://") {
            address.trim_end_matches('/').to_string()
        } else {
            format!("http://{}", address.trim_end_matches('/'))
        };

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(DgraphStore { base_url, client })
    }

    /// The normalized base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn post(&self, path: &str, content_type: &str, body: String) -> Result<String, reqwest::Error> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .header("Content-Type", content_type)
            .body(body)
            .send()?
            .error_for_status()?;
        response.text()
    }
}

impl ProgramStore for DgraphStore {
    fn save(&self, code: &[String]) -> Result<StoredProgram, StorageError> {
        let payload = json!({
            "set": {
                "uid": format!("_:{}", BLANK_NODE),
                "Code": code,
            }
        });
        let body = self
            .post(
                "/mutate?commitNow=true",
                "application/json",
                serde_json::to_string(&payload)?,
            )
            .map_err(|e| StorageError::Mutate(e.to_string()))?;

        let uid = parse_mutation_response(&body)?;
        tracing::debug!(%uid, "dgraph mutation committed");
        Ok(StoredProgram {
            uid,
            code: code.to_vec(),
        })
    }

    fn query(&self, filter: &ProgramFilter) -> Result<Vec<StoredProgram>, StorageError> {
        let dql = render_dql(filter);
        let body = self
            .post("/query", "application/dql", dql)
            .map_err(|e| StorageError::Query(e.to_string()))?;
        parse_query_response(&body, filter.block_name())
    }

    fn backend_name(&self) -> &'static str {
        "dgraph"
    }
}

#[derive(Debug, Deserialize)]
struct DgraphError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct MutationResponse {
    #[serde(default)]
    data: Option<MutationData>,
    #[serde(default)]
    errors: Vec<DgraphError>,
}

#[derive(Debug, Deserialize)]
struct MutationData {
    #[serde(default)]
    uids: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    data: Option<HashMap<String, Vec<StoredProgram>>>,
    #[serde(default)]
    errors: Vec<DgraphError>,
}

fn join_errors(errors: &[DgraphError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Extracts the uid assigned to the blank node from a mutation response.
fn parse_mutation_response(body: &str) -> Result<ProgramUid, StorageError> {
    let response: MutationResponse =
        serde_json::from_str(body).map_err(|e| StorageError::Mutate(e.to_string()))?;
    if !response.errors.is_empty() {
        return Err(StorageError::Mutate(join_errors(&response.errors)));
    }
    let raw = response
        .data
        .and_then(|data| data.uids.get(BLANK_NODE).cloned())
        .ok_or_else(|| StorageError::Mutate("response carried no assigned uid".to_string()))?;
    ProgramUid::parse(&raw).map_err(|e| StorageError::Mutate(e.to_string()))
}

/// Extracts the records under `block` from a query response.
fn parse_query_response(body: &str, block: &str) -> Result<Vec<StoredProgram>, StorageError> {
    let response: QueryResponse =
        serde_json::from_str(body).map_err(|e| StorageError::Query(e.to_string()))?;
    if !response.errors.is_empty() {
        return Err(StorageError::Query(join_errors(&response.errors)));
    }
    Ok(response
        .data
        .and_then(|mut data| data.remove(block))
        .unwrap_or_default())
}
