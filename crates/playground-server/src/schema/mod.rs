//! API schema types for request/response definitions.
//!
//! Types use serde derives for JSON serialization/deserialization. Wire keys
//! are lowercase; the storage layer's `Code` key is not exposed.

pub mod health;
pub mod programs;
