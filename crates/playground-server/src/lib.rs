//! HTTP/JSON API server for the code playground.
//!
//! Stores submitted programs through a pluggable [`ProgramStore`] and runs
//! them through an [`ExecutionRunner`]. This crate contains the server
//! framework, API schema types, error handling, and route definitions.
//!
//! [`ProgramStore`]: playground_storage::ProgramStore
//! [`ExecutionRunner`]: playground_exec::ExecutionRunner

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod schema;
pub mod service;
pub mod state;
