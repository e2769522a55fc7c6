//! HTTP handler modules for the playground API.
//!
//! Handlers decode the request, delegate to [`ProgramService`] or the
//! [`ExecutionRunner`], and return JSON. No business logic lives here.
//!
//! [`ProgramService`]: crate::service::ProgramService
//! [`ExecutionRunner`]: playground_exec::ExecutionRunner

pub mod health;
pub mod programs;
pub mod run;
