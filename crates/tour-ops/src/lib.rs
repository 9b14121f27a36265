//! Trip phase and readiness gate engine for guided tour operations.
//!
//! The library is consumed by the `tour-ops-api` service, which supplies the
//! repository and collaborator implementations and exposes the HTTP surface.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
