//! Dynamic user segmentation API server library.
//!
//! Exposes configuration, state, error handling, routes and background tasks
//! so integration tests and the binary entrypoint can both access them.

pub mod background;
pub mod config;
pub mod error;
pub mod handlers;
pub mod reports;
pub mod router;
pub mod routes;
pub mod state;
pub mod telemetry;
