//! CO2 exporter server library.
//!
//! Exposes the building blocks (CLI, config, registry binding, router) so
//! integration tests and the binary entrypoint can both access them.

pub mod cli;
pub mod config;
pub mod error;
pub mod metrics;
pub mod router;
pub mod routes;
pub mod state;
