//! MoveCheck API server library.
//!
//! Exposes config, state, error handling and routes so integration tests and
//! the binary entrypoint share one router construction.

pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod state;
