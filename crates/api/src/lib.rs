//! Sightline API server library.
//!
//! Exposes the building blocks (config, state, error handling, identity
//! resolution, session lifecycle, routes) so integration tests and the binary
//! entrypoint share them.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod lifecycle;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod state;
