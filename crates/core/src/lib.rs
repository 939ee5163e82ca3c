//! Domain types and rules for the Sightline detection service.
//!
//! Nothing in this crate touches the database or the network. The store
//! lives in `sightline-db`, the HTTP surface in `sightline-api`.

pub mod accounts;
pub mod credentials;
pub mod detection;
pub mod error;
pub mod scoring;
pub mod storage;
pub mod types;
pub mod window;
