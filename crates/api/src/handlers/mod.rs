//! Request handlers.
//!
//! Each submodule groups the handlers for one resource. Handlers resolve the
//! caller through the extractors in [`crate::middleware::auth`], delegate to
//! the lifecycle manager or a repository in `sightline_db`, and map errors via
//! [`crate::error::AppError`].

pub mod image;
pub mod prediction;
pub mod stats;
