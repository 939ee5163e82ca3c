//! Row structs and insert DTOs.
//!
//! Each submodule contains a `FromRow` struct matching the table and, where
//! rows are created from the API, a create DTO.

pub mod account;
pub mod detection_object;
pub mod prediction_session;
pub mod prediction_stats;
