//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&DbPool` as the first argument. There is one named function per
//! access pattern; no generic query builder.

pub mod account_repo;
pub mod detection_object_repo;
pub mod prediction_query_repo;
pub mod prediction_session_repo;

pub use account_repo::AccountRepo;
pub use detection_object_repo::DetectionObjectRepo;
pub use prediction_query_repo::PredictionQueryRepo;
pub use prediction_session_repo::PredictionSessionRepo;
