//! Prediction session model and DTOs.

use serde::Serialize;
use sightline_core::detection::Detection;
use sightline_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `prediction_sessions` table.
#[derive(Debug, Clone, FromRow)]
pub struct PredictionSession {
    pub uid: String,
    pub created_at: Timestamp,
    pub original_image_ref: String,
    pub annotated_image_ref: String,
    pub owner_id: DbId,
}

/// `{uid, timestamp}` pair returned by the filter queries.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct SessionRef {
    pub uid: String,
    #[serde(rename = "timestamp")]
    pub created_at: Timestamp,
}

/// DTO for creating a session together with its detections.
///
/// `detections` are inserted in slice order.
#[derive(Debug)]
pub struct CreatePredictionSession<'a> {
    pub uid: &'a str,
    pub created_at: Timestamp,
    pub original_image_ref: &'a str,
    pub annotated_image_ref: &'a str,
    pub owner_id: DbId,
    pub detections: &'a [Detection],
}

/// Image references released by a deleted session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedSession {
    pub uid: String,
    pub original_image_ref: String,
    pub annotated_image_ref: String,
    pub detections_removed: u64,
}
