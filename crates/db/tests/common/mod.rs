//! Fixtures shared by the store integration tests.

#![allow(dead_code)]

use chrono::Duration;
use sightline_core::detection::{BoundingBox, Detection};
use sightline_core::types::{DbId, Timestamp};
use sightline_db::models::account::CreateAccount;
use sightline_db::models::prediction_session::{CreatePredictionSession, PredictionSession};
use sightline_db::repositories::{AccountRepo, PredictionSessionRepo};
use sqlx::SqlitePool;

/// Create an account with a throwaway credential hash.
pub async fn create_account(pool: &SqlitePool, username: &str) -> DbId {
    AccountRepo::create(
        pool,
        &CreateAccount {
            username: username.to_string(),
            credential_hash: format!("hash-of-{username}"),
        },
    )
    .await
    .expect("account creation should succeed")
    .id
}

pub fn detection(label: &str, score: f64) -> Detection {
    Detection {
        label: label.to_string(),
        score,
        bbox: BoundingBox::from([1.0, 2.0, 30.0, 40.0]),
    }
}

/// Insert a session owned by `owner_id` created at `created_at`.
pub async fn create_session_at(
    pool: &SqlitePool,
    owner_id: DbId,
    created_at: Timestamp,
    detections: &[Detection],
) -> PredictionSession {
    let uid = uuid::Uuid::new_v4().to_string();
    let original = format!("original/{uid}.jpg");
    let annotated = format!("predicted/{uid}.jpg");
    PredictionSessionRepo::create_with_detections(
        pool,
        &CreatePredictionSession {
            uid: &uid,
            created_at,
            original_image_ref: &original,
            annotated_image_ref: &annotated,
            owner_id,
            detections,
        },
    )
    .await
    .expect("session creation should succeed")
}

/// Insert a session created `days_ago` days before `now`.
pub async fn create_session_days_ago(
    pool: &SqlitePool,
    owner_id: DbId,
    now: Timestamp,
    days_ago: i64,
    detections: &[Detection],
) -> PredictionSession {
    create_session_at(pool, owner_id, now - Duration::days(days_ago), detections).await
}
