//! Prediction session lifecycle: detect, store and persist on create; cascade
//! and clean up on delete.

use std::time::{Duration, Instant};

use sightline_core::detection::DetectorError;
use sightline_core::error::CoreError;
use sightline_core::storage::{ImageFormat, ImageKind, ImageStore};
use sightline_core::types::DbId;
use sightline_db::models::prediction_session::{CreatePredictionSession, DeletedSession};
use sightline_db::repositories::PredictionSessionRepo;

use crate::error::AppResult;
use crate::state::AppState;

/// Outcome of a completed prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionSummary {
    pub uid: String,
    pub detection_count: usize,
    /// One entry per detection, in detector order (duplicates kept).
    pub labels: Vec<String>,
    pub processing_duration: Duration,
}

/// Run detection on `image` and persist the resulting session for `owner_id`.
///
/// The detector runs before any database work, so no transaction is held
/// across it. If persisting fails, the images written for this session are
/// removed again.
pub async fn create_prediction(
    state: &AppState,
    owner_id: DbId,
    image: &[u8],
) -> AppResult<PredictionSummary> {
    let started = Instant::now();
    let format = ImageFormat::sniff(image)?;

    let detections = state.detector.detect(image).await?;
    for detection in &detections {
        detection
            .validate()
            .map_err(|e| DetectorError::InvalidResponse(e.to_string()))?;
    }
    let annotated = state.detector.annotate(image, &detections).await?;

    let uid = uuid::Uuid::new_v4().to_string();
    let file_name = format!("{uid}.{}", format.extension());

    let original_ref = state
        .images
        .put(ImageKind::Original, &file_name, image)
        .await?;
    let annotated_ref = match state
        .images
        .put(ImageKind::Predicted, &file_name, &annotated)
        .await
    {
        Ok(reference) => reference,
        Err(err) => {
            remove_images(state.images.as_ref(), &[original_ref.as_str()]).await;
            return Err(err.into());
        }
    };

    let input = CreatePredictionSession {
        uid: &uid,
        created_at: chrono::Utc::now(),
        original_image_ref: &original_ref,
        annotated_image_ref: &annotated_ref,
        owner_id,
        detections: &detections,
    };
    if let Err(err) = PredictionSessionRepo::create_with_detections(&state.pool, &input).await {
        remove_images(
            state.images.as_ref(),
            &[original_ref.as_str(), annotated_ref.as_str()],
        )
        .await;
        return Err(err.into());
    }

    let summary = PredictionSummary {
        uid,
        detection_count: detections.len(),
        labels: detections.into_iter().map(|d| d.label).collect(),
        processing_duration: started.elapsed(),
    };

    tracing::info!(
        uid = %summary.uid,
        owner_id,
        detection_count = summary.detection_count,
        elapsed_ms = summary.processing_duration.as_millis() as u64,
        "Prediction session created",
    );

    Ok(summary)
}

/// Delete the session `uid` owned by `owner_id`, its detections and its
/// image files.
///
/// File removal is best-effort: failures are logged and the delete still
/// succeeds.
pub async fn delete_prediction(
    state: &AppState,
    owner_id: DbId,
    uid: &str,
) -> AppResult<DeletedSession> {
    let deleted = PredictionSessionRepo::delete_for_owner(&state.pool, uid, owner_id)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "PredictionSession",
            id: uid.to_string(),
        })?;

    remove_images(
        state.images.as_ref(),
        &[
            deleted.original_image_ref.as_str(),
            deleted.annotated_image_ref.as_str(),
        ],
    )
    .await;

    tracing::info!(
        uid = %deleted.uid,
        owner_id,
        detections_removed = deleted.detections_removed,
        "Prediction session deleted",
    );

    Ok(deleted)
}

async fn remove_images(images: &dyn ImageStore, references: &[&str]) {
    for reference in references {
        if let Err(err) = images.delete(reference).await {
            tracing::warn!(reference = %reference, error = %err, "Failed to remove image file");
        }
    }
}
