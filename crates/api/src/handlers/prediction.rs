//! Handlers for prediction sessions.
//!
//! ```text
//! POST   /predict                          run detection on an upload
//! GET    /prediction/{uid}                 session with its detections
//! DELETE /prediction/{uid}                 delete session, detections, files
//! GET    /predictions/label/{label}        sessions containing a label
//! GET    /predictions/score/{min_score}    sessions with a score >= threshold
//! ```

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use sightline_core::error::CoreError;
use sightline_core::scoring::{parse_score_threshold, round_to};
use sightline_core::types::Timestamp;
use sightline_db::models::detection_object::DetectionObjectResponse;
use sightline_db::models::prediction_session::SessionRef;
use sightline_db::repositories::{DetectionObjectRepo, PredictionQueryRepo, PredictionSessionRepo};

use crate::error::{AppError, AppResult};
use crate::lifecycle;
use crate::middleware::auth::{AuthAccount, ResolvedAccount};
use crate::state::AppState;

/// Name of the multipart field carrying the image.
const UPLOAD_FIELD: &str = "file";

/// Response body of `POST /predict`.
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub prediction_uid: String,
    pub detection_count: usize,
    pub labels: Vec<String>,
    /// Processing time in seconds, two decimals.
    pub time_took: f64,
}

/// Response body of `GET /prediction/{uid}`.
#[derive(Debug, Serialize)]
pub struct PredictionDetail {
    pub uid: String,
    pub timestamp: Timestamp,
    pub original_image: String,
    pub predicted_image: String,
    pub detection_objects: Vec<DetectionObjectResponse>,
}

/// POST /predict
///
/// Credentials are optional; without them the session belongs to the
/// anonymous account.
pub async fn predict(
    State(state): State<AppState>,
    account: ResolvedAccount,
    mut multipart: Multipart,
) -> AppResult<Json<PredictResponse>> {
    let mut image: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() == Some(UPLOAD_FIELD) {
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            image = Some(data.to_vec());
        }
    }

    let image = image
        .filter(|bytes| !bytes.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing required 'file' field".into()))?;

    let summary = lifecycle::create_prediction(&state, account.account_id, &image).await?;

    Ok(Json(PredictResponse {
        prediction_uid: summary.uid,
        detection_count: summary.detection_count,
        labels: summary.labels,
        time_took: round_to(summary.processing_duration.as_secs_f64(), 2),
    }))
}

/// GET /prediction/{uid}
pub async fn get_by_uid(
    State(state): State<AppState>,
    account: AuthAccount,
    Path(uid): Path<String>,
) -> AppResult<Json<PredictionDetail>> {
    let session = PredictionSessionRepo::find_for_owner(&state.pool, &uid, account.account_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "PredictionSession",
            id: uid,
        }))?;

    let objects = DetectionObjectRepo::list_by_session(&state.pool, &session.uid).await?;

    Ok(Json(PredictionDetail {
        uid: session.uid,
        timestamp: session.created_at,
        original_image: session.original_image_ref,
        predicted_image: session.annotated_image_ref,
        detection_objects: objects.into_iter().map(Into::into).collect(),
    }))
}

/// DELETE /prediction/{uid}
pub async fn delete(
    State(state): State<AppState>,
    account: AuthAccount,
    Path(uid): Path<String>,
) -> AppResult<StatusCode> {
    lifecycle::delete_prediction(&state, account.account_id, &uid).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /predictions/label/{label}
///
/// Exact, case-sensitive match. No match is an empty list.
pub async fn list_by_label(
    State(state): State<AppState>,
    account: AuthAccount,
    Path(label): Path<String>,
) -> AppResult<Json<Vec<SessionRef>>> {
    let sessions =
        PredictionQueryRepo::list_by_label(&state.pool, account.account_id, &label).await?;
    Ok(Json(sessions))
}

/// GET /predictions/score/{min_score}
pub async fn list_by_min_score(
    State(state): State<AppState>,
    account: AuthAccount,
    Path(raw_score): Path<String>,
) -> AppResult<Json<Vec<SessionRef>>> {
    let min_score = parse_score_threshold(&raw_score)?;
    let sessions =
        PredictionQueryRepo::list_by_min_score(&state.pool, account.account_id, min_score).await?;
    Ok(Json(sessions))
}
