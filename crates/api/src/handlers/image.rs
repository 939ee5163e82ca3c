//! Handlers that serve stored image bytes.

use axum::extract::{Path, State};
use axum::http::header::{ACCEPT, CONTENT_TYPE};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use sightline_core::error::CoreError;
use sightline_core::storage::{ImageFormat, ImageKind};
use sightline_db::repositories::PredictionSessionRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthAccount;
use crate::state::AppState;

/// Pick the media type to serve for an `Accept` header value.
///
/// PNG wins when listed; otherwise JPEG (`image/jpeg` or the non-standard
/// `image/jpg`). Anything else, including no header, is not acceptable.
pub fn negotiate_image_type(accept: &str) -> Option<&'static str> {
    if accept.contains("image/png") {
        Some("image/png")
    } else if accept.contains("image/jpeg") || accept.contains("image/jpg") {
        Some("image/jpeg")
    } else {
        None
    }
}

/// GET /prediction/{uid}/image
///
/// Public: serves the annotated image of any session, labelled with the
/// media type the client asked for.
pub async fn prediction_image(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let session = PredictionSessionRepo::find_by_uid(&state.pool, &uid)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "PredictionSession",
                id: uid.clone(),
            })
        })?;

    let bytes = state
        .images
        .get(&session.annotated_image_ref)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "PredictedImage",
                id: uid.clone(),
            })
        })?;

    let accept = headers
        .get(ACCEPT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let media_type = negotiate_image_type(accept).ok_or_else(|| {
        AppError::NotAcceptable("Client does not accept an image format".into())
    })?;

    Ok(([(CONTENT_TYPE, media_type)], bytes))
}

/// GET /image/{kind}/{filename}
///
/// Serves an original or annotated image, only to the account that owns the
/// session it belongs to.
pub async fn stored_image(
    State(state): State<AppState>,
    account: AuthAccount,
    Path((kind, filename)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
    let kind = ImageKind::parse(&kind).map_err(|_| {
        AppError::BadRequest(format!(
            "Invalid image type '{kind}'. Must be one of: original, predicted"
        ))
    })?;
    let reference = kind.reference(&filename);

    let not_found = || {
        AppError::Core(CoreError::NotFound {
            entity: "Image",
            id: reference.clone(),
        })
    };

    PredictionSessionRepo::find_by_image_ref_for_owner(&state.pool, &reference, account.account_id)
        .await?
        .ok_or_else(not_found)?;

    let bytes = state.images.get(&reference).await?.ok_or_else(not_found)?;
    let media_type = ImageFormat::sniff(&bytes)
        .map(ImageFormat::mime_type)
        .unwrap_or("application/octet-stream");

    Ok(([(CONTENT_TYPE, media_type)], bytes))
}
