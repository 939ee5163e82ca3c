pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the prediction API route tree, mounted at the root.
///
/// Route hierarchy:
///
/// ```text
/// /predict                              upload and detect (POST)
/// /prediction/{uid}                     get, delete
/// /prediction/{uid}/image               annotated image (public)
/// /predictions/label/{label}            sessions by label
/// /predictions/score/{min_score}        sessions by minimum score
/// /predictions/count                    sessions in the last 7 days (public)
/// /labels                               distinct labels in the last 7 days
/// /stats                                7-day stats bundle
/// /image/{kind}/{filename}              stored original or annotated image
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/predict", post(handlers::prediction::predict))
        .route(
            "/prediction/{uid}",
            get(handlers::prediction::get_by_uid).delete(handlers::prediction::delete),
        )
        .route(
            "/prediction/{uid}/image",
            get(handlers::image::prediction_image),
        )
        .route(
            "/predictions/label/{label}",
            get(handlers::prediction::list_by_label),
        )
        .route(
            "/predictions/score/{min_score}",
            get(handlers::prediction::list_by_min_score),
        )
        .route("/predictions/count", get(handlers::stats::count_recent))
        .route("/labels", get(handlers::stats::unique_labels))
        .route("/stats", get(handlers::stats::stats))
        .route(
            "/image/{kind}/{filename}",
            get(handlers::image::stored_image),
        )
}
