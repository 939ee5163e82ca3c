//! Handlers for rolling-window aggregates.
//!
//! All windows cover the last seven days and are computed from the wall
//! clock on every request.

use axum::extract::State;
use axum::Json;
use indexmap::IndexMap;
use serde::Serialize;
use sightline_core::window::RollingWindow;
use sightline_db::repositories::PredictionQueryRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthAccount;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct LabelsResponse {
    pub labels: Vec<String>,
}

/// Response body of `GET /stats`.
///
/// `most_common_labels` keeps ranking order when serialized.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_predictions: i64,
    pub average_confidence_score: f64,
    pub most_common_labels: IndexMap<String, i64>,
}

/// GET /predictions/count
///
/// Counts sessions of every account; no credentials needed.
pub async fn count_recent(State(state): State<AppState>) -> AppResult<Json<CountResponse>> {
    let window = RollingWindow::current();
    let count = PredictionQueryRepo::count_in_window(&state.pool, &window).await?;
    Ok(Json(CountResponse { count }))
}

/// GET /labels
pub async fn unique_labels(
    State(state): State<AppState>,
    account: AuthAccount,
) -> AppResult<Json<LabelsResponse>> {
    let window = RollingWindow::current();
    let labels =
        PredictionQueryRepo::unique_labels_in_window(&state.pool, account.account_id, &window)
            .await?;
    Ok(Json(LabelsResponse { labels }))
}

/// GET /stats
pub async fn stats(
    State(state): State<AppState>,
    account: AuthAccount,
) -> AppResult<Json<StatsResponse>> {
    let window = RollingWindow::current();
    let stats =
        PredictionQueryRepo::stats_in_window(&state.pool, account.account_id, &window).await?;

    Ok(Json(StatsResponse {
        total_predictions: stats.total_predictions,
        average_confidence_score: stats.average_confidence_score,
        most_common_labels: stats
            .most_common_labels
            .into_iter()
            .map(|entry| (entry.label, entry.count))
            .collect(),
    }))
}
