//! Read-side queries over sessions and detections: filters, rolling-window
//! counts and the stats bundle.

use sightline_core::scoring::{reported_average, LabelCount, TOP_LABEL_LIMIT};
use sightline_core::types::DbId;
use sightline_core::window::RollingWindow;
use sqlx::SqliteConnection;

use crate::models::prediction_session::SessionRef;
use crate::models::prediction_stats::PredictionStats;
use crate::DbPool;

/// Named query functions for the read side. Every function except
/// [`count_in_window`](Self::count_in_window) is scoped to one owner.
pub struct PredictionQueryRepo;

impl PredictionQueryRepo {
    /// Sessions of `owner_id` with at least one object labelled exactly
    /// `label` (case-sensitive), newest first.
    pub async fn list_by_label(
        pool: &DbPool,
        owner_id: DbId,
        label: &str,
    ) -> Result<Vec<SessionRef>, sqlx::Error> {
        sqlx::query_as::<_, SessionRef>(
            "SELECT s.uid, s.created_at FROM prediction_sessions s
             WHERE s.owner_id = ?1
               AND EXISTS (
                   SELECT 1 FROM detection_objects d
                   WHERE d.session_uid = s.uid AND d.label = ?2
               )
             ORDER BY s.created_at DESC, s.uid ASC",
        )
        .bind(owner_id)
        .bind(label)
        .fetch_all(pool)
        .await
    }

    /// Sessions of `owner_id` with at least one object scoring
    /// `>= min_score`, newest first.
    pub async fn list_by_min_score(
        pool: &DbPool,
        owner_id: DbId,
        min_score: f64,
    ) -> Result<Vec<SessionRef>, sqlx::Error> {
        sqlx::query_as::<_, SessionRef>(
            "SELECT s.uid, s.created_at FROM prediction_sessions s
             WHERE s.owner_id = ?1
               AND EXISTS (
                   SELECT 1 FROM detection_objects d
                   WHERE d.session_uid = s.uid AND d.score >= ?2
               )
             ORDER BY s.created_at DESC, s.uid ASC",
        )
        .bind(owner_id)
        .bind(min_score)
        .fetch_all(pool)
        .await
    }

    /// Sessions of every owner created inside `window`.
    pub async fn count_in_window(
        pool: &DbPool,
        window: &RollingWindow,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM prediction_sessions
             WHERE created_at >= ?1 AND created_at <= ?2",
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_one(pool)
        .await
    }

    /// Distinct labels on `owner_id`'s sessions inside `window`, sorted.
    pub async fn unique_labels_in_window(
        pool: &DbPool,
        owner_id: DbId,
        window: &RollingWindow,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT DISTINCT d.label FROM detection_objects d
             JOIN prediction_sessions s ON s.uid = d.session_uid
             WHERE s.owner_id = ?1 AND s.created_at >= ?2 AND s.created_at <= ?3
             ORDER BY d.label ASC",
        )
        .bind(owner_id)
        .bind(window.start)
        .bind(window.end)
        .fetch_all(pool)
        .await
    }

    /// Session count, average score and top labels for `owner_id` inside
    /// `window`.
    ///
    /// The three reads share one transaction so they see the same snapshot.
    pub async fn stats_in_window(
        pool: &DbPool,
        owner_id: DbId,
        window: &RollingWindow,
    ) -> Result<PredictionStats, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let total_predictions = owner_count_in_window(&mut tx, owner_id, window).await?;
        let average = owner_average_score_in_window(&mut tx, owner_id, window).await?;
        let most_common_labels = owner_top_labels_in_window(&mut tx, owner_id, window).await?;

        tx.commit().await?;

        Ok(PredictionStats {
            total_predictions,
            average_confidence_score: reported_average(average),
            most_common_labels,
        })
    }
}

// ---------------------------------------------------------------------------
// Connection-level helpers shared by the stats transaction
// ---------------------------------------------------------------------------

async fn owner_count_in_window(
    conn: &mut SqliteConnection,
    owner_id: DbId,
    window: &RollingWindow,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM prediction_sessions
         WHERE owner_id = ?1 AND created_at >= ?2 AND created_at <= ?3",
    )
    .bind(owner_id)
    .bind(window.start)
    .bind(window.end)
    .fetch_one(conn)
    .await
}

async fn owner_average_score_in_window(
    conn: &mut SqliteConnection,
    owner_id: DbId,
    window: &RollingWindow,
) -> Result<Option<f64>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT AVG(d.score) FROM detection_objects d
         JOIN prediction_sessions s ON s.uid = d.session_uid
         WHERE s.owner_id = ?1 AND s.created_at >= ?2 AND s.created_at <= ?3",
    )
    .bind(owner_id)
    .bind(window.start)
    .bind(window.end)
    .fetch_one(conn)
    .await
}

/// The most frequent labels in the window, most frequent first. Ties go to
/// the label whose first detection was stored earliest.
async fn owner_top_labels_in_window(
    conn: &mut SqliteConnection,
    owner_id: DbId,
    window: &RollingWindow,
) -> Result<Vec<LabelCount>, sqlx::Error> {
    let rows: Vec<(String, i64)> = sqlx::query_as(
        "SELECT d.label, COUNT(*) FROM detection_objects d
         JOIN prediction_sessions s ON s.uid = d.session_uid
         WHERE s.owner_id = ?1 AND s.created_at >= ?2 AND s.created_at <= ?3
         GROUP BY d.label
         ORDER BY COUNT(*) DESC, MIN(d.id) ASC
         LIMIT ?4",
    )
    .bind(owner_id)
    .bind(window.start)
    .bind(window.end)
    .bind(TOP_LABEL_LIMIT as i64)
    .fetch_all(conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(label, count)| LabelCount { label, count })
        .collect())
}
