//! Repository for the `prediction_sessions` table and the session-scoped
//! writes to `detection_objects`.

use sightline_core::types::DbId;

use crate::models::prediction_session::{
    CreatePredictionSession, DeletedSession, PredictionSession,
};
use crate::DbPool;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "uid, created_at, original_image_ref, annotated_image_ref, owner_id";

/// Provides creation, owner-scoped lookup and cascading deletion of sessions.
pub struct PredictionSessionRepo;

impl PredictionSessionRepo {
    /// Insert a session and all of its detections in one transaction.
    ///
    /// Detections are inserted in slice order, so their ids follow the order
    /// the detector produced them. Either the session and every detection
    /// become visible, or nothing does.
    pub async fn create_with_detections(
        pool: &DbPool,
        input: &CreatePredictionSession<'_>,
    ) -> Result<PredictionSession, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO prediction_sessions
                (uid, created_at, original_image_ref, annotated_image_ref, owner_id)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING {COLUMNS}"
        );
        let session = sqlx::query_as::<_, PredictionSession>(&query)
            .bind(input.uid)
            .bind(input.created_at)
            .bind(input.original_image_ref)
            .bind(input.annotated_image_ref)
            .bind(input.owner_id)
            .fetch_one(&mut *tx)
            .await?;

        for detection in input.detections {
            sqlx::query(
                "INSERT INTO detection_objects
                    (session_uid, label, score, box_xmin, box_ymin, box_xmax, box_ymax)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )
            .bind(input.uid)
            .bind(&detection.label)
            .bind(detection.score)
            .bind(detection.bbox.xmin)
            .bind(detection.bbox.ymin)
            .bind(detection.bbox.xmax)
            .bind(detection.bbox.ymax)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(session)
    }

    /// Find a session by uid, only if it belongs to `owner_id`.
    pub async fn find_for_owner(
        pool: &DbPool,
        uid: &str,
        owner_id: DbId,
    ) -> Result<Option<PredictionSession>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM prediction_sessions WHERE uid = ?1 AND owner_id = ?2");
        sqlx::query_as::<_, PredictionSession>(&query)
            .bind(uid)
            .bind(owner_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a session by uid regardless of owner.
    ///
    /// Only for endpoints that are public by contract (annotated image
    /// download).
    pub async fn find_by_uid(
        pool: &DbPool,
        uid: &str,
    ) -> Result<Option<PredictionSession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM prediction_sessions WHERE uid = ?1");
        sqlx::query_as::<_, PredictionSession>(&query)
            .bind(uid)
            .fetch_optional(pool)
            .await
    }

    /// Find the session of `owner_id` that stores `image_ref` as either its
    /// original or annotated image.
    pub async fn find_by_image_ref_for_owner(
        pool: &DbPool,
        image_ref: &str,
        owner_id: DbId,
    ) -> Result<Option<PredictionSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM prediction_sessions
             WHERE owner_id = ?2
               AND (original_image_ref = ?1 OR annotated_image_ref = ?1)
             LIMIT 1"
        );
        sqlx::query_as::<_, PredictionSession>(&query)
            .bind(image_ref)
            .bind(owner_id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a session owned by `owner_id` together with its detections.
    ///
    /// Children go first, then the parent, inside one transaction so no
    /// detection ever outlives its session. Returns `None` when no such
    /// session belongs to the owner.
    pub async fn delete_for_owner(
        pool: &DbPool,
        uid: &str,
        owner_id: DbId,
    ) -> Result<Option<DeletedSession>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        // Writing first takes the write lock up front instead of upgrading a
        // read snapshot later.
        let children = sqlx::query(
            "DELETE FROM detection_objects
             WHERE session_uid IN (
                 SELECT uid FROM prediction_sessions WHERE uid = ?1 AND owner_id = ?2
             )",
        )
        .bind(uid)
        .bind(owner_id)
        .execute(&mut *tx)
        .await?;

        let query = format!(
            "DELETE FROM prediction_sessions WHERE uid = ?1 AND owner_id = ?2 RETURNING {COLUMNS}"
        );
        let Some(session) = sqlx::query_as::<_, PredictionSession>(&query)
            .bind(uid)
            .bind(owner_id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            tx.rollback().await?;
            return Ok(None);
        };

        tx.commit().await?;

        Ok(Some(DeletedSession {
            uid: session.uid,
            original_image_ref: session.original_image_ref,
            annotated_image_ref: session.annotated_image_ref,
            detections_removed: children.rows_affected(),
        }))
    }
}
