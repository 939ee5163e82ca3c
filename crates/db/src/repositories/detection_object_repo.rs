//! Repository for the `detection_objects` table.

use crate::models::detection_object::DetectionObject;
use crate::DbPool;

/// Column list shared across queries to avoid repetition.
pub(crate) const COLUMNS: &str =
    "id, session_uid, label, score, box_xmin, box_ymin, box_xmax, box_ymax";

/// Read access to detection objects. Inserts and deletes happen through
/// [`PredictionSessionRepo`](super::PredictionSessionRepo) so they share the
/// session's transaction.
pub struct DetectionObjectRepo;

impl DetectionObjectRepo {
    /// List the objects of a session in insertion order.
    pub async fn list_by_session(
        pool: &DbPool,
        session_uid: &str,
    ) -> Result<Vec<DetectionObject>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM detection_objects WHERE session_uid = ?1 ORDER BY id ASC"
        );
        sqlx::query_as::<_, DetectionObject>(&query)
            .bind(session_uid)
            .fetch_all(pool)
            .await
    }

    /// Number of objects attached to a session.
    pub async fn count_by_session(pool: &DbPool, session_uid: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM detection_objects WHERE session_uid = ?1")
            .bind(session_uid)
            .fetch_one(pool)
            .await
    }
}
