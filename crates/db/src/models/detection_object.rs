//! Detection object model.

use serde::Serialize;
use sightline_core::detection::BoundingBox;
use sightline_core::types::DbId;
use sqlx::FromRow;

/// A row from the `detection_objects` table.
#[derive(Debug, Clone, FromRow)]
pub struct DetectionObject {
    pub id: DbId,
    pub session_uid: String,
    pub label: String,
    pub score: f64,
    pub box_xmin: f64,
    pub box_ymin: f64,
    pub box_xmax: f64,
    pub box_ymax: f64,
}

impl DetectionObject {
    pub fn bbox(&self) -> BoundingBox {
        BoundingBox {
            xmin: self.box_xmin,
            ymin: self.box_ymin,
            xmax: self.box_xmax,
            ymax: self.box_ymax,
        }
    }
}

/// Detection object as returned to API clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionObjectResponse {
    pub id: DbId,
    pub label: String,
    pub score: f64,
    #[serde(rename = "box")]
    pub bbox: BoundingBox,
}

impl From<DetectionObject> for DetectionObjectResponse {
    fn from(row: DetectionObject) -> Self {
        let bbox = row.bbox();
        Self {
            id: row.id,
            label: row.label,
            score: row.score,
            bbox,
        }
    }
}
