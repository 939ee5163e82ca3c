//! Detection results and the detection-model collaborator seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::scoring::validate_score;

/// Axis-aligned bounding box in image pixel coordinates.
///
/// Serialized as the quadruple `[xmin, ymin, xmax, ymax]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl From<[f64; 4]> for BoundingBox {
    fn from([xmin, ymin, xmax, ymax]: [f64; 4]) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.xmin, b.ymin, b.xmax, b.ymax]
    }
}

/// One object reported by the detection model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    pub score: f64,
    #[serde(rename = "box")]
    pub bbox: BoundingBox,
}

impl Detection {
    /// Reject detections that cannot be stored: empty label, score outside
    /// `[0, 1]`, or non-finite coordinates.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.label.trim().is_empty() {
            return Err(CoreError::Validation("Detection label is empty".into()));
        }
        validate_score(self.score)?;
        let coords: [f64; 4] = self.bbox.into();
        if coords.iter().any(|c| !c.is_finite()) {
            return Err(CoreError::Validation(format!(
                "Detection box for '{}' has non-finite coordinates",
                self.label
            )));
        }
        Ok(())
    }
}

/// Errors raised by a [`Detector`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum DetectorError {
    /// The model could not be reached.
    #[error("Detector unavailable: {0}")]
    Unavailable(String),

    /// The model answered with something that is not a detection list.
    #[error("Detector returned an invalid response: {0}")]
    InvalidResponse(String),
}

/// The object-detection model, treated as an opaque capability.
#[async_trait]
pub trait Detector: Send + Sync {
    /// Detect objects in an encoded image, in model output order.
    async fn detect(&self, image: &[u8]) -> Result<Vec<Detection>, DetectorError>;

    /// Render `detections` onto the image, returning encoded image bytes.
    async fn annotate(
        &self,
        image: &[u8],
        detections: &[Detection],
    ) -> Result<Vec<u8>, DetectorError>;
}
