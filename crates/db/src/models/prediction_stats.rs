//! Aggregates over the rolling window.

use sightline_core::scoring::LabelCount;

/// The stats bundle for one account's sessions in a window.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionStats {
    pub total_predictions: i64,
    /// Already rounded to three decimals; 0.0 when the window has no objects.
    pub average_confidence_score: f64,
    /// At most five labels, most frequent first.
    pub most_common_labels: Vec<LabelCount>,
}
