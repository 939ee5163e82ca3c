//! Confidence-score rules: threshold parsing and averaging.

use serde::Serialize;

use crate::error::CoreError;

/// Number of labels reported by the stats bundle.
pub const TOP_LABEL_LIMIT: usize = 5;

/// Decimal places kept in the reported average confidence.
pub const AVERAGE_SCORE_DECIMALS: i32 = 3;

/// Parse a minimum-score path segment.
///
/// Anything that is not a finite real number is a validation failure.
pub fn parse_score_threshold(raw: &str) -> Result<f64, CoreError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| {
            CoreError::Validation(format!("min_score must be a real number, got '{raw}'"))
        })
}

/// Validate that a detection score lies in `[0, 1]`.
pub fn validate_score(score: f64) -> Result<(), CoreError> {
    if (0.0..=1.0).contains(&score) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Detection score {score} is outside [0, 1]"
        )))
    }
}

/// Round `value` to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Average confidence as reported by the stats bundle: 0.0 when there is
/// nothing to average, otherwise rounded to three decimals.
pub fn reported_average(average: Option<f64>) -> f64 {
    average
        .map(|avg| round_to(avg, AVERAGE_SCORE_DECIMALS))
        .unwrap_or(0.0)
}

/// How often a label occurred in a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: i64,
}
