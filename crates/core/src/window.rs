//! Rolling time windows computed at query time.

use chrono::Duration;

use crate::types::Timestamp;

/// Length of the reporting window used by counts, labels and stats.
pub const ROLLING_WINDOW_DAYS: i64 = 7;

/// The closed range `[now - days, now]`.
///
/// Never cached: callers build a fresh window from the wall clock on every
/// query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollingWindow {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl RollingWindow {
    /// Window of `days` days ending at `now`.
    pub fn ending_at(now: Timestamp, days: i64) -> Self {
        Self {
            start: now - Duration::days(days),
            end: now,
        }
    }

    /// The standard seven-day window ending at `now`.
    pub fn last_week(now: Timestamp) -> Self {
        Self::ending_at(now, ROLLING_WINDOW_DAYS)
    }

    /// The standard seven-day window ending right now.
    pub fn current() -> Self {
        Self::last_week(chrono::Utc::now())
    }
}
