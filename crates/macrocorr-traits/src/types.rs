//! Common types used throughout the macrocorr engine.
//!
//! Dates are calendar days in UTC. Every series that reaches the correlation
//! engine has been laid on a gap-free daily grid first.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CorrError, Result};

// Re-export date type from chrono
pub use chrono::NaiveDate as Date;

/// A nullable value aligned to a date axis.
///
/// `None` marks a position with no usable value; it is never coerced to zero.
pub type Sparse = Option<f64>;

/// Canonical `YYYY-MM-DD` rendering of a date.
pub fn format_date(date: Date) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a date from the string forms the backends emit.
///
/// Accepts plain `YYYY-MM-DD`, RFC 3339 timestamps (converted to UTC before
/// truncation), naive `YYYY-MM-DDTHH:MM:SS` / `YYYY-MM-DD HH:MM:SS`, and any
/// longer string whose first ten characters form a date.
pub fn parse_date(raw: &str) -> Result<Date> {
    let s = raw.trim();
    if let Ok(d) = Date::parse_from_str(s, "%Y-%m-%d") {
        return Ok(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc).date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }
    s.get(..10)
        .and_then(|head| Date::parse_from_str(head, "%Y-%m-%d").ok())
        .ok_or_else(|| CorrError::InvalidDate(raw.to_string()))
}

/// Convert epoch milliseconds to the UTC calendar day.
pub fn date_from_millis(millis: i64) -> Result<Date> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|dt| dt.date_naive())
        .ok_or_else(|| CorrError::InvalidDate(millis.to_string()))
}

/// Every calendar day from `first` to `last`, inclusive.
///
/// Returns an empty vector when `last < first`.
pub fn daily_range(first: Date, last: Date) -> Vec<Date> {
    if last < first {
        return Vec::new();
    }
    let days = (last - first).num_days();
    (0..=days).map(|i| first + Duration::days(i)).collect()
}

/// A complete daily grid paired with one finite value per day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySeries {
    /// Consecutive calendar days, no gaps.
    pub dates: Vec<Date>,
    /// One value per date.
    pub values: Vec<f64>,
}

impl DailySeries {
    /// Number of days on the grid.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether the grid is empty.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}
