//! Level-to-signal transforms.
//!
//! Both transforms return a series of the same length as their input whose
//! first element is `NaN`: a return or a difference has no value at the start
//! of the series. Callers must let that sentinel flow through rather than
//! coercing it to zero.

use serde::{Deserialize, Serialize};

/// Floor applied before taking logarithms.
pub const LOG_FLOOR: f64 = 1e-12;

/// How a level series becomes a stationary-ish signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformMode {
    /// `ln(max(v[i], 1e-12)) - ln(max(v[i-1], 1e-12))`
    #[serde(rename = "logret")]
    LogReturn,
    /// `v[i] - v[i-1]`
    Diff,
}

impl TransformMode {
    /// Short name used in listings.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LogReturn => "logret",
            Self::Diff => "diff",
        }
    }
}

/// Apply `mode` to `values`.
///
/// # Examples
///
/// ```
/// use macrocorr_series::transform::{transform_series, TransformMode};
///
/// let out = transform_series(&[1.0, 3.0, 6.0], TransformMode::Diff);
/// assert!(out[0].is_nan());
/// assert_eq!(&out[1..], &[2.0, 3.0]);
/// ```
pub fn transform_series(values: &[f64], mode: TransformMode) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(values.len());
    out.push(f64::NAN);
    out.extend(values.windows(2).map(|w| match mode {
        TransformMode::LogReturn => w[1].max(LOG_FLOOR).ln() - w[0].max(LOG_FLOOR).ln(),
        TransformMode::Diff => w[1] - w[0],
    }));
    out
}

/// Log-returns of a price-like series.
pub fn log_returns(values: &[f64]) -> Vec<f64> {
    transform_series(values, TransformMode::LogReturn)
}

/// First differences of a level series.
pub fn diff(values: &[f64]) -> Vec<f64> {
    transform_series(values, TransformMode::Diff)
}
