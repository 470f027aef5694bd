//! Statistical utility functions for series processing.
//!
//! This module provides the smoothing and standardization primitives shared by
//! the resampler, the correlation engine and the composite builders.

use ndarray::Array1;

use crate::types::Sparse;

/// Floor applied to a window standard deviation before dividing.
pub const MIN_STD_THRESHOLD: f64 = 1e-8;

/// Minimum number of finite points a window needs before a Z-score is emitted.
pub const MIN_ZSCORE_POINTS: usize = 3;

/// Smoothing factor for an exponential moving average of the given span.
pub fn ema_alpha(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}

/// Exponential moving average with `alpha = 2/(span+1)`.
///
/// The state is seeded with the first finite value (or `0.0` when there is
/// none). Non-finite inputs are replaced by the running state, so the output
/// is finite everywhere. A span of 0 or 1 returns the input unchanged.
///
/// # Examples
///
/// ```
/// use macrocorr_traits::stats::ema;
///
/// let smoothed = ema(&[1.0, 1.0, 4.0], 3);
/// assert_eq!(smoothed, vec![1.0, 1.0, 2.5]);
/// ```
pub fn ema(values: &[f64], span: usize) -> Vec<f64> {
    if span <= 1 {
        return values.to_vec();
    }
    let alpha = ema_alpha(span);
    let mut prev = values.iter().copied().find(|v| v.is_finite()).unwrap_or(0.0);
    values
        .iter()
        .map(|&v| {
            let x = if v.is_finite() { v } else { prev };
            prev = alpha * x + (1.0 - alpha) * prev;
            prev
        })
        .collect()
}

/// Exponential moving average that propagates missing values.
///
/// Non-finite inputs yield `NaN` at the same position and leave the running
/// state untouched; the first finite input seeds the state. Use this where a
/// missing sentinel must survive smoothing.
pub fn ema_nan(values: &[f64], span: usize) -> Vec<f64> {
    if span <= 1 {
        return values.to_vec();
    }
    let alpha = ema_alpha(span);
    let mut prev: Option<f64> = None;
    values
        .iter()
        .map(|&v| {
            if !v.is_finite() {
                return f64::NAN;
            }
            let next = prev.map_or(v, |p| alpha * v + (1.0 - alpha) * p);
            prev = Some(next);
            next
        })
        .collect()
}

/// EWMA over nullable values where a gap carries the previous smoothed value.
///
/// Leading gaps stay `None`. The first present value seeds the state as-is.
pub fn ewma_carry(values: &[Sparse], alpha: f64) -> Vec<Sparse> {
    let mut prev: Sparse = None;
    values
        .iter()
        .map(|v| {
            if let Some(x) = v {
                prev = Some(prev.map_or(*x, |p| alpha * x + (1.0 - alpha) * p));
            }
            prev
        })
        .collect()
}

/// Replace every gap that follows a present value with the last present value.
///
/// Leading gaps are left as `None`.
pub fn forward_fill(values: &[Sparse]) -> Vec<Sparse> {
    let mut last: Sparse = None;
    values
        .iter()
        .map(|v| {
            if v.is_some() {
                last = *v;
            }
            last
        })
        .collect()
}

/// Convert a float series to nullable form, mapping non-finite values to `None`.
pub fn to_sparse(values: &[f64]) -> Vec<Sparse> {
    values
        .iter()
        .map(|&v| if v.is_finite() { Some(v) } else { None })
        .collect()
}

/// Z-score of `value` against a reference window of raw observations.
///
/// Non-finite entries of the window are ignored. Returns `0.0` when fewer than
/// [`MIN_ZSCORE_POINTS`] finite points remain or when `value` itself is not
/// finite. The population standard deviation is floored at
/// [`MIN_STD_THRESHOLD`].
///
/// # Examples
///
/// ```
/// use macrocorr_traits::stats::calculate_zscore;
///
/// let z = calculate_zscore(3.0, &[1.0, 2.0, 3.0]);
/// assert!((z - 1.224744871391589).abs() < 1e-12);
/// assert_eq!(calculate_zscore(5.0, &[5.0, 5.0]), 0.0);
/// ```
pub fn calculate_zscore(value: f64, window: &[f64]) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let finite: Array1<f64> = window.iter().copied().filter(|x| x.is_finite()).collect();
    if finite.len() < MIN_ZSCORE_POINTS {
        return 0.0;
    }
    let mean = finite.mean().unwrap_or(0.0);
    let std = finite.std(0.0).max(MIN_STD_THRESHOLD);
    (value - mean) / std
}

/// Trailing Z-score of every element against its own window of `window` points.
///
/// Position `i` is scored against `values[i+1-window ..= i]` (truncated at the
/// start of the series).
pub fn rolling_zscore(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            calculate_zscore(values[i], &values[start..=i])
        })
        .collect()
}
