//! Rolling rank correlation.
//!
//! Both inputs are ranked once over their full length; each window then takes
//! the Pearson correlation of the two rank slices. Flat windows yield `None`
//! instead of dividing by a vanishing denominator, and the emitted values are
//! clipped short of perfect correlation and expressed in percent.

use macrocorr_traits::stats::{ema_nan, forward_fill, to_sparse};
use macrocorr_traits::{CorrError, Result, Sparse};
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

use crate::rank::rank01;

/// Configuration for [`rolling_spearman_with`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpearmanConfig {
    /// Window length in observations
    pub window: usize,
    /// Denominator below which a window is treated as flat
    pub low_var_eps: f64,
    /// Absolute bound on the correlation before scaling to percent
    pub clip: f64,
    /// Span of the NaN-aware EMA applied to the emitted series
    pub ema_soft: usize,
}

impl Default for SpearmanConfig {
    fn default() -> Self {
        Self {
            window: 30,
            low_var_eps: 1e-12,
            clip: 0.95,
            ema_soft: 3,
        }
    }
}

/// Rolling Spearman correlation of `a` and `b` in percent.
///
/// Uses the default [`SpearmanConfig`] with the given `window`.
///
/// # Example
///
/// ```rust
/// use macrocorr_eval::rolling::rolling_spearman;
///
/// let a: Vec<f64> = (1..=40).map(f64::from).collect();
/// let b: Vec<f64> = a.iter().rev().copied().collect();
/// let rho = rolling_spearman(&a, &b, 30).unwrap();
/// assert!(rho[28].is_none());
/// assert!((rho[29].unwrap() + 95.0).abs() < 1e-9);
/// ```
pub fn rolling_spearman(a: &[f64], b: &[f64], window: usize) -> Result<Vec<Sparse>> {
    let config = SpearmanConfig {
        window,
        ..SpearmanConfig::default()
    };
    rolling_spearman_with(a, b, &config)
}

/// Rolling Spearman correlation with explicit configuration.
///
/// Output has the length of the inputs. Positions before `window - 1` are
/// always `None`. Every other position holds `clip(rho) * 100` after a
/// NaN-aware EMA, with gaps forward-filled from the last emitted value; only
/// leading gaps stay `None`. A window containing an unranked (non-finite)
/// input is a gap.
///
/// # Errors
///
/// [`CorrError::LengthMismatch`] if the inputs differ in length, and
/// [`CorrError::InvalidData`] for a window shorter than 2.
pub fn rolling_spearman_with(a: &[f64], b: &[f64], config: &SpearmanConfig) -> Result<Vec<Sparse>> {
    if a.len() != b.len() {
        return Err(CorrError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    if config.window < 2 {
        return Err(CorrError::InvalidData(format!(
            "correlation window must be at least 2, got {}",
            config.window
        )));
    }

    let n = a.len();
    let w = config.window;
    let ra = rank01(a);
    let rb = rank01(b);

    let mut raw = vec![f64::NAN; n];
    for i in (w.saturating_sub(1))..n {
        let start = i + 1 - w;
        let wa = ArrayView1::from(&ra[start..=i]);
        let wb = ArrayView1::from(&rb[start..=i]);
        if let Some(rho) = window_correlation(wa, wb, config.low_var_eps) {
            raw[i] = rho.clamp(-config.clip, config.clip) * 100.0;
        }
    }

    let smoothed = ema_nan(&raw, config.ema_soft);
    Ok(forward_fill(&to_sparse(&smoothed)))
}

/// Pearson correlation of two equally long slices.
///
/// `None` when the slices contain a non-finite value or the denominator falls
/// below `eps`.
fn window_correlation(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>, eps: f64) -> Option<f64> {
    if a.iter().chain(b.iter()).any(|v| !v.is_finite()) {
        return None;
    }
    let mean_a = a.mean()?;
    let mean_b = b.mean()?;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in a.iter().zip(b.iter()) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    let den = (var_a * var_b).sqrt();
    if den < eps {
        return None;
    }
    Some(cov / den)
}
