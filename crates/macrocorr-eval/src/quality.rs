//! Result-quality metrics for correlation series.
//!
//! These drive the per-factor level fallback, the orchestrator's degeneracy
//! check and the summary statistics shown next to a view.

use macrocorr_traits::Sparse;

/// Fraction of positions that are `None`. An empty series counts as fully null.
pub fn null_ratio(values: &[Sparse]) -> f64 {
    if values.is_empty() {
        return 1.0;
    }
    values.iter().filter(|v| v.is_none()).count() as f64 / values.len() as f64
}

/// Whether at least one position holds a finite value.
pub fn has_finite(values: &[Sparse]) -> bool {
    values.iter().flatten().any(|v| v.is_finite())
}

/// Linearly interpolated `q`-quantile of the finite values in `values`.
///
/// `q` is clamped to `[0, 1]`. Returns `None` when nothing is finite.
///
/// # Example
///
/// ```rust
/// use macrocorr_eval::quality::quantile;
///
/// assert_eq!(quantile(&[Some(1.0), None, Some(3.0)], 0.5), Some(2.0));
/// assert_eq!(quantile(&[None], 0.5), None);
/// ```
pub fn quantile(values: &[Sparse], q: f64) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().flatten().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let pos = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lo = pos.floor() as usize;
    let frac = pos - lo as f64;
    match sorted.get(lo + 1) {
        Some(hi) => Some(sorted[lo] * (1.0 - frac) + hi * frac),
        None => Some(sorted[lo]),
    }
}

/// Per-index strength of negative correlation across several series.
///
/// At each index, the mean of `|rho| / 100` over the series whose value is
/// negative, capped at 1 and negated. Indices with no negative value are
/// `0.0`. Series shorter than the longest are treated as missing past their
/// end.
pub fn negative_energy(series: &[&[Sparse]]) -> Vec<f64> {
    let len = series.iter().map(|s| s.len()).max().unwrap_or(0);
    (0..len)
        .map(|i| {
            let negatives: Vec<f64> = series
                .iter()
                .filter_map(|s| s.get(i).copied().flatten())
                .filter(|v| v.is_finite() && *v < 0.0)
                .map(|v| v.abs() / 100.0)
                .collect();
            if negatives.is_empty() {
                return 0.0;
            }
            let mean = negatives.iter().sum::<f64>() / negatives.len() as f64;
            -mean.min(1.0)
        })
        .collect()
}
