//! Composite long/short factor index from per-dimension scores.
//!
//! Each dimension is scored 0-100 with 50 neutral. At every point the
//! available dimensions are equally weighted; a dimension's excess
//! `e = (s - 50) / 50` contributes `50 * w * e` index points on top of the
//! baseline, so the contributions sum to `index - 50` before clipping.

use std::collections::BTreeMap;

use macrocorr_traits::stats::ewma_carry;
use macrocorr_traits::Sparse;
use serde::{Deserialize, Serialize};

use crate::groups::FactorGroup;

/// Neutral index level.
pub const INDEX_BASELINE: f64 = 50.0;

/// Default EWMA smoothing factor.
pub const DEFAULT_INDEX_ALPHA: f64 = 0.3;

/// Dimension scores at one timestamp. Missing dimensions are absent keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DimensionSnapshot {
    /// Timestamp as reported by the source
    pub ts: String,
    /// Score per dimension, 0-100
    pub dimensions: BTreeMap<FactorGroup, f64>,
}

/// Raw and smoothed value at one timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexPoint {
    /// Timestamp
    pub ts: String,
    /// Unsmoothed value; `None` when no dimension was available
    pub raw: Sparse,
    /// EWMA of `raw`, carried over gaps
    pub smoothed: Sparse,
}

/// Contribution series of one dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    /// Dimension
    pub key: FactorGroup,
    /// Contribution in index points
    pub points: Vec<IndexPoint>,
}

/// The composite index with its per-dimension decomposition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorIndex {
    /// Index level, clipped to `[0, 100]`
    pub index: Vec<IndexPoint>,
    /// One entry per dimension, in [`FactorGroup::ALL`] order
    pub contrib: Vec<Contribution>,
    /// Smoothing factor used
    pub alpha: f64,
    /// Neutral level
    pub baseline: f64,
}

impl FactorIndex {
    /// Latest smoothed index level, if any.
    pub fn latest(&self) -> Sparse {
        self.index.iter().rev().find_map(|p| p.smoothed)
    }
}

/// Compute the composite index and contributions from dimension snapshots.
///
/// # Example
///
/// ```rust
/// use macrocorr_combine::{DimensionSnapshot, FactorGroup, compute_factor_index};
///
/// let snap = DimensionSnapshot {
///     ts: "2024-05-01".into(),
///     dimensions: [(FactorGroup::Macro, 100.0), (FactorGroup::Sentiment, 50.0)].into(),
/// };
/// let index = compute_factor_index(&[snap], 0.3);
/// assert_eq!(index.index[0].raw, Some(75.0));
/// ```
pub fn compute_factor_index(snapshots: &[DimensionSnapshot], alpha: f64) -> FactorIndex {
    let mut raw_index: Vec<Sparse> = Vec::with_capacity(snapshots.len());
    let mut raw_contrib: BTreeMap<FactorGroup, Vec<Sparse>> = FactorGroup::ALL
        .into_iter()
        .map(|g| (g, Vec::with_capacity(snapshots.len())))
        .collect();

    for snap in snapshots {
        let available: Vec<(FactorGroup, f64)> = snap
            .dimensions
            .iter()
            .filter(|(_, s)| s.is_finite())
            .map(|(g, s)| (*g, *s))
            .collect();

        if available.is_empty() {
            raw_index.push(None);
            raw_contrib.values_mut().for_each(|c| c.push(None));
            continue;
        }

        let w = 1.0 / available.len() as f64;
        let mut weighted_excess = 0.0;
        for (group, series) in &mut raw_contrib {
            let score = available.iter().find(|(g, _)| g == group).map(|(_, s)| *s);
            series.push(score.map(|s| {
                let e = (s - INDEX_BASELINE) / INDEX_BASELINE;
                weighted_excess += w * e;
                INDEX_BASELINE * w * e
            }));
        }
        raw_index.push(Some(
            (INDEX_BASELINE + INDEX_BASELINE * weighted_excess).clamp(0.0, 100.0),
        ));
    }

    let points = |raw: &[Sparse]| -> Vec<IndexPoint> {
        snapshots
            .iter()
            .zip(raw)
            .zip(ewma_carry(raw, alpha))
            .map(|((snap, r), smoothed)| IndexPoint {
                ts: snap.ts.clone(),
                raw: *r,
                smoothed,
            })
            .collect()
    };

    FactorIndex {
        index: points(&raw_index),
        contrib: raw_contrib
            .iter()
            .map(|(key, raw)| Contribution {
                key: *key,
                points: points(raw),
            })
            .collect(),
        alpha,
        baseline: INDEX_BASELINE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn snap(ts: &str, dims: &[(FactorGroup, f64)]) -> DimensionSnapshot {
        DimensionSnapshot {
            ts: ts.to_string(),
            dimensions: dims.iter().copied().collect(),
        }
    }

    #[test]
    fn test_contributions_sum_to_excess() {
        let s = snap(
            "t0",
            &[
                (FactorGroup::Macro, 70.0),
                (FactorGroup::Policy, 30.0),
                (FactorGroup::Capital, 90.0),
            ],
        );
        let out = compute_factor_index(&[s], DEFAULT_INDEX_ALPHA);
        let index = out.index[0].raw.unwrap();
        let total: f64 = out.contrib.iter().filter_map(|c| c.points[0].raw).sum();
        assert_abs_diff_eq!(index - INDEX_BASELINE, total, epsilon = 1e-12);
        assert_abs_diff_eq!(index, 50.0 + 50.0 * (0.4 - 0.4 + 0.8) / 3.0, epsilon = 1e-12);

        let geo = out.contrib.iter().find(|c| c.key == FactorGroup::Geopolitics).unwrap();
        assert!(geo.points[0].raw.is_none());
    }

    #[test]
    fn test_empty_snapshot_carries_smoothed_value() {
        let series = vec![
            snap("t0", &[(FactorGroup::Sentiment, 100.0)]),
            snap("t1", &[]),
            snap("t2", &[(FactorGroup::Sentiment, 0.0)]),
        ];
        let out = compute_factor_index(&series, 0.5);
        assert_eq!(out.index[1].raw, None);
        assert_eq!(out.index[1].smoothed, Some(100.0));
        assert_abs_diff_eq!(out.index[2].smoothed.unwrap(), 50.0);
        assert_eq!(out.latest(), Some(50.0));
    }

    #[test]
    fn test_index_is_clipped() {
        let s = snap("t0", &[(FactorGroup::Onchain, 250.0)]);
        let out = compute_factor_index(&[s], DEFAULT_INDEX_ALPHA);
        assert_abs_diff_eq!(out.index[0].raw.unwrap(), 100.0);
    }

    #[test]
    fn test_one_contribution_per_dimension() {
        let out = compute_factor_index(&[], DEFAULT_INDEX_ALPHA);
        assert_eq!(out.contrib.len(), FactorGroup::ALL.len());
        assert!(out.index.is_empty());
        assert_eq!(out.latest(), None);
    }
}
