//! Daily resampling of irregular and low-frequency series.
//!
//! Monthly or weekly macro releases are laid on a complete calendar-day grid
//! by interpolating between observations, then smoothed with an EMA so the
//! result has no visible steps at release dates.

use std::collections::BTreeMap;

use macrocorr_traits::stats::ema;
use macrocorr_traits::types::daily_range;
use macrocorr_traits::{DailySeries, Date};
use serde::{Deserialize, Serialize};

/// Default EMA span applied after interpolation.
pub const DEFAULT_INTERP_SPAN: usize = 7;

/// Median gap, in days, at or above which a series counts as low-frequency.
pub const LOW_FREQ_MEDIAN_GAP_DAYS: i64 = 2;

/// How unobserved days between two observations are filled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationMode {
    /// Standard linear interpolation by position across the gap.
    #[default]
    Proportional,
    /// Each gap day moves `1/(next_pos - pos + 1)` of the way from the last
    /// observation toward the next one. Reproduces the dashboard's historical
    /// curves; not a straight line.
    FirstStepWeight,
}

/// Whether observation dates are sparse enough to need daily resampling.
///
/// Fewer than three observations always count as low-frequency. Otherwise the
/// upper median of the day gaps between consecutive dates is compared against
/// [`LOW_FREQ_MEDIAN_GAP_DAYS`].
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use macrocorr_series::resample::is_low_freq;
///
/// let monthly: Vec<NaiveDate> = (1..=6)
///     .map(|m| NaiveDate::from_ymd_opt(2024, m, 1).unwrap())
///     .collect();
/// assert!(is_low_freq(&monthly));
/// ```
pub fn is_low_freq(dates: &[Date]) -> bool {
    if dates.len() < 3 {
        return true;
    }
    let mut gaps: Vec<i64> = dates.windows(2).map(|w| (w[1] - w[0]).num_days()).collect();
    gaps.sort_unstable();
    gaps[gaps.len() / 2] >= LOW_FREQ_MEDIAN_GAP_DAYS
}

/// Lay `pairs` on a complete daily grid without smoothing.
///
/// The grid spans the earliest to the latest date in `pairs`, including dates
/// whose value is `None`. Observed days keep their value. Days after the first
/// observation are interpolated toward the next observation per `mode`, or
/// held flat when there is none. Days before any observation are `0.0`.
pub fn fill_daily(pairs: &[(Date, Option<f64>)], mode: InterpolationMode) -> DailySeries {
    let (Some(first), Some(last)) = (
        pairs.iter().map(|(d, _)| *d).min(),
        pairs.iter().map(|(d, _)| *d).max(),
    ) else {
        return DailySeries { dates: Vec::new(), values: Vec::new() };
    };

    let observed: BTreeMap<Date, f64> = pairs
        .iter()
        .filter_map(|(d, v)| v.filter(|x| x.is_finite()).map(|x| (*d, x)))
        .collect();

    let dates = daily_range(first, last);
    let at: Vec<Option<f64>> = dates.iter().map(|d| observed.get(d).copied()).collect();

    // next observed position at or after each index
    let mut next_obs: Vec<Option<(usize, f64)>> = vec![None; at.len()];
    let mut upcoming = None;
    for i in (0..at.len()).rev() {
        if let Some(v) = at[i] {
            upcoming = Some((i, v));
        }
        next_obs[i] = upcoming;
    }

    let mut values = Vec::with_capacity(at.len());
    let mut last_seen: Option<(usize, f64)> = None;
    for (i, value) in at.iter().enumerate() {
        if let Some(v) = value {
            values.push(*v);
            last_seen = Some((i, *v));
            continue;
        }
        let filled = match (last_seen, next_obs[i]) {
            (None, _) => 0.0,
            (Some((_, last_v)), None) => last_v,
            (Some((last_pos, last_v)), Some((next_pos, next_v))) => match mode {
                InterpolationMode::Proportional => {
                    let t = (i - last_pos) as f64 / (next_pos - last_pos) as f64;
                    last_v + (next_v - last_v) * t
                }
                InterpolationMode::FirstStepWeight => {
                    last_v + (next_v - last_v) / (next_pos - i + 1) as f64
                }
            },
        };
        values.push(filled);
    }

    DailySeries { dates, values }
}

/// Resample to a daily grid and smooth with an EMA of `span`.
///
/// See [`fill_daily`] for the gap policy. The output has no `NaN`.
pub fn upsample_daily(
    pairs: &[(Date, Option<f64>)],
    span: usize,
    mode: InterpolationMode,
) -> DailySeries {
    let filled = fill_daily(pairs, mode);
    let values = ema(&filled.values, span);
    DailySeries { dates: filled.dates, values }
}
