//! Driver Index: a Z-score composite of policy-rate, inflation and labour data.
//!
//! Rising rates, inflation and unemployment are modelled as headwinds for the
//! tracked asset, so each enters with a negative sign. The composite is not
//! smoothed.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration};
use derive_more::Display;
use macrocorr_traits::stats::rolling_zscore;
use macrocorr_traits::types::daily_range;
use macrocorr_traits::{Date, Sparse};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Weights of `-z(rate)`, `-z(cpi_yoy)` and `-z(unemployment)`.
pub const DRIVER_WEIGHTS: [f64; 3] = [0.4, 0.4, 0.2];

/// Bounds on the Z-score window, in days.
pub const ZSCORE_WINDOW_BOUNDS: (usize, usize) = (15, 30);

/// Selectable Driver Index lookback.
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DriverRange {
    /// One week
    #[display("7D")]
    #[serde(rename = "7D")]
    Week,
    /// One month
    #[default]
    #[display("30D")]
    #[serde(rename = "30D")]
    Month,
    /// One quarter
    #[display("90D")]
    #[serde(rename = "90D")]
    Quarter,
}

impl DriverRange {
    /// Number of calendar days covered.
    #[must_use]
    pub const fn days(&self) -> usize {
        match self {
            Self::Week => 7,
            Self::Month => 30,
            Self::Quarter => 90,
        }
    }

    /// Parse `7D`, `30D` or `90D` (case-insensitive).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "7D" => Some(Self::Week),
            "30D" => Some(Self::Month),
            "90D" => Some(Self::Quarter),
            _ => None,
        }
    }
}

/// Raw observations feeding the Driver Index.
///
/// `cpi` holds index levels, not rates of change; the year-over-year figure is
/// derived from monthly buckets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DriverSources {
    /// Policy rate, percent
    pub rate: Vec<(Date, f64)>,
    /// Consumer price index level
    pub cpi: Vec<(Date, f64)>,
    /// Unemployment rate, percent
    pub unemployment: Vec<(Date, f64)>,
    /// Tracked asset price
    pub btc_price: Vec<(Date, f64)>,
    /// Fear & Greed score
    pub fear_greed: Vec<(Date, f64)>,
    /// Spot ETF daily net flow
    pub etf_flow: Vec<(Date, f64)>,
}

/// One day of the Driver Index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverIndexRecord {
    /// Calendar day
    pub date: Date,
    /// Policy rate, forward-filled
    pub rate: Sparse,
    /// CPI year-over-year percent, forward-filled
    pub cpi_yoy: Sparse,
    /// Unemployment rate, forward-filled
    pub unemp: Sparse,
    /// Asset price, forward-filled
    pub btc_price: Sparse,
    /// Fear & Greed, forward-filled
    pub fng: Sparse,
    /// ETF net flow on this exact day; never filled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etf_flow: Sparse,
    /// `0.4(-z_rate) + 0.4(-z_cpi) + 0.2(-z_unemp)`
    pub driver_index: f64,
    /// Z-score of `ln(btc_price)`
    pub z_btc: f64,
    /// Z-score of Fear & Greed
    pub z_fng: f64,
}

/// Z-score window for a lookback of `days`: `clamp(days * 0.2, 15, 30)`.
#[must_use]
pub fn zscore_window(days: usize) -> usize {
    let (lo, hi) = ZSCORE_WINDOW_BOUNDS;
    ((days as f64 * 0.2).round() as usize).clamp(lo, hi)
}

/// Build Driver Index records for the last `days` calendar days of the data.
///
/// Sources are outer-joined by date onto a gap-free daily grid spanning the
/// union of their dates. Levels are forward-filled over the full history, then
/// the trailing `days` records are kept and Z-scored against each other.
///
/// # Example
///
/// ```rust
/// use chrono::NaiveDate;
/// use macrocorr_combine::{DriverSources, process_driver_index};
///
/// let d = |day| NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
/// let sources = DriverSources {
///     rate: (1..=10).map(|i| (d(i), 5.0 + f64::from(i) * 0.01)).collect(),
///     ..DriverSources::default()
/// };
/// let records = process_driver_index(&sources, 7);
/// assert_eq!(records.len(), 7);
/// assert_eq!(records[0].date, d(4));
/// ```
pub fn process_driver_index(sources: &DriverSources, days: usize) -> Vec<DriverIndexRecord> {
    let all_dates = [
        &sources.rate,
        &sources.cpi,
        &sources.unemployment,
        &sources.btc_price,
        &sources.fear_greed,
        &sources.etf_flow,
    ]
    .into_iter()
    .flat_map(|s| s.iter().map(|(d, _)| *d));
    let (Some(first), Some(last)) = (all_dates.clone().min(), all_dates.max()) else {
        return Vec::new();
    };
    let grid = daily_range(first, last);

    let rate = filled_on_grid(&grid, &sources.rate);
    let unemp = filled_on_grid(&grid, &sources.unemployment);
    let btc = filled_on_grid(&grid, &sources.btc_price);
    let fng = filled_on_grid(&grid, &sources.fear_greed);
    let cpi_yoy = cpi_yoy_on_grid(&grid, &sources.cpi);
    let etf: BTreeMap<Date, f64> = finite_map(&sources.etf_flow);

    let start = grid.len().saturating_sub(days);
    let window = zscore_window(days);
    debug!(days, window, total = grid.len(), "building driver index");

    let column = |values: &[Sparse]| -> Vec<f64> {
        values[start..].iter().map(|v| v.unwrap_or(f64::NAN)).collect()
    };
    let ln_btc: Vec<f64> = column(&btc)
        .into_iter()
        .map(|p| if p > 0.0 { p.ln() } else { f64::NAN })
        .collect();

    let z_rate = rolling_zscore(&column(&rate), window);
    let z_cpi = rolling_zscore(&column(&cpi_yoy), window);
    let z_unemp = rolling_zscore(&column(&unemp), window);
    let z_btc = rolling_zscore(&ln_btc, window);
    let z_fng = rolling_zscore(&column(&fng), window);

    let [w_rate, w_cpi, w_unemp] = DRIVER_WEIGHTS;
    (start..grid.len())
        .enumerate()
        .map(|(k, i)| DriverIndexRecord {
            date: grid[i],
            rate: rate[i],
            cpi_yoy: cpi_yoy[i],
            unemp: unemp[i],
            btc_price: btc[i],
            fng: fng[i],
            etf_flow: etf.get(&grid[i]).copied(),
            driver_index: w_rate * -z_rate[k] + w_cpi * -z_cpi[k] + w_unemp * -z_unemp[k],
            z_btc: z_btc[k],
            z_fng: z_fng[k],
        })
        .collect()
}

fn finite_map(observations: &[(Date, f64)]) -> BTreeMap<Date, f64> {
    observations
        .iter()
        .filter(|(_, v)| v.is_finite())
        .copied()
        .collect()
}

/// Values on `grid`, carrying the last observation forward.
fn filled_on_grid(grid: &[Date], observations: &[(Date, f64)]) -> Vec<Sparse> {
    let by_date = finite_map(observations);
    let mut last = None;
    grid.iter()
        .map(|d| {
            if let Some(v) = by_date.get(d) {
                last = Some(*v);
            }
            last
        })
        .collect()
}

/// CPI year-over-year percent per grid day, from month buckets.
///
/// A month's bucket is its latest CPI observation. A day reports the change
/// between its own month and the same month one year earlier; days whose
/// month lacks either bucket carry the previous figure.
fn cpi_yoy_on_grid(grid: &[Date], cpi: &[(Date, f64)]) -> Vec<Sparse> {
    // BTreeMap iteration is date-ordered, so later observations overwrite
    let buckets: BTreeMap<(i32, u32), f64> = finite_map(cpi)
        .into_iter()
        .map(|(d, v)| ((d.year(), d.month()), v))
        .collect();

    let mut last = None;
    grid.iter()
        .map(|d| {
            let current = buckets.get(&(d.year(), d.month()));
            let prior = buckets.get(&(d.year() - 1, d.month()));
            if let (Some(cur), Some(prev)) = (current, prior) {
                if *prev != 0.0 {
                    last = Some((cur / prev - 1.0) * 100.0);
                }
            }
            last
        })
        .collect()
}

/// First day of the trailing `days`-day range ending at `end`.
pub fn range_start(end: Date, days: usize) -> Date {
    end - Duration::days(days.saturating_sub(1) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd_opt(y, m, day).unwrap()
    }

    fn daily(first: Date, n: usize, f: impl Fn(usize) -> f64) -> Vec<(Date, f64)> {
        (0..n).map(|i| (first + Duration::days(i as i64), f(i))).collect()
    }

    #[test]
    fn test_cpi_yoy_uses_monthly_buckets() {
        let sources = DriverSources {
            cpi: vec![(d(2023, 1, 1), 100.0), (d(2024, 1, 1), 103.0)],
            rate: daily(d(2024, 1, 1), 31, |_| 5.0),
            ..DriverSources::default()
        };
        let records = process_driver_index(&sources, 31);
        assert_eq!(records.len(), 31);
        assert_eq!(records[0].date, d(2024, 1, 1));
        for r in &records {
            assert_abs_diff_eq!(r.cpi_yoy.unwrap(), 3.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_cpi_yoy_carries_into_months_without_release() {
        let sources = DriverSources {
            cpi: vec![(d(2023, 1, 15), 200.0), (d(2024, 1, 15), 210.0)],
            rate: daily(d(2024, 1, 1), 45, |_| 5.0),
            ..DriverSources::default()
        };
        let records = process_driver_index(&sources, 45);
        let feb = records.iter().find(|r| r.date == d(2024, 2, 10)).unwrap();
        assert_abs_diff_eq!(feb.cpi_yoy.unwrap(), 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_etf_gaps_are_preserved() {
        let start = d(2024, 6, 1);
        let etf: Vec<(Date, f64)> = daily(start, 30, |i| i as f64 * 10.0)
            .into_iter()
            .enumerate()
            .filter(|(i, _)| !(4..=6).contains(i))
            .map(|(_, obs)| obs)
            .collect();
        let sources = DriverSources {
            rate: daily(start, 30, |i| 5.0 + i as f64 * 0.01),
            etf_flow: etf,
            ..DriverSources::default()
        };
        let records = process_driver_index(&sources, 30);
        assert_eq!(records.len(), 30);
        for (i, r) in records.iter().enumerate() {
            if (4..=6).contains(&i) {
                assert!(r.etf_flow.is_none());
            } else {
                assert!(r.etf_flow.is_some());
            }
        }
        // forward-filled fields have no gaps
        assert!(records.iter().all(|r| r.rate.is_some()));

        let json = serde_json::to_value(&records[5]).unwrap();
        assert!(json.get("etf_flow").is_none());
        assert_eq!(json["date"], "2024-06-06");
    }

    #[test]
    fn test_rising_rates_push_index_down() {
        let start = d(2024, 1, 1);
        let sources = DriverSources {
            rate: daily(start, 90, |i| 1.0 + i as f64 * 0.05),
            unemployment: daily(start, 90, |_| 4.0),
            ..DriverSources::default()
        };
        let records = process_driver_index(&sources, 90);
        let last = records.last().unwrap();
        assert!(last.driver_index < 0.0);
        // unemployment is flat and CPI absent: only the rate term contributes
        let z_rate = -last.driver_index / DRIVER_WEIGHTS[0];
        assert!(z_rate > 1.0);
    }

    #[test]
    fn test_zscores_default_to_zero_without_history() {
        let sources = DriverSources {
            btc_price: vec![(d(2024, 1, 1), 40_000.0), (d(2024, 1, 2), 41_000.0)],
            ..DriverSources::default()
        };
        let records = process_driver_index(&sources, 7);
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.z_btc == 0.0 && r.driver_index == 0.0));
        assert!(records[0].fng.is_none());
    }

    #[test]
    fn test_window_bounds() {
        assert_eq!(zscore_window(7), 15);
        assert_eq!(zscore_window(90), 18);
        assert_eq!(zscore_window(365), 30);
        assert_abs_diff_eq!(DRIVER_WEIGHTS.iter().sum::<f64>(), 1.0);
    }

    #[test]
    fn test_range_parsing() {
        assert_eq!(DriverRange::parse("7d"), Some(DriverRange::Week));
        assert_eq!(DriverRange::parse("90D").map(|r| r.days()), Some(90));
        assert_eq!(DriverRange::parse("1Y"), None);
        assert_eq!(DriverRange::Month.to_string(), "30D");
        assert_eq!(range_start(d(2024, 1, 30), 30), d(2024, 1, 1));
    }

    #[test]
    fn test_empty_sources() {
        assert!(process_driver_index(&DriverSources::default(), 30).is_empty());
    }
}
