//! Data sources feeding the pipeline.
//!
//! [`FactorSource`] is the seam between the orchestrator and the network: the
//! backend client implements it for production, tests substitute in-memory
//! stubs.

use std::collections::BTreeMap;
use std::future::Future;

use chrono::Duration;
use macrocorr_api::{
    ApiClient, BtcMonitorResponse, CorrLinesResponse, FactorIndexData, Granularity, HistoryData,
    Observation,
};
use macrocorr_combine::DriverSources;
use macrocorr_traits::types::{format_date, parse_date};
use macrocorr_traits::Date;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{PipelineError, Result};

/// FRED series id of the CPI level used for year-over-year inflation.
pub const CPI_SERIES_ID: &str = "CPIAUCSL";

/// Extra days of monitor history fetched before a Driver Index range.
pub const DRIVER_WARMUP_DAYS: usize = 30;

/// Everything the orchestrator needs from the outside world.
pub trait FactorSource: Send + Sync {
    /// Raw factor table rows: one date column, the asset price and factor
    /// levels, covering roughly the last `days` days.
    fn factor_table(&self, asset: &str, days: usize) -> impl Future<Output = Result<Value>> + Send;

    /// Server-computed per-factor correlation lines.
    fn corr_lines(
        &self,
        asset: &str,
        window: usize,
    ) -> impl Future<Output = Result<CorrLinesResponse>> + Send;

    /// Raw inputs of the Driver Index, with enough history for `days` records.
    fn driver_sources(&self, days: usize) -> impl Future<Output = Result<DriverSources>> + Send;

    /// Server-computed composite factor index.
    fn factor_index(
        &self,
        asset: &str,
        days: usize,
        alpha: f64,
    ) -> impl Future<Output = Result<FactorIndexData>> + Send;

    /// Per-dimension factor score history.
    fn factor_history(
        &self,
        asset: &str,
        days: usize,
    ) -> impl Future<Output = Result<HistoryData>> + Send;
}

fn days_param(days: usize) -> u32 {
    u32::try_from(days).unwrap_or(u32::MAX)
}

impl FactorSource for ApiClient {
    async fn factor_table(&self, _asset: &str, days: usize) -> Result<Value> {
        let monitor = self.btc_monitor(days_param(days)).await?;
        let table = pivot_monitor(&monitor, days);
        if table.as_array().is_none_or(Vec::is_empty) {
            return Err(PipelineError::NoData("monitor has no dated observations".into()));
        }
        Ok(table)
    }

    async fn corr_lines(&self, asset: &str, window: usize) -> Result<CorrLinesResponse> {
        Ok(ApiClient::corr_lines(self, asset, window).await?)
    }

    async fn driver_sources(&self, days: usize) -> Result<DriverSources> {
        let monitor = self.btc_monitor(days_param(days + DRIVER_WARMUP_DAYS)).await?;
        let cpi = self.fred_series(CPI_SERIES_ID).await?;
        Ok(monitor_driver_sources(&monitor, &cpi))
    }

    async fn factor_index(&self, asset: &str, days: usize, alpha: f64) -> Result<FactorIndexData> {
        Ok(self
            .factors_index(asset, Granularity::Daily, days_param(days), alpha)
            .await?)
    }

    async fn factor_history(&self, asset: &str, days: usize) -> Result<HistoryData> {
        Ok(self
            .factors_history(asset, Granularity::Daily, days_param(days))
            .await?)
    }
}

/// Dated finite values of an observation list; undated or empty entries are
/// skipped.
pub fn observations(points: &[Observation]) -> Vec<(Date, f64)> {
    points
        .iter()
        .filter_map(|p| {
            let value = p.value.filter(|v| v.is_finite())?;
            parse_date(&p.date).ok().map(|d| (d, value))
        })
        .collect()
}

/// Driver Index inputs from the monitor bundle plus raw CPI levels.
///
/// The monitor's own `cpi` series is already a year-over-year rate, so CPI
/// levels come separately.
pub fn monitor_driver_sources(monitor: &BtcMonitorResponse, cpi_levels: &[Observation]) -> DriverSources {
    DriverSources {
        rate: observations(&monitor.rate),
        cpi: observations(cpi_levels),
        unemployment: observations(&monitor.unemp),
        btc_price: observations(&monitor.btc),
        fear_greed: observations(&monitor.fng),
        etf_flow: observations(&monitor.etf),
    }
}

/// Pivot the monitor bundle into factor table rows.
///
/// Columns are `btc_close`, `dxy`, `gspc`, `gold`, `fng`, `funding` and `etf`;
/// empty series are left out. Rows start at the later of the latest
/// first-observation date and `days - 1` days before the last date. The first
/// row carries each column's latest value at or before that start, so every
/// column is recognisable as numeric; later rows hold only actual
/// observations.
pub fn pivot_monitor(monitor: &BtcMonitorResponse, days: usize) -> Value {
    let columns: Vec<(&str, BTreeMap<Date, f64>)> = [
        ("btc_close", &monitor.btc),
        ("dxy", &monitor.dxy),
        ("gspc", &monitor.gspc),
        ("gold", &monitor.gold),
        ("fng", &monitor.fng),
        ("funding", &monitor.funding),
        ("etf", &monitor.etf),
    ]
    .into_iter()
    .map(|(name, points)| (name, observations(points).into_iter().collect::<BTreeMap<_, _>>()))
    .filter(|(_, series)| !series.is_empty())
    .collect();

    let (Some(common_start), Some(last)) = (
        columns.iter().filter_map(|(_, s)| s.keys().next()).max().copied(),
        columns.iter().filter_map(|(_, s)| s.keys().next_back()).max().copied(),
    ) else {
        return Value::Array(Vec::new());
    };
    let window_start = last - Duration::days(days.saturating_sub(1) as i64);
    let start = common_start.max(window_start);
    debug!(columns = columns.len(), %start, %last, "pivoting monitor bundle");

    let mut rows: BTreeMap<Date, Map<String, Value>> = BTreeMap::new();
    for (name, series) in &columns {
        if let Some((_, v)) = series.range(..=start).next_back() {
            rows.entry(start).or_default().insert((*name).to_string(), Value::from(*v));
        }
        for (date, v) in series.range(start..).filter(|(d, _)| **d > start) {
            rows.entry(*date).or_default().insert((*name).to_string(), Value::from(*v));
        }
    }

    Value::Array(
        rows.into_iter()
            .map(|(date, mut row)| {
                row.insert("date".to_string(), Value::from(format_date(date)));
                Value::Object(row)
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use macrocorr_series::normalize_factors;
    use serde_json::json;

    fn obs(date: &str, value: f64) -> Observation {
        Observation {
            date: date.to_string(),
            value: Some(value),
        }
    }

    fn monitor() -> BtcMonitorResponse {
        BtcMonitorResponse {
            btc: vec![
                obs("2024-01-01", 42_000.0),
                obs("2024-01-02", 43_000.0),
                obs("2024-01-03", 44_000.0),
                obs("2024-01-04", 45_000.0),
            ],
            // weekday-only series starting before the asset
            gspc: vec![obs("2023-12-29", 4_700.0), obs("2024-01-03", 4_750.0)],
            etf: vec![obs("2024-01-02", -50.0)],
            cpi: vec![obs("2024-01-01", 3.1)],
            ..BtcMonitorResponse::default()
        }
    }

    #[test]
    fn test_pivot_first_row_carries_every_column() {
        let table = pivot_monitor(&monitor(), 180);
        let rows = table.as_array().unwrap();
        // common start is the etf start, 2024-01-02
        assert_eq!(rows[0]["date"], "2024-01-02");
        assert_eq!(rows[0]["btc_close"], json!(43_000.0));
        assert_eq!(rows[0]["gspc"], json!(4_700.0));
        assert_eq!(rows[0]["etf"], json!(-50.0));
        assert_eq!(rows.len(), 3);
        assert!(rows[2].get("gspc").is_none());

        let factors = normalize_factors(&table).unwrap();
        assert_eq!(factors.btc_column, "btc_close");
        assert_eq!(factors.table.numeric_columns.len(), 3);
    }

    #[test]
    fn test_pivot_respects_days() {
        let mut m = monitor();
        m.etf.clear();
        let table = pivot_monitor(&m, 2);
        let rows = table.as_array().unwrap();
        assert_eq!(rows[0]["date"], "2024-01-03");
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_pivot_empty_monitor() {
        let table = pivot_monitor(&BtcMonitorResponse::default(), 30);
        assert_eq!(table, json!([]));
    }

    #[test]
    fn test_driver_sources_use_cpi_levels() {
        let cpi = vec![obs("2023-01-01", 300.0), obs("2024-01-01", 309.0)];
        let sources = monitor_driver_sources(&monitor(), &cpi);
        assert_eq!(sources.cpi.len(), 2);
        assert_eq!(sources.btc_price.len(), 4);
        assert_eq!(sources.etf_flow.len(), 1);
        assert!(sources.rate.is_empty());
    }

    #[test]
    fn test_observations_skip_bad_entries() {
        let points = vec![
            obs("2024-01-01", 1.0),
            Observation { date: "2024-01-02".into(), value: None },
            obs("not a date", 3.0),
            obs("2024-01-04T00:00:00Z", 4.0),
        ];
        let out = observations(&points);
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].1, 4.0);
    }
}
