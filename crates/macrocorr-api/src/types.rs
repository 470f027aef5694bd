//! Wire types for the dashboard backend responses.
//!
//! Shapes follow the JSON the backend emits; only the keys consumed here are
//! modelled and everything else is ignored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sampling granularity for factor history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// One point per day.
    #[default]
    Daily,
}

impl Granularity {
    /// Get the API parameter value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
        }
    }
}

/// `GET /api/factors/history`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    /// Backend success flag.
    #[serde(default)]
    pub success: bool,
    /// Payload when successful.
    #[serde(default)]
    pub data: Option<HistoryData>,
    /// Error message when not.
    #[serde(default)]
    pub error: Option<String>,
}

/// History payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryData {
    /// One point per period.
    #[serde(default)]
    pub series: Vec<HistoryPoint>,
    /// Generation timestamp.
    #[serde(default)]
    pub as_of: Option<String>,
}

/// Dimension scores at one timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryPoint {
    /// ISO timestamp.
    pub ts: String,
    /// Dimension name to 0-100 score; `null` when unavailable.
    #[serde(default)]
    pub dimensions: BTreeMap<String, Option<f64>>,
}

/// `GET /api/factors/corr_lines`
///
/// `rho` arrays are kept as raw JSON: backends send numbers, `null`, and
/// occasionally numeric strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorrLinesResponse {
    /// Date axis.
    #[serde(default)]
    pub dates: Vec<String>,
    /// Factor key to correlation series.
    #[serde(default)]
    pub rho: BTreeMap<String, Vec<Value>>,
}

impl CorrLinesResponse {
    /// Correlation series normalized to `Option<f64>`.
    ///
    /// Numbers and numeric strings become `Some`; `null`, non-numeric and
    /// non-finite entries become `None`.
    pub fn rho_values(&self) -> BTreeMap<String, Vec<Option<f64>>> {
        self.rho
            .iter()
            .map(|(key, values)| (key.clone(), values.iter().map(value_to_f64).collect()))
            .collect()
    }
}

fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

/// `GET /api/factors/index`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactorIndexResponse {
    /// Backend success flag.
    #[serde(default)]
    pub success: bool,
    /// Payload when successful.
    #[serde(default)]
    pub data: Option<FactorIndexData>,
    /// Error message when not.
    #[serde(default)]
    pub error: Option<String>,
}

/// Factor index payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FactorIndexData {
    /// Index series.
    #[serde(default)]
    pub index: Vec<WirePoint>,
    /// Per-dimension contributions.
    #[serde(default)]
    pub contrib: Vec<WireContribution>,
    /// Generation timestamp.
    #[serde(default)]
    pub as_of: Option<String>,
}

/// Raw and smoothed value at one timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WirePoint {
    /// Timestamp.
    pub ts: String,
    /// Unsmoothed value.
    #[serde(default)]
    pub raw: Option<f64>,
    /// Smoothed value.
    #[serde(default)]
    pub smoothed: Option<f64>,
}

/// Contribution series of one dimension.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireContribution {
    /// Dimension name.
    pub key: String,
    /// Points.
    #[serde(default)]
    pub points: Vec<WirePoint>,
}

/// One dated observation.
///
/// ETF series name the value `net`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    /// `YYYY-MM-DD` or a longer timestamp.
    pub date: String,
    /// Observed value.
    #[serde(default, alias = "net")]
    pub value: Option<f64>,
}

/// `GET /api/macro/btc_monitor`
///
/// Every series is a list of dated observations; missing series are empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BtcMonitorResponse {
    /// Effective fed funds rate.
    #[serde(default)]
    pub rate: Vec<Observation>,
    /// CPI year-over-year percent.
    #[serde(default)]
    pub cpi: Vec<Observation>,
    /// Unemployment rate.
    #[serde(default)]
    pub unemp: Vec<Observation>,
    /// BTC close.
    #[serde(default)]
    pub btc: Vec<Observation>,
    /// Fear & Greed.
    #[serde(default)]
    pub fng: Vec<Observation>,
    /// Spot ETF net flows.
    #[serde(default)]
    pub etf: Vec<Observation>,
    /// Nasdaq composite.
    #[serde(default)]
    pub ixic: Vec<Observation>,
    /// S&P 500.
    #[serde(default)]
    pub gspc: Vec<Observation>,
    /// Dollar index.
    #[serde(default)]
    pub dxy: Vec<Observation>,
    /// Gold futures.
    #[serde(default)]
    pub gold: Vec<Observation>,
    /// Stablecoin market cap.
    #[serde(default)]
    pub stablecap: Vec<Observation>,
    /// Network hashrate.
    #[serde(default)]
    pub hashrate: Vec<Observation>,
    /// Perpetual funding rate.
    #[serde(default)]
    pub funding: Vec<Observation>,
}

impl BtcMonitorResponse {
    /// Whether every series is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        [
            &self.rate,
            &self.cpi,
            &self.unemp,
            &self.btc,
            &self.fng,
            &self.etf,
            &self.ixic,
            &self.gspc,
            &self.dxy,
            &self.gold,
            &self.stablecap,
            &self.hashrate,
            &self.funding,
        ]
        .iter()
        .all(|s| s.is_empty())
    }
}

/// `GET /api/fred/{id}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeriesResponse {
    /// Backend success flag.
    #[serde(default)]
    pub success: bool,
    /// Observations, oldest first.
    #[serde(default)]
    pub data: Vec<Observation>,
    /// Error message when not successful.
    #[serde(default)]
    pub error: Option<String>,
}
