//! Pipeline configuration.

use macrocorr_eval::SpearmanConfig;
use macrocorr_series::InterpolationMode;
use serde::{Deserialize, Serialize};

/// Tunables for every tier of the correlation pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Tracked asset symbol
    pub asset: String,
    /// Rolling correlation window, in days
    pub window: usize,
    /// Denominator below which a correlation window counts as flat
    pub low_var_eps: f64,
    /// Span of the light EMA on correlation output and on level fallbacks
    pub ema_soft: usize,
    /// EMA span for interpolated low-frequency series
    pub interp_span: usize,
    /// Null share above which a factor is re-correlated on its level
    pub level_fallback_null_ratio: f64,
    /// Groups with data needed to accept the front-end result
    pub min_groups: usize,
    /// Correlation view cache lifetime, in seconds
    pub cache_ttl_secs: u64,
    /// Days of raw history requested for the front-end tier
    pub history_days: usize,
    /// Length of the placeholder view, in days
    pub placeholder_days: usize,
    /// Gap interpolation for low-frequency series
    pub interpolation: InterpolationMode,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            asset: "BTC".to_string(),
            window: 30,
            low_var_eps: 1e-12,
            ema_soft: 3,
            interp_span: 7,
            level_fallback_null_ratio: 0.6,
            min_groups: 2,
            cache_ttl_secs: 86_400,
            history_days: 180,
            placeholder_days: 30,
            interpolation: InterpolationMode::Proportional,
        }
    }
}

impl PipelineConfig {
    /// Correlation engine settings derived from this configuration.
    #[must_use]
    pub fn spearman(&self) -> SpearmanConfig {
        SpearmanConfig {
            window: self.window,
            low_var_eps: self.low_var_eps,
            ema_soft: self.ema_soft,
            ..SpearmanConfig::default()
        }
    }
}
