//! Locally computed factor correlations.
//!
//! Every column of a normalized factor table is laid on the table's daily
//! grid, transformed per its factor key and rank-correlated with the asset's
//! log-returns. Factors whose transformed signal is mostly degenerate are
//! re-correlated on their smoothed level instead.

use std::collections::BTreeMap;

use macrocorr_combine::{FactorGroup, compose_groups};
use macrocorr_eval::{SpearmanConfig, null_ratio, rolling_spearman_with};
use macrocorr_series::resample::fill_daily;
use macrocorr_series::transform::log_returns;
use macrocorr_series::{
    FactorKey, InterpolationMode, NormalizedFactors, NormalizedTable, is_low_freq, resolve_alias,
    transform_series, upsample_daily,
};
use macrocorr_traits::stats::{ema, ema_nan};
use macrocorr_traits::{CorrError, DailySeries, Date, Result, Sparse};
use tracing::debug;

use crate::config::PipelineConfig;

/// Per-factor and per-group correlations on a shared daily axis.
#[derive(Debug, Clone, PartialEq)]
pub struct FrontOnlyResult {
    /// Daily grid shared by every series.
    pub dates: Vec<Date>,
    /// Correlation with the asset, per resolved factor.
    pub factors: BTreeMap<FactorKey, Vec<Sparse>>,
    /// Signed group composites of `factors`.
    pub groups: BTreeMap<FactorGroup, Vec<Sparse>>,
}

/// Lay one column on the table's daily grid.
///
/// Low-frequency columns are interpolated and smoothed with `interp_span`;
/// daily columns are only gap-filled.
fn align_column(
    table: &NormalizedTable,
    column: &str,
    interp_span: usize,
    mode: InterpolationMode,
) -> DailySeries {
    let observed: Vec<Date> = table.observations(column).into_iter().map(|(d, _)| d).collect();
    let span = if is_low_freq(&observed) { interp_span } else { 1 };
    upsample_daily(&table.series(column), span, mode)
}

/// Correlate one factor level against asset returns.
///
/// Returns the correlation series and whether the level fallback was used.
fn correlate_factor(
    btc_returns: &[f64],
    level: &[f64],
    key: FactorKey,
    config: &PipelineConfig,
    spearman: &SpearmanConfig,
) -> Result<(Vec<Sparse>, bool)> {
    let smoothed = ema(level, config.interp_span);
    // Keeps the transform's leading NaN unranked. The asset returns start with
    // NaN too, so the first window is a gap either way.
    let signal = ema_nan(&transform_series(&smoothed, key.transform_mode()), config.ema_soft);
    let rho = rolling_spearman_with(btc_returns, &signal, spearman)?;

    let ratio = null_ratio(&rho);
    if ratio <= config.level_fallback_null_ratio {
        return Ok((rho, false));
    }
    debug!(factor = %key, null_ratio = ratio, "falling back to level correlation");
    let level_signal = ema(level, config.ema_soft);
    Ok((rolling_spearman_with(btc_returns, &level_signal, spearman)?, true))
}

/// Compute factor and group correlations from a normalized factor table.
///
/// Columns that do not resolve to a known factor are skipped, as are later
/// columns resolving to an already seen factor.
///
/// # Errors
///
/// [`CorrError::InsufficientData`] when the table spans no more days than the
/// correlation window.
pub fn compute_front_only(
    factors: &NormalizedFactors,
    config: &PipelineConfig,
) -> Result<FrontOnlyResult> {
    let table = &factors.table;
    let btc = fill_daily(&table.series(&factors.btc_column), config.interpolation);
    if btc.len() <= config.window {
        return Err(CorrError::InsufficientData(format!(
            "{} daily points for a {}-day window",
            btc.len(),
            config.window
        )));
    }
    let btc_returns = log_returns(&btc.values);
    let spearman = config.spearman();

    let mut correlations = BTreeMap::new();
    for column in table.numeric_columns.iter().filter(|c| **c != factors.btc_column) {
        let Some(key) = resolve_alias(column) else {
            debug!(%column, "skipping unregistered column");
            continue;
        };
        if correlations.contains_key(&key) {
            debug!(%column, factor = %key, "factor already resolved, skipping column");
            continue;
        }
        if table.observations(column).is_empty() {
            debug!(%column, "column has no observations");
            continue;
        }

        let level = align_column(table, column, config.interp_span, config.interpolation);
        let (rho, used_level) =
            correlate_factor(&btc_returns, &level.values, key, config, &spearman)?;
        debug!(%column, factor = %key, used_level, null_ratio = null_ratio(&rho), "factor correlated");
        correlations.insert(key, rho);
    }

    let groups = compose_groups(&correlations);
    Ok(FrontOnlyResult {
        dates: btc.dates,
        factors: correlations,
        groups,
    })
}
