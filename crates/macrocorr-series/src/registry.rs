//! Factor registry for resolving backend column names to canonical factors.
//!
//! Backends name the same macro series in many ways (`dxy`, `usd_i`, `DX-F`,
//! ...). The registry folds those spellings onto a closed set of factor keys
//! and records, per key, which transform turns its level into a signal.

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::transform::TransformMode;

/// Canonical macro factor correlated against the tracked asset.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FactorKey {
    /// US dollar index
    #[display("DXY")]
    #[serde(rename = "DXY")]
    Dxy,
    /// S&P 500 equity index
    #[display("SPX")]
    #[serde(rename = "SPX")]
    Spx,
    /// Gold spot
    #[display("XAU")]
    #[serde(rename = "XAU")]
    Xau,
    /// CBOE volatility index
    #[display("VIX")]
    #[serde(rename = "VIX")]
    Vix,
    /// Crypto Fear & Greed index
    #[display("FNG")]
    #[serde(rename = "FNG")]
    Fng,
    /// Perpetual funding rate
    #[display("Funding")]
    #[serde(rename = "Funding")]
    Funding,
    /// Spot ETF net flows
    #[display("ETF_Flows")]
    #[serde(rename = "ETF_Flows")]
    EtfFlows,
    /// Chicago Fed National Financial Conditions Index
    #[display("NFCI")]
    #[serde(rename = "NFCI")]
    Nfci,
}

impl FactorKey {
    /// Every registered factor, in display order.
    pub const ALL: [Self; 8] = [
        Self::Spx,
        Self::Vix,
        Self::Dxy,
        Self::Xau,
        Self::Nfci,
        Self::EtfFlows,
        Self::Funding,
        Self::Fng,
    ];

    /// Transform applied to the factor's daily level before ranking.
    ///
    /// Price-like levels (equity index, currency index, gold) use log-returns;
    /// oscillators and flows use first differences.
    #[must_use]
    pub const fn transform_mode(&self) -> TransformMode {
        match self {
            Self::Spx | Self::Xau | Self::Dxy => TransformMode::LogReturn,
            Self::Vix | Self::Fng | Self::Funding | Self::EtfFlows | Self::Nfci => {
                TransformMode::Diff
            }
        }
    }

    /// Lower-case spellings that resolve to this factor.
    #[must_use]
    pub const fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Dxy => &["dxy", "usd_i", "dx", "dx_f", "dx-y.nyb"],
            Self::Spx => &["spx", "^spx", "sp500", "gspc", "^gspc"],
            Self::Xau => &["xau", "xauusd", "gold"],
            Self::Vix => &["vix", "vixcls", "^vix"],
            Self::Fng => &["fng", "fear_greed", "feargreed"],
            Self::Funding => &["funding", "funding_rate"],
            Self::EtfFlows => &["etf_flows", "etf_flow", "etfnet", "etf"],
            Self::Nfci => &["nfci"],
        }
    }

    /// Human-readable description.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Dxy => "US dollar index level",
            Self::Spx => "S&P 500 index level",
            Self::Xau => "Gold spot price",
            Self::Vix => "Equity implied volatility index",
            Self::Fng => "Crypto Fear & Greed sentiment score",
            Self::Funding => "Perpetual futures funding rate",
            Self::EtfFlows => "Spot ETF daily net flows",
            Self::Nfci => "Financial conditions index (higher = tighter)",
        }
    }
}

/// Resolve a backend column or response key to a canonical factor.
///
/// Matching is case-insensitive and ignores surrounding whitespace.
///
/// # Examples
///
/// ```
/// use macrocorr_series::registry::{resolve_alias, FactorKey};
///
/// assert_eq!(resolve_alias("usd_i"), Some(FactorKey::Dxy));
/// assert_eq!(resolve_alias("ETF_Flows"), Some(FactorKey::EtfFlows));
/// assert_eq!(resolve_alias("hashrate"), None);
/// ```
#[must_use]
pub fn resolve_alias(name: &str) -> Option<FactorKey> {
    let needle = name.trim().to_ascii_lowercase();
    FactorKey::ALL
        .into_iter()
        .find(|key| key.aliases().contains(&needle.as_str()))
}

/// Metadata about a registered factor.
#[derive(Debug, Clone, Serialize)]
pub struct FactorInfo {
    /// Canonical key
    pub key: FactorKey,

    /// Transform applied before ranking
    pub transform: TransformMode,

    /// Human-readable description
    pub description: &'static str,

    /// Accepted spellings
    pub aliases: &'static [&'static str],
}

/// Get information about all registered factors.
#[must_use]
pub fn available_factors() -> Vec<FactorInfo> {
    FactorKey::ALL
        .into_iter()
        .map(|key| FactorInfo {
            key,
            transform: key.transform_mode(),
            description: key.description(),
            aliases: key.aliases(),
        })
        .collect()
}
