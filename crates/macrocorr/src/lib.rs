#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/macrocorr/macrocorr/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! # macrocorr
//!
//! macrocorr is an umbrella crate that re-exports all macrocorr sub-crates for
//! convenience.
//!
//! ## Crate Organization
//!
//! - [`traits`] - Shared types, errors and numeric helpers
//! - [`series`] - Normalization, factor registry, resampling and transforms
//! - [`eval`] - Ranks, rolling Spearman and quality metrics
//! - [`combine`] - Factor groups, Driver Index and composite factor index
//! - [`api`] - Dashboard backend client
//! - [`pipeline`] - Tiered orchestrator
//!
//! ## Architecture
//!
//! 1. **Series** normalize raw rows and lay each factor on a daily grid
//! 2. **Eval** rank-correlates each factor signal with asset returns
//! 3. **Combine** aggregates factor correlations into signed groups
//! 4. **Pipeline** validates the result and falls back to the server or a
//!    placeholder when it is degenerate

/// Version information for the macrocorr crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Foundations
// ============================================================================

/// Shared types, error taxonomy and numeric helpers.
pub mod traits {
    pub use macrocorr_traits::*;
}

// Re-export error types
pub use macrocorr_traits::{CorrError, Result};

// Re-export common types
pub use macrocorr_traits::{DailySeries, Date, Sparse};

// ============================================================================
// Series Preparation
// ============================================================================

/// Payload normalization, factor registry, resampling and transforms.
///
/// # Example
///
/// ```
/// use macrocorr::series::{FactorKey, resolve_alias};
///
/// assert_eq!(resolve_alias("gspc"), Some(FactorKey::Spx));
/// ```
pub mod series {
    pub use macrocorr_series::*;
}

pub use macrocorr_series::FactorKey;

// ============================================================================
// Correlation
// ============================================================================

/// Tie-aware ranks, rolling Spearman correlation and quality metrics.
///
/// ## Rolling Spearman
///
/// ```text
/// rho_i = pearson(rank(a)[i-w+1..=i], rank(b)[i-w+1..=i])
/// ```
///
/// clipped to `[-0.95, 0.95]`, scaled to percent, lightly smoothed and
/// forward-filled.
pub mod eval {
    pub use macrocorr_eval::*;
}

// ============================================================================
// Composites
// ============================================================================

/// Factor groups, Driver Index and composite factor index.
///
/// ## Driver Index
///
/// ```text
/// DI = 0.4 (-z_rate) + 0.4 (-z_cpi_yoy) + 0.2 (-z_unemployment)
/// ```
pub mod combine {
    pub use macrocorr_combine::*;
}

pub use macrocorr_combine::{Combiner, FactorGroup};

// ============================================================================
// Data and Orchestration
// ============================================================================

/// Dashboard backend client.
pub mod api {
    pub use macrocorr_api::*;
}

/// Tiered correlation orchestrator.
pub mod pipeline {
    pub use macrocorr_pipeline::*;
}

// ============================================================================
// Prelude
// ============================================================================

/// Prelude module for convenient imports.
///
/// ```
/// use macrocorr::prelude::*;
/// ```
pub mod prelude {
    pub use crate::api::ApiClient;
    pub use crate::pipeline::{CorrelationView, Orchestrator, PipelineConfig, Tier};
    pub use crate::{Combiner, CorrError, Date, FactorGroup, FactorKey, Result, Sparse};
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        let parts: Vec<&str> = VERSION.split('.').collect();
        assert!(parts.len() >= 2, "Version should have at least major.minor");
    }

    #[test]
    fn test_re_exports() {
        fn _accept_combiner(_combiner: &dyn Combiner) {}
        let _result: Result<()> = Ok(());
        let _error = CorrError::InvalidData("test".to_string());
    }

    #[test]
    fn test_end_to_end_normalize_and_group() {
        let payload = serde_json::json!([
            { "date": "2024-01-01", "btc_close": 42000.0, "vix": 13.0 },
            { "date": "2024-01-02", "btc_close": 43000.0, "vix": 12.5 },
        ]);
        let factors = series::normalize_factors(&payload).unwrap();
        assert_eq!(factors.btc_column, "btc_close");

        let keys: Vec<FactorKey> = factors
            .table
            .numeric_columns
            .iter()
            .filter_map(|c| series::resolve_alias(c))
            .collect();
        assert_eq!(keys, vec![FactorKey::Vix]);
        assert!(FactorGroup::Macro.members().iter().any(|(k, _)| *k == FactorKey::Vix));
    }
}
