//! Composite builders for macrocorr.
//!
//! This crate aggregates per-factor results into the composites a caller
//! displays:
//! - Factor groups: signed partial averages of factor correlation series
//! - Driver Index: weighted negative Z-scores of rates, inflation and unemployment
//! - Factor index: equal-weighted 0-100 composite of dimension scores with
//!   per-dimension contributions
//!
//! # Examples
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use macrocorr_combine::{FactorGroup, compose_groups, count_qualifying_groups};
//! use macrocorr_series::FactorKey;
//!
//! let mut factors = BTreeMap::new();
//! factors.insert(FactorKey::Spx, vec![None, Some(40.0)]);
//! factors.insert(FactorKey::Vix, vec![Some(-20.0), Some(-60.0)]);
//!
//! let groups = compose_groups(&factors);
//! assert_eq!(groups[&FactorGroup::Macro], vec![Some(20.0), Some(50.0)]);
//! assert_eq!(count_qualifying_groups(&groups), 1);
//! ```

mod combiner;
mod driver;
mod factor_index;
mod groups;

// Re-export main types
pub use combiner::{Combiner, PartialMeanCombiner, SignedSeries};
pub use driver::{
    DRIVER_WEIGHTS, DriverIndexRecord, DriverRange, DriverSources, process_driver_index,
    range_start, zscore_window,
};
pub use factor_index::{
    Contribution, DEFAULT_INDEX_ALPHA, DimensionSnapshot, FactorIndex, INDEX_BASELINE, IndexPoint,
    compute_factor_index,
};
pub use groups::{FactorGroup, compose_groups, compose_groups_with, count_qualifying_groups};
