//! Rank correlation and result evaluation for macrocorr.
//!
//! This crate provides the correlation engine and the metrics used to judge
//! its output:
//! - Tie-aware fractional ranks
//! - Rolling Spearman correlation with a low-variance guard, clipping,
//!   smoothing and forward-fill
//! - Result-quality metrics (null ratio, quantiles, negative-correlation energy)
//!
//! # Example
//!
//! ```rust
//! use macrocorr_eval::{null_ratio, rolling_spearman};
//!
//! let btc: Vec<f64> = (1..=60).map(|i| (i as f64).ln()).collect();
//! let dxy: Vec<f64> = btc.iter().map(|x| -x).collect();
//! let rho = rolling_spearman(&btc, &dxy, 30).unwrap();
//! assert!(null_ratio(&rho) < 0.6);
//! ```

pub mod quality;
pub mod rank;
pub mod rolling;

// Re-export main types
pub use quality::{has_finite, negative_energy, null_ratio, quantile};
pub use rank::rank01;
pub use rolling::{SpearmanConfig, rolling_spearman, rolling_spearman_with};
