#![doc(issue_tracker_base_url = "https://github.com/macrocorr/macrocorr/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Shared types, error taxonomy and numeric helpers for the macrocorr engine.
//!
//! This crate provides the foundations the other crates build on: the
//! daily-grid series type, date parsing, the error enum, and the smoothing
//! and Z-score primitives.

/// The version of the macrocorr-traits crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Module declarations
pub mod error;
pub mod stats;
pub mod types;

// Re-exports
pub use error::{CorrError, Result};
pub use types::{DailySeries, Date, Sparse};
