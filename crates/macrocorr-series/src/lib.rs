//! Series preparation for the macrocorr engine.
//!
//! This crate turns raw backend payloads into clean daily series:
//! - Normalize: date/numeric column detection over heterogeneous row payloads
//! - Registry: alias folding onto canonical factor keys and per-factor transforms
//! - Resample: low-frequency detection and daily interpolation plus smoothing
//! - Transform: log-returns and first differences with a leading `NaN` sentinel
//!
//! # Example
//!
//! ```ignore
//! use macrocorr_series::normalize::normalize_factors;
//! use macrocorr_series::registry::resolve_alias;
//!
//! let factors = normalize_factors(&payload)?;
//! for column in &factors.table.numeric_columns {
//!     if let Some(key) = resolve_alias(column) {
//!         println!("{column} -> {key}");
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod normalize;
pub mod registry;
pub mod resample;
pub mod transform;

// Re-export key types
pub use normalize::{NormalizedFactors, NormalizedTable, normalize_factors, normalize_table};
pub use registry::{FactorInfo, FactorKey, available_factors, resolve_alias};
pub use resample::{InterpolationMode, is_low_freq, upsample_daily};
pub use transform::{TransformMode, transform_series};
