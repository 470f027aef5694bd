#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

//! Tiered correlation pipeline for macrocorr.
//!
//! The [`Orchestrator`] turns a [`FactorSource`] into correlation views that
//! never fail to materialize:
//! - local correlation of raw factor history first
//! - the backend's precomputed correlations when the local result is
//!   degenerate or unavailable
//! - a flagged placeholder as the last resort
//!
//! Views are cached with a TTL and every tier transition is published as a
//! [`PipelineEvent`]. The orchestrator also serves the Driver Index and the
//! composite factor index.
//!
//! # Example
//!
//! ```rust,no_run
//! use macrocorr_api::ApiClient;
//! use macrocorr_pipeline::{Orchestrator, PipelineConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let orchestrator = Orchestrator::new(ApiClient::from_env()?, PipelineConfig::default());
//! let view = orchestrator.correlation_view().await;
//! println!("{} groups from {}", view.rho.len(), view.source);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod events;
pub mod frontonly;
pub mod orchestrator;
pub mod source;

pub use cache::TtlCache;
pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use events::{PipelineEvent, Tier};
pub use frontonly::{FrontOnlyResult, compute_front_only};
pub use orchestrator::{
    Clock, CorrelationView, FactorIndexReport, GroupSummary, IndexOrigin, Orchestrator,
    TierOutcome,
};
pub use source::{FactorSource, pivot_monitor};
