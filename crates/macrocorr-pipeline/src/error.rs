//! Error types for the pipeline.

use macrocorr_api::ApiError;
use macrocorr_traits::CorrError;
use thiserror::Error;

/// Errors raised by individual pipeline stages.
///
/// The correlation view itself never surfaces these: the orchestrator turns
/// them into tier escalations.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Normalization or computation failed.
    #[error(transparent)]
    Corr(#[from] CorrError),

    /// Fetching from the backend failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A source returned nothing usable.
    #[error("no data: {0}")]
    NoData(String),
}

/// Result type for pipeline stages.
pub type Result<T> = std::result::Result<T, PipelineError>;
