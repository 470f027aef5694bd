//! Error types for the macrocorr engine.
//!
//! The normalizer-level variants (`EmptyPayload`, `MissingDateColumn`,
//! `MissingAssetColumn`) are fatal to a single normalization call. The
//! orchestrator catches them and treats them as a failed primary tier.

use thiserror::Error;

/// The main error type for macrocorr computations.
#[derive(Debug, Error)]
pub enum CorrError {
    /// The payload contained no rows.
    #[error("empty factor payload")]
    EmptyPayload,

    /// None of the recognised date columns is present in the first row.
    #[error("missing date column (expected one of: {0})")]
    MissingDateColumn(String),

    /// No column could be identified as the tracked asset's price.
    #[error("no asset price column among: {0}")]
    MissingAssetColumn(String),

    /// Two series that must be index-aligned have different lengths.
    #[error("length mismatch: {left} vs {right}")]
    LengthMismatch {
        /// Length of the first series.
        left: usize,
        /// Length of the second series.
        right: usize,
    },

    /// Error due to invalid or malformed data.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Error when a date string cannot be parsed.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Error when data is insufficient for the requested operation.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),
}

/// A specialized Result type for macrocorr operations.
pub type Result<T> = std::result::Result<T, CorrError>;
