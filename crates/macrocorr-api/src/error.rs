//! Error types for the dashboard backend client.

use thiserror::Error;

/// Errors that can occur when talking to the dashboard backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing base URL.
    #[error("MACROCORR_API_URL environment variable not set")]
    MissingBaseUrl,

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("Failed to parse JSON response: {0}")]
    Json(#[from] serde_json::Error),

    /// Non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// Status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// The backend answered with `success: false`.
    #[error("API error: {0}")]
    Api(String),

    /// The response parsed but carried no usable data.
    #[error("Empty response from {0}")]
    EmptyResponse(String),

    /// Environment variable error.
    #[error("Environment error: {0}")]
    Env(#[from] dotenvy::Error),
}
