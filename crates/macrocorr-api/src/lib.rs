//! Client for the macro dashboard backend.
//!
//! This crate fetches the raw and precomputed series the correlation pipeline
//! consumes: factor dimension history, server-side correlation lines, the
//! composite factor index, the macro monitor bundle, FRED series and spot ETF
//! flows.
//!
//! # Usage
//!
//! ```rust,ignore
//! use macrocorr_api::{ApiClient, Granularity};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ApiClient::from_env()?;
//!
//!     // Raw monitor bundle for the front-end correlation path
//!     let monitor = client.btc_monitor(180).await?;
//!
//!     // Server-computed correlations
//!     let lines = client.corr_lines("BTC", 30).await?;
//!
//!     // CPI index levels for the Driver Index
//!     let cpi = client.fred_series("CPIAUCSL").await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Environment Variables
//!
//! Set `MACROCORR_API_URL` in your environment or `.env` file:
//!
//! ```bash
//! MACROCORR_API_URL=http://localhost:8889
//! ```

mod client;
mod error;
mod types;

pub use client::{ApiClient, BASE_URL_ENV};
pub use error::ApiError;
pub use types::*;

/// Result type for backend operations.
pub type Result<T> = std::result::Result<T, ApiError>;
