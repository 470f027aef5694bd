//! Dashboard backend client implementation.

use crate::{
    Result,
    error::ApiError,
    types::{
        BtcMonitorResponse, CorrLinesResponse, FactorIndexData, FactorIndexResponse, Granularity,
        HistoryData, HistoryResponse, Observation, SeriesResponse,
    },
};
use reqwest::Client;
use tracing::debug;

/// Environment variable holding the backend base URL.
pub const BASE_URL_ENV: &str = "MACROCORR_API_URL";

/// Longest response body kept in a status error.
const MAX_ERROR_BODY: usize = 512;

/// Client for the dashboard backend's factor and macro endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new client for the backend at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Create a new client from the `MACROCORR_API_URL` environment variable.
    ///
    /// This will also load from a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment variable is not set.
    pub fn from_env() -> Result<Self> {
        // Try to load .env file (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url = dotenvy::var(BASE_URL_ENV).map_err(|e| match e {
            dotenvy::Error::EnvVar(std::env::VarError::NotPresent) => ApiError::MissingBaseUrl,
            other => ApiError::Env(other),
        })?;

        Ok(Self::new(base_url))
    }

    /// Base URL requests are made against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a full URL for an endpoint path.
    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// Make a GET request and parse the JSON response.
    async fn get<T: serde::de::DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = self.url(endpoint);
        debug!(%url, "GET");
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = truncate_body(response.text().await.unwrap_or_default());
            return Err(ApiError::Status { status, body });
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Get per-dimension factor scores for the last `days` periods.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the backend reports failure, or
    /// the series is empty.
    pub async fn factors_history(
        &self,
        asset: &str,
        granularity: Granularity,
        days: u32,
    ) -> Result<HistoryData> {
        let endpoint = format!(
            "api/factors/history?asset={}&granularity={}&days={days}",
            asset.to_uppercase(),
            granularity.as_str()
        );
        let resp: HistoryResponse = self.get(&endpoint).await?;
        if !resp.success {
            return Err(ApiError::Api(resp.error.unwrap_or_else(|| "history failed".into())));
        }
        resp.data
            .filter(|d| !d.series.is_empty())
            .ok_or(ApiError::EmptyResponse(endpoint))
    }

    /// Get server-computed rolling correlations per factor.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response has no dates or
    /// no factor keys.
    pub async fn corr_lines(&self, asset: &str, window: usize) -> Result<CorrLinesResponse> {
        let endpoint = format!(
            "api/factors/corr_lines?asset={}&window={window}",
            asset.to_uppercase()
        );
        let resp: CorrLinesResponse = self.get(&endpoint).await?;
        if resp.dates.is_empty() || resp.rho.is_empty() {
            return Err(ApiError::EmptyResponse(endpoint));
        }
        Ok(resp)
    }

    /// Get the server-computed composite factor index.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the backend reports failure, or
    /// the index is empty.
    pub async fn factors_index(
        &self,
        asset: &str,
        granularity: Granularity,
        days: u32,
        alpha: f64,
    ) -> Result<FactorIndexData> {
        let endpoint = format!(
            "api/factors/index?asset={}&granularity={}&days={days}&alpha={alpha}",
            asset.to_uppercase(),
            granularity.as_str()
        );
        let resp: FactorIndexResponse = self.get(&endpoint).await?;
        if !resp.success {
            return Err(ApiError::Api(resp.error.unwrap_or_else(|| "index failed".into())));
        }
        resp.data
            .filter(|d| !d.index.is_empty())
            .ok_or(ApiError::EmptyResponse(endpoint))
    }

    /// Get the macro monitor bundle (asset price plus macro series).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or every series is empty.
    pub async fn btc_monitor(&self, days: u32) -> Result<BtcMonitorResponse> {
        let endpoint = format!("api/macro/btc_monitor?days={days}");
        let resp: BtcMonitorResponse = self.get(&endpoint).await?;
        if resp.is_empty() {
            return Err(ApiError::EmptyResponse(endpoint));
        }
        Ok(resp)
    }

    /// Get a FRED series by id (e.g. `CPIAUCSL`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend reports failure.
    pub async fn fred_series(&self, series_id: &str) -> Result<Vec<Observation>> {
        let endpoint = format!("api/fred/{}", series_id.to_uppercase());
        self.series(&endpoint).await
    }

    async fn series(&self, endpoint: &str) -> Result<Vec<Observation>> {
        let resp: SeriesResponse = self.get(endpoint).await?;
        if !resp.success {
            return Err(ApiError::Api(
                resp.error.unwrap_or_else(|| format!("{endpoint} failed")),
            ));
        }
        Ok(resp.data)
    }
}

fn truncate_body(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let cut = (0..=MAX_ERROR_BODY)
            .rev()
            .find(|i| body.is_char_boundary(*i))
            .unwrap_or(0);
        body.truncate(cut);
    }
    body
}
