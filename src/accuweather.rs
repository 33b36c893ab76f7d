//! AccuWeather client for the 5-day daily forecast endpoint
//!
//! Issues one GET per call and hands back the decoded body untouched. Status
//! codes are not interpreted; the transformer decides whether the body is usable.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::{debug, info, instrument, warn};

use crate::config::UpstreamConfig;
use crate::models::{LocationKey, RawForecast};
use crate::{ForecastError, Result};

const FORECAST_PATH: [&str; 4] = ["forecasts", "v1", "daily", "5day"];

/// Anything that can produce a raw forecast for a location
#[async_trait]
pub trait ForecastSource: Send + Sync {
    async fn fetch(&self, location_key: &LocationKey) -> Result<RawForecast>;
}

/// HTTP client for the AccuWeather forecast API
#[derive(Debug, Clone)]
pub struct AccuWeatherClient {
    http: Client,
    base_url: Url,
    api_key: String,
}

impl AccuWeatherClient {
    /// Create a client against `base_url` with a per-request timeout
    pub fn new(base_url: &str, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ForecastError::config(format!("Invalid upstream base URL '{base_url}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ForecastError::config(format!(
                "Upstream base URL '{base_url}' cannot carry a path"
            )));
        }

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("forecast-proxy/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ForecastError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url,
            api_key: api_key.into(),
        })
    }

    pub fn from_config(config: &UpstreamConfig) -> Result<Self> {
        Self::new(&config.base_url, config.api_key.clone(), config.timeout())
    }

    /// `{base}/forecasts/v1/daily/5day/{key}?apikey=..&details=true`
    ///
    /// The key is pushed as a single encoded path segment.
    pub fn forecast_url(&self, location_key: &LocationKey) -> Url {
        let mut url = self.base_url.clone();
        // `new` rejects cannot-be-a-base URLs, so this always succeeds.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(FORECAST_PATH)
                .push(location_key.as_str());
        }
        url.query_pairs_mut()
            .append_pair("apikey", &self.api_key)
            .append_pair("details", "true");
        url
    }
}

#[async_trait]
impl ForecastSource for AccuWeatherClient {
    #[instrument(skip(self, location_key), fields(location_key = %location_key))]
    async fn fetch(&self, location_key: &LocationKey) -> Result<RawForecast> {
        let start_time = Instant::now();
        debug!("Requesting 5-day forecast from upstream");

        let response = self
            .http
            .get(self.forecast_url(location_key))
            .send()
            .await
            .map_err(|e| {
                let err = ForecastError::transport(e);
                warn!(error = %err, "Upstream request failed");
                err
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Upstream answered with a non-success status");
        }

        let body = response.bytes().await.map_err(ForecastError::transport)?;

        info!(
            %status,
            bytes = body.len(),
            "Upstream forecast received in {:.3}s",
            start_time.elapsed().as_secs_f64()
        );

        RawForecast::from_slice(&body)
    }
}
