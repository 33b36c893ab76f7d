use std::sync::Arc;

use tracing::{debug, instrument};

use crate::Result;
use crate::accuweather::ForecastSource;
use crate::models::{LocationKey, SimplifiedForecast};
use crate::transform::transform;

/// Sequences the upstream fetch and the transform for one request
#[derive(Clone)]
pub struct ForecastService {
    source: Arc<dyn ForecastSource>,
}

impl ForecastService {
    pub fn new(source: Arc<dyn ForecastSource>) -> Self {
        Self { source }
    }

    /// Fetch and reshape the forecast for `location_key`.
    ///
    /// Errors from the source and the transformer are returned as they are.
    #[instrument(skip(self))]
    pub async fn get_forecast(&self, location_key: &str) -> Result<SimplifiedForecast> {
        let location_key = LocationKey::parse(location_key)?;
        let raw = self.source.fetch(&location_key).await?;
        let forecast = transform(raw)?;
        debug!(
            headline = forecast.headline.as_deref().unwrap_or("<none>"),
            "Forecast reshaped"
        );
        Ok(forecast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ForecastError;
    use crate::models::RawForecast;
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::sync::Mutex;

    /// Serves a canned body and remembers the keys it was asked for
    struct StubSource {
        body: Value,
        calls: Mutex<Vec<String>>,
    }

    impl StubSource {
        fn new(body: Value) -> Arc<Self> {
            Arc::new(Self {
                body,
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ForecastSource for StubSource {
        async fn fetch(&self, location_key: &LocationKey) -> Result<RawForecast> {
            self.calls.lock().unwrap().push(location_key.to_string());
            RawForecast::try_from(self.body.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl ForecastSource for FailingSource {
        async fn fetch(&self, _location_key: &LocationKey) -> Result<RawForecast> {
            Err(ForecastError::malformed("upstream exploded"))
        }
    }

    #[tokio::test]
    async fn test_get_forecast_reshapes_upstream_body() {
        let source = StubSource::new(json!({
            "Headline": {"Text": "Sunny"},
            "DailyForecasts": ["A", "B"]
        }));
        let service = ForecastService::new(source.clone());

        let forecast = service.get_forecast("328328").await.unwrap();

        assert_eq!(forecast.headline.as_deref(), Some("Sunny"));
        assert_eq!(forecast.days, json!(["A", "B"]));
        assert_eq!(*source.calls.lock().unwrap(), vec!["328328".to_string()]);
    }

    #[tokio::test]
    async fn test_blank_key_never_reaches_upstream() {
        let source = StubSource::new(json!({}));
        let service = ForecastService::new(source.clone());

        let err = service.get_forecast("  ").await.unwrap_err();

        assert!(matches!(err, ForecastError::BadRequest { .. }));
        assert!(source.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_source_errors_propagate_unchanged() {
        let service = ForecastService::new(Arc::new(FailingSource));
        let err = service.get_forecast("1").await.unwrap_err();
        assert_eq!(err.to_string(), "Malformed upstream response: upstream exploded");
    }

    #[tokio::test]
    async fn test_transform_errors_propagate() {
        let service = ForecastService::new(StubSource::new(json!({"DailyForecasts": []})));
        let err = service.get_forecast("1").await.unwrap_err();
        assert!(matches!(err, ForecastError::MalformedUpstreamResponse { .. }));
    }
}
