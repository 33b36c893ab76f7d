//! Reshapes a raw upstream forecast into the simplified response document.

use serde::Deserialize;
use serde_json::Value;

use crate::models::{RawForecast, SimplifiedForecast, json_kind};
use crate::{ForecastError, Result};

/// The part of the provider's `Headline` object we read
#[derive(Debug, Deserialize)]
struct Headline {
    #[serde(rename = "Text", default)]
    text: Option<String>,
}

/// Extract `Headline.Text` and `DailyForecasts`.
///
/// Fails with `MalformedUpstreamResponse` when `Headline` is missing or not an
/// object. `DailyForecasts` is passed through untouched, `null` when absent.
pub fn transform(raw: RawForecast) -> Result<SimplifiedForecast> {
    let mut fields = raw.into_inner();

    let headline = match fields.remove("Headline") {
        Some(Value::Object(headline)) => {
            serde_json::from_value::<Headline>(Value::Object(headline))
                .map_err(|e| ForecastError::malformed(format!("Headline.Text is invalid: {e}")))?
                .text
        }
        Some(other) => {
            return Err(ForecastError::malformed(format!(
                "Headline is {}, expected an object",
                json_kind(&other)
            )));
        }
        None => return Err(ForecastError::malformed("Headline is missing")),
    };

    let days = fields.remove("DailyForecasts").unwrap_or(Value::Null);

    Ok(SimplifiedForecast { headline, days })
}
