//! Data passed between the upstream client, the transformer and the web layer

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{ForecastError, Result};

/// Opaque location identifier in the upstream provider's namespace
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocationKey(String);

impl LocationKey {
    /// Accepts any key that is not blank. The provider decides whether it exists.
    pub fn parse<S: Into<String>>(raw: S) -> Result<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(ForecastError::bad_request("location key must not be empty"));
        }
        Ok(Self(raw))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Upstream response body exactly as decoded, a JSON object of arbitrary shape
#[derive(Debug, Clone, PartialEq)]
pub struct RawForecast(Map<String, Value>);

impl RawForecast {
    /// Decode a response body. Anything other than a JSON object is rejected.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| ForecastError::malformed(format!("body is not valid JSON: {e}")))?;
        Self::try_from(value)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    #[must_use]
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl TryFrom<Value> for RawForecast {
    type Error = ForecastError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(ForecastError::malformed(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }
}

/// Reshaped forecast returned to clients
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimplifiedForecast {
    /// Short textual summary, `null` when the provider sent none
    pub headline: Option<String>,
    /// `DailyForecasts` as sent by the provider
    pub days: Value,
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
