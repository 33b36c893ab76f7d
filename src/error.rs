//! Error types and handling for the forecast proxy

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Main error type for the forecast proxy
#[derive(Error, Debug)]
pub enum ForecastError {
    /// The upstream provider could not be reached (DNS, connect, timeout, body read)
    #[error("Upstream request failed: {source}")]
    Transport {
        #[source]
        source: reqwest::Error,
    },

    /// The upstream provider answered with JSON that lacks the expected fields
    #[error("Malformed upstream response: {message}")]
    MalformedUpstreamResponse { message: String },

    /// The inbound request cannot be served as given
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl ForecastError {
    /// Create a new transport error.
    ///
    /// The request URL is stripped from the source error because it carries
    /// the API key as a query parameter.
    pub fn transport(source: reqwest::Error) -> Self {
        Self::Transport {
            source: source.without_url(),
        }
    }

    /// Create a new malformed upstream response error
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::MalformedUpstreamResponse {
            message: message.into(),
        }
    }

    /// Create a new bad request error
    pub fn bad_request<S: Into<String>>(message: S) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// HTTP status the error is reported with
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            ForecastError::Transport { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ForecastError::MalformedUpstreamResponse { .. } => StatusCode::BAD_GATEWAY,
            ForecastError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ForecastError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ForecastError {
    fn into_response(self) -> Response {
        // A String body is served as text/plain by axum.
        (self.status_code(), self.to_string()).into_response()
    }
}
