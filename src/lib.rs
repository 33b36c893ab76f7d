//! `forecast-proxy` - a small HTTP front for AccuWeather's 5-day forecast
//!
//! `GET /forecast/{location_key}` fetches the provider's daily forecast and
//! answers with `{"headline": ..., "days": ...}`.

pub mod accuweather;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod telemetry;
pub mod transform;
pub mod web;

// Re-export core types for public API
pub use accuweather::{AccuWeatherClient, ForecastSource};
pub use config::ProxyConfig;
pub use error::ForecastError;
pub use models::{LocationKey, RawForecast, SimplifiedForecast};
pub use service::ForecastService;
pub use transform::transform;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, ForecastError>;
