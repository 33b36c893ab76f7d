//! Logging and tracing setup
//!
//! Installs a `tracing` subscriber with an env filter, a pretty or JSON fmt
//! layer and, when an OTLP endpoint is configured, an OpenTelemetry span
//! exporter.

use anyhow::{Context, Result};
use opentelemetry::KeyValue;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::{SpanExporter, WithExportConfig};
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_semantic_conventions::resource::SERVICE_VERSION;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::config::LoggingConfig;

const SERVICE_NAME: &str = "forecast-proxy";

/// Flushes exported spans when dropped
#[must_use = "dropping the guard shuts the span exporter down"]
pub struct TelemetryGuard {
    tracer_provider: Option<SdkTracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.tracer_provider.take() {
            if let Err(e) = provider.shutdown() {
                eprintln!("Failed to shut down tracer provider: {e}");
            }
        }
    }
}

/// `RUST_LOG` wins over the configured level
fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

fn build_tracer_provider(endpoint: &str) -> Result<SdkTracerProvider> {
    let exporter = SpanExporter::builder()
        .with_http()
        .with_endpoint(endpoint)
        .build()
        .with_context(|| format!("Failed to create OTLP span exporter for {endpoint}"))?;

    let resource = Resource::builder()
        .with_service_name(SERVICE_NAME)
        .with_attribute(KeyValue::new(SERVICE_VERSION, crate::VERSION))
        .build();

    Ok(SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(resource)
        .build())
}

/// Install the global subscriber
pub fn init(config: &LoggingConfig) -> Result<TelemetryGuard> {
    let fmt_layer = match config.format.as_str() {
        "json" => fmt::layer().json().boxed(),
        _ => fmt::layer().boxed(),
    };

    let tracer_provider = config
        .otlp_endpoint
        .as_deref()
        .map(build_tracer_provider)
        .transpose()?;

    let otel_layer = tracer_provider
        .as_ref()
        .map(|provider| tracing_opentelemetry::layer().with_tracer(provider.tracer(SERVICE_NAME)));

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(otel_layer)
        .with(env_filter(config))
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::debug!(
        level = %config.level,
        format = %config.format,
        otlp = config.otlp_endpoint.is_some(),
        "Telemetry initialized"
    );

    Ok(TelemetryGuard { tracer_provider })
}
