use anyhow::Result;
use forecast_proxy::{ProxyConfig, telemetry, web};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ProxyConfig::load()?;
    let _telemetry = telemetry::init(&config.logging)?;

    tracing::info!(
        version = forecast_proxy::VERSION,
        upstream = %config.upstream.base_url,
        "Starting forecast proxy"
    );

    web::run(&config).await
}
