use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::{Path, State},
    response::Json,
    routing::get,
};
use tokio::net::TcpListener;
use tracing::{error, info, instrument, warn};

use crate::accuweather::AccuWeatherClient;
use crate::config::ProxyConfig;
use crate::error::ForecastError;
use crate::models::SimplifiedForecast;
use crate::service::ForecastService;

pub fn router(service: Arc<ForecastService>) -> Router {
    Router::new()
        .route("/forecast/{location_key}", get(get_forecast))
        .with_state(service)
}

#[instrument(skip(service))]
async fn get_forecast(
    State(service): State<Arc<ForecastService>>,
    Path(location_key): Path<String>,
) -> Result<Json<SimplifiedForecast>, ForecastError> {
    match service.get_forecast(&location_key).await {
        Ok(forecast) => Ok(Json(forecast)),
        Err(err) => {
            if err.status_code().is_server_error() {
                error!(error = %err, "Forecast request failed");
            } else {
                warn!(error = %err, "Forecast request rejected");
            }
            Err(err)
        }
    }
}

/// Bind the configured address and serve until Ctrl-C or SIGTERM
pub async fn run(config: &ProxyConfig) -> Result<()> {
    let client = AccuWeatherClient::from_config(&config.upstream)
        .context("Failed to set up the upstream client")?;
    let app = router(Arc::new(ForecastService::new(Arc::new(client))));

    let addr = config.server.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Forecast proxy listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Forecast proxy stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
