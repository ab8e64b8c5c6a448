//! Geotracker Console - demo entry point
//!
//! Runs the polling engine headlessly against a telemetry backend, with a
//! logging surface standing in for the map. Useful for exercising the
//! reconciliation pipeline end to end without a UI attached.

use geotracker_console::map_surface::LogSurface;
use geotracker_console::telemetry_client::HttpTelemetryClient;
use geotracker_console::{AppConfig, ConsoleState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "geotracker_console=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Geotracker Console v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::from_env()?;
    tracing::info!(
        api_base_url = %config.api_base_url,
        poll_interval_ms = config.poll_interval_ms,
        "Loaded configuration"
    );

    let source = Arc::new(HttpTelemetryClient::new(config.api_base_url.clone())?);
    let surface = Arc::new(LogSurface::new());
    let console = ConsoleState::new(config, source, surface);

    console.observers.set(|snapshots| {
        tracing::debug!(objects = snapshots.len(), "Snapshot list published");
    });

    console.start().await;

    match console.recent_alerts(20).await {
        Ok(alerts) => {
            let unacked = alerts.iter().filter(|a| !a.ack).count();
            tracing::info!(total = alerts.len(), unacked = unacked, "Recent alerts");
        }
        Err(e) => tracing::warn!(error = %e, "Alert fetch failed"),
    }

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    console.shutdown().await;

    Ok(())
}
