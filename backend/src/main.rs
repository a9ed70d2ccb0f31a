// =============================================================================
// Gold Signal Dashboard — Main Entry Point
// =============================================================================
//
// Serves renderer-ready gold futures indicators over HTTP.  Each dashboard
// request fetches fresh bars and runs the indicator pipeline once; nothing is
// scheduled in the background.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod app_state;
mod dashboard;
mod indicators;
mod market_data;
mod pipeline;
mod runtime_config;
mod types;
mod yahoo;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::runtime_config::{EnvOverrides, RuntimeConfig};
use crate::yahoo::YahooChartClient;

const DEFAULT_CONFIG_PATH: &str = "dashboard_config.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Gold Signal Dashboard starting up");

    let config_path =
        std::env::var("DASHBOARD_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());

    let startup = RuntimeConfig::load_for_startup(&config_path);
    let overrides = EnvOverrides::from_env();
    let mut config = startup.config.clone();
    overrides.apply(&mut config);

    info!(
        symbol = %config.source.symbol,
        range = %config.source.range,
        interval = %config.source.interval,
        convention = %config.pipeline.ewma_convention,
        min_history = config.pipeline.min_history,
        "Configured market data request"
    );

    // ── 2. Market data source ────────────────────────────────────────────
    let source = YahooChartClient::new(
        config.source.base_url.clone(),
        Duration::from_secs(config.source.timeout_secs),
    )?;

    // ── 3. Shared state ──────────────────────────────────────────────────
    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState::new(config, Arc::new(source)));

    // ── 4. API server ────────────────────────────────────────────────────
    let app = api::rest::router(state.clone());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind API server to {bind_addr}"))?;
    info!(addr = %bind_addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("API server failed")?;

    // ── 5. Persist config ────────────────────────────────────────────────
    if startup.writable {
        let persisted = overrides.strip(&state.config(), &startup.config);
        if let Err(e) = persisted.save(&config_path) {
            error!(error = %e, "Failed to save dashboard config on shutdown");
        }
    } else {
        warn!(path = %config_path, "Dashboard config was not loaded, leaving the file as is");
    }

    info!(
        runs_total = state.runs_total(),
        runs_failed = state.runs_failed(),
        "Gold Signal Dashboard shut down complete"
    );
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    warn!("Shutdown signal received — stopping gracefully");
}
