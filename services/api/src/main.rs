use anyhow::{Context, Result};
use openclaw_bridge::config::Config;
use openclaw_bridge_core::OpenClawAgent;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<()> {
    // --- 1. Load Configuration ---
    let Config {
        bind_address,
        openclaw_bin,
        gateway_token,
        agent_timeout,
        log_level,
    } = Config::from_env().context("Failed to load application configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_timer(ChronoLocal::rfc_3339())
        .init();

    if openclaw_bin.is_absolute() && !openclaw_bin.exists() {
        warn!("OpenClaw binary not found at {}", openclaw_bin.display());
    }

    // --- 3. Build the application ---
    let agent = OpenClawAgent::new(openclaw_bin, gateway_token, agent_timeout);
    info!(
        binary = %agent.binary().display(),
        timeout = ?agent.timeout(),
        "Using OpenClaw agent"
    );
    let app = openclaw_bridge::router(Arc::new(agent));

    // --- 4. Serve ---
    info!("Starting OpenClaw HTTP bridge, listening on {}", bind_address);
    let listener = tokio::net::TcpListener::bind(bind_address)
        .await
        .with_context(|| format!("Failed to bind {bind_address}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("OpenClaw HTTP bridge stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
