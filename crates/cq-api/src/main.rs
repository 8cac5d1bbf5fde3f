//! Calorie Quest API Server
//!
//! Configuration comes from the TOML file named by `CQ_CONFIG` (with
//! environment overrides) or from the environment alone.

use anyhow::Context;
use cq_api::{create_router, state::AppState};
use cq_core::config::{AppConfig, LoggingConfig};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    init_tracing(&config.logging);

    // A missing store URL or an empty secret is fatal
    config.validate().context("Invalid configuration")?;

    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = Arc::new(
        AppState::connect(config)
            .await
            .context("Failed to open the document store")?,
    );

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Calorie Quest API starting on http://{}", addr);
    tracing::info!("OpenAPI spec at http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn load_config() -> anyhow::Result<AppConfig> {
    let config = match std::env::var("CQ_CONFIG") {
        Ok(path) => AppConfig::from_file(&path)
            .and_then(AppConfig::with_env_override)
            .with_context(|| format!("Failed to load configuration from {path}"))?,
        Err(_) => AppConfig::from_env().context("Failed to read configuration from environment")?,
    };
    Ok(config)
}

fn init_tracing(logging: &LoggingConfig) {
    let level = &logging.level;
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("cq_api={level},cq_core={level},audit=info,tower_http={level}").into()
    });

    if logging.json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
