//! Axum API server binary.

use std::net::SocketAddr;

use anyhow::{anyhow, Context};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use trendbot_api::{create_router, metrics, ApiConfig, AppState};
use trendbot_clients::{GeminiConfig, YouTubeConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Install rustls crypto provider (required for rustls 0.23+)
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("Failed to install rustls crypto provider"))?;

    let config = ApiConfig::from_env();
    init_tracing(config.is_production())?;

    info!("Starting trendbot-api");

    let youtube = YouTubeConfig::from_env();
    let gemini = GeminiConfig::from_env();
    info!(
        host = %config.host,
        port = config.port,
        environment = %config.environment,
        model = %gemini.model,
        region = %youtube.region_code,
        "API config loaded"
    );

    if !youtube.is_configured() {
        warn!("YOUTUBE_API_KEY (or GEMINI_API_KEY) not set; analyses will fail");
    }
    if !gemini.is_configured() {
        warn!("GEMINI_API_KEY not set; analyses will fail");
    }

    let state = AppState::new(config.clone(), youtube, gemini)
        .context("Failed to create application state")?;

    let metrics_handle = if config.metrics_enabled {
        info!("Prometheus metrics enabled at /metrics");
        Some(metrics::init_metrics().context("Failed to install Prometheus recorder")?)
    } else {
        None
    };

    let app = create_router(state, metrics_handle);

    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.bind_address()))?;

    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Colored output for dev, JSON in production or when `LOG_FORMAT=json`.
fn init_tracing(production: bool) -> anyhow::Result<()> {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(production);

    let env_filter = EnvFilter::from_default_env().add_directive("trendbot=info".parse()?);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}
