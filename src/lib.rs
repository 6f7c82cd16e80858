//! onprint-translate: multi-language translation service.
//! Main library: tracing setup, service wiring, HTTP server startup.

pub mod config;
pub mod error;
pub mod languages;
pub mod metrics;
pub mod product;
pub mod server;
pub mod translate;

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use config::{Config, LogFormat};
use server::AppState;

/// Initialize the global tracing subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "onprint_translate=info,tower_http=info".into());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.with_thread_ids(true).init(),
    }
}

/// Build the service from `config` and serve until Ctrl-C.
pub async fn run(config: Config) -> anyhow::Result<()> {
    init_tracing(config.log_format);
    info!("onprint-translate starting");

    let state = Arc::new(AppState::from_config(&config)?);
    let app = server::router(state);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("onprint-translate stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for Ctrl-C; running until killed");
        std::future::pending::<()>().await;
    }
}
