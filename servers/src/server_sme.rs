//! # SME Announcements Relay Server
//!
//! Serves `GET /api/sme_announcements`: every request fetches the NSE SME
//! corporate announcements (priming the session cookies first, retrying with
//! a linear backoff) and answers with the normalized records as JSON.
//!
//! Configuration is layered: defaults, then `server_sme.conf` (JSON), then
//! environment variables and command-line flags. A `.env` file is honoured.

use anyhow::{Context, Result};
use tokio::signal;

mod sme_logic;
use sme_logic::{config, handler, logger};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = config::load_config();
    let log_level = config.log_level.clone().unwrap_or_else(|| "info".to_string());
    logger::setup_tracing(&log_level)?;

    let log_dir = config
        .log_dir
        .clone()
        .unwrap_or_else(|| std::path::PathBuf::from("./logs"));
    let app_logger = logger::build_logger(&log_dir, &log_level);

    let state = handler::AppState::new(config.base_url(), config.retry_policy(), app_logger.clone());
    let app = handler::router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("SME announcements server listening on {}", addr);
    app_logger
        .info(
            "Server started",
            Some(serde_json::json!({"addr": addr, "upstream": config.base_url()})),
        )
        .await;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server terminated with an error")?;

    tracing::info!("Shutdown complete.");
    Ok(())
}

async fn shutdown_signal() {
    tokio::select! {
        _ = signal::ctrl_c() => {
            tracing::info!("Ctrl-C received, initiating shutdown.");
        }
        _ = async {
            #[cfg(unix)]
            {
                match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                    Ok(mut term_signal) => {
                        term_signal.recv().await;
                        tracing::info!("SIGTERM received, initiating shutdown.");
                    }
                    Err(e) => {
                        tracing::warn!("Could not install SIGTERM handler: {}", e);
                        std::future::pending::<()>().await;
                    }
                }
            }
            #[cfg(not(unix))]
            {
                // On non-unix platforms, just wait forever.
                std::future::pending::<()>().await;
            }
        } => {}
    }
}
