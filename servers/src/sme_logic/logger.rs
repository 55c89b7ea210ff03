use anyhow::Result;
use lib_common::loggers::loggerlocal::{LoggerLocal, LoggerLocalOptions, parse_level};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

pub const APP_NAME: &str = "server_sme";

/// Installs the global `tracing` subscriber used by the server plumbing.
/// `RUST_LOG` wins over the configured level when set.
pub fn setup_tracing(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level.to_lowercase()))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Builds the application logger handed to the NSE client.
pub fn build_logger(log_dir: &Path, log_level: &str) -> Arc<LoggerLocal> {
    let options = LoggerLocalOptions::from_min_level(parse_level(log_level), Some(log_dir.to_path_buf()));
    Arc::new(LoggerLocal::new(APP_NAME.to_string(), Some(options)))
}
