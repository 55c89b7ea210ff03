use clap::Parser;
use lib_common::markets::nse::RetryPolicy;
use lib_common::markets::nse::apicall::NSE_BASE_URL;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_CONFIG_FILE: &str = "server_sme.conf";

#[derive(Parser, Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[clap(about = "NSE SME corporate announcements relay", version)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[clap(long, env = "SME_PORT", help = "Port to listen on for client connections.")]
    pub port: Option<u16>,

    #[clap(long, env = "SME_HOST", help = "Address to bind the HTTP listener to.")]
    pub host: Option<String>,

    #[clap(long, env = "SME_CONFIG_PATH", help = "Path to the JSON configuration file.")]
    pub config_path: Option<PathBuf>,

    #[clap(long, env = "SME_LOG_DIR", help = "Directory for log files.")]
    pub log_dir: Option<PathBuf>,

    #[clap(long, env = "SME_LOG_LEVEL", help = "Logging level (trace, debug, info, warn, error, fatal).")]
    pub log_level: Option<String>,

    #[clap(long, env = "SME_NSE_BASE_URL", help = "Origin of the NSE website.")]
    pub nse_base_url: Option<String>,

    #[clap(long, env = "SME_MAX_RETRIES", help = "Maximum number of announcement data calls per request.")]
    pub max_retries: Option<u32>,

    #[clap(long, env = "SME_REQUEST_TIMEOUT_SECS", help = "Timeout in seconds for each upstream call.")]
    pub request_timeout_secs: Option<u64>,

    #[clap(long, env = "SME_BACKOFF_UNIT_MS", help = "Backoff time unit in milliseconds; the n-th failure waits 2*n units.")]
    pub backoff_unit_ms: Option<u64>,
}

impl Config {
    // Merge two Config structs, where 'other' overrides 'self' for Some values
    fn merge(self, other: Config) -> Config {
        Config {
            port: other.port.or(self.port),
            host: other.host.or(self.host),
            config_path: other.config_path.or(self.config_path),
            log_dir: other.log_dir.or(self.log_dir),
            log_level: other.log_level.or(self.log_level),
            nse_base_url: other.nse_base_url.or(self.nse_base_url),
            max_retries: other.max_retries.or(self.max_retries),
            request_timeout_secs: other.request_timeout_secs.or(self.request_timeout_secs),
            backoff_unit_ms: other.backoff_unit_ms.or(self.backoff_unit_ms),
        }
    }

    pub fn defaults() -> Config {
        Config {
            port: Some(8080),
            host: Some("0.0.0.0".to_string()),
            log_dir: Some(PathBuf::from("./logs")),
            log_level: Some("info".to_string()),
            nse_base_url: Some(NSE_BASE_URL.to_string()),
            max_retries: Some(3),
            request_timeout_secs: Some(10),
            backoff_unit_ms: Some(1000),
            ..Default::default()
        }
    }

    pub fn bind_addr(&self) -> String {
        format!(
            "{}:{}",
            self.host.as_deref().unwrap_or("0.0.0.0"),
            self.port.unwrap_or(8080)
        )
    }

    pub fn base_url(&self) -> &str {
        self.nse_base_url.as_deref().unwrap_or(NSE_BASE_URL)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        let defaults = RetryPolicy::default();
        RetryPolicy {
            max_retries: self.max_retries.unwrap_or(defaults.max_retries),
            backoff_unit: self
                .backoff_unit_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.backoff_unit),
            request_timeout: self
                .request_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
        }
    }
}

/// Reads a JSON config file. Missing or invalid files yield `None` with a warning.
fn read_config_file(path: &Path) -> Option<Config> {
    if !path.exists() {
        tracing::info!(
            "Config file not found at {}. Using defaults and environment/CLI variables.",
            path.display()
        );
        return None;
    }

    match fs::read_to_string(path) {
        Ok(config_str) => match serde_json::from_str::<Config>(&config_str) {
            Ok(file_config) => Some(file_config),
            Err(e) => {
                tracing::warn!(
                    "Failed to parse config file {}: {}. Falling back to other sources.",
                    path.display(),
                    e
                );
                None
            }
        },
        Err(e) => {
            tracing::warn!(
                "Failed to read config file {}: {}. Falling back to other sources.",
                path.display(),
                e
            );
            None
        }
    }
}

/// Layers defaults, the config file and CLI/env arguments, later sources winning.
pub fn resolve(cli_args: Config) -> Config {
    let config_file_path = cli_args
        .config_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    let mut current_config = Config::defaults();
    if let Some(file_config) = read_config_file(&config_file_path) {
        current_config = current_config.merge(file_config);
    }

    current_config.merge(cli_args)
}

pub fn load_config() -> Config {
    resolve(Config::parse())
}
