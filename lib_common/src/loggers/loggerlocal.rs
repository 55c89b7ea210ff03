use super::logrecord::{level_name, Logrecord, PROCESSINFO};
use chrono::Local;
use colored::*;
use glob::glob;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tokio::task;

/// Every level from Silly (0) to Fatal (6).
pub const ALL_LEVELS: [i64; 7] = [6, 5, 4, 3, 2, 1, 0];

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
/// # Logger Local Options
///
/// Configuration options for the `LoggerLocal` instance, controlling where and how
/// log messages are output. A `None` output is disabled.
pub struct LoggerLocalOptions {
    /// A list of log levels that should be printed to the TTY (console).
    pub use_tty: Option<Vec<i64>>,
    /// A list of log levels that should be written to a log file.
    pub use_file: Option<Vec<i64>>,
    /// The directory where log files should be stored. If `None`, defaults to the working directory.
    pub log_dir: Option<PathBuf>,
}

impl LoggerLocalOptions {
    /// Enables every level at or above `min_level` for both TTY and file output.
    pub fn from_min_level(min_level: i64, log_dir: Option<PathBuf>) -> Self {
        let levels: Vec<i64> = ALL_LEVELS.iter().copied().filter(|l| *l >= min_level).collect();
        Self {
            use_tty: Some(levels.clone()),
            use_file: Some(levels),
            log_dir,
        }
    }
}

/// Parses a level name (`trace`, `debug`, `info`, ...) into its numeric level.
/// Unknown names fall back to Info.
pub fn parse_level(name: &str) -> i64 {
    match name.to_lowercase().as_str() {
        "fatal" => 6,
        "error" => 5,
        "warn" | "warning" => 4,
        "debug" => 2,
        "trace" => 1,
        "silly" => 0,
        _ => 3,
    }
}

/// # Logger Local
///
/// Application logger shared as `Arc<LoggerLocal>` between the components that
/// need it. Writes colored lines to the console and plain lines to a per-run
/// log file.
pub struct LoggerLocal {
    /// The name of the application associated with this logger instance.
    app_name: String,
    /// Configuration options determining logging behavior.
    options: LoggerLocalOptions,
    /// Serializes appends to the log file across concurrent requests.
    file_mutex: Mutex<()>,
    /// The path to the currently active log file, if file logging is enabled.
    current_log_file: Option<PathBuf>,
}

impl LoggerLocal {
    /// Rotates log files for a given application and log directory.
    ///
    /// Keeps only the most recent log file (by the timestamp in its filename)
    /// and deletes older ones.
    fn rotate_logs(app_name: &str, log_dir: &Path) {
        let pattern = format!("{}/{}-*.log", log_dir.display(), app_name);
        let mut log_files: Vec<PathBuf> = match glob(&pattern) {
            Ok(paths) => paths.filter_map(Result::ok).collect(),
            Err(e) => {
                eprintln!("Invalid log rotation pattern {}: {}", pattern, e);
                return;
            }
        };

        // Newest first
        log_files.sort_by(|a, b| b.file_name().cmp(&a.file_name()));

        for old_file in log_files.iter().skip(1) {
            if let Err(e) = std::fs::remove_file(old_file) {
                eprintln!("Error deleting old log file {}: {}", old_file.display(), e);
            }
        }
    }

    /// Creates a new `LoggerLocal` instance.
    ///
    /// If file logging is enabled, it ensures the log directory exists,
    /// rotates old logs, and sets up the current log file path.
    ///
    /// # Arguments
    /// * `app_name` - The name of the application using this logger.
    /// * `options` - Optional `LoggerLocalOptions`. If `None`, every level goes
    ///   to both the TTY and the log file.
    pub fn new(app_name: String, options: Option<LoggerLocalOptions>) -> Self {
        let opts = options.unwrap_or(LoggerLocalOptions {
            use_tty: Some(ALL_LEVELS.to_vec()),
            use_file: Some(ALL_LEVELS.to_vec()),
            log_dir: None,
        });

        let mut logger = Self {
            app_name,
            options: opts,
            file_mutex: Mutex::new(()),
            current_log_file: None,
        };

        if logger.options.use_file.is_some() {
            let log_base_dir = logger
                .options
                .log_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from("."));

            if let Err(e) = std::fs::create_dir_all(&log_base_dir) {
                eprintln!("Error creating log directory {}: {}", log_base_dir.display(), e);
            }

            LoggerLocal::rotate_logs(&logger.app_name, &log_base_dir);

            let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
            let current_log_filename = format!("{}-{}.log", logger.app_name, timestamp);
            logger.current_log_file = Some(log_base_dir.join(current_log_filename));
        }

        logger
    }

    /// A logger with every output disabled.
    pub fn silent(app_name: &str) -> Self {
        Self::new(app_name.to_string(), Some(LoggerLocalOptions::default()))
    }

    /// The name this logger stamps on its records.
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Path of the active log file, if file logging is enabled.
    pub fn current_log_file(&self) -> Option<&Path> {
        self.current_log_file.as_deref()
    }

    fn build_record(&self, log_level: i64, log_message: &str, log_extras: Option<Value>) -> Logrecord {
        let mut record = Logrecord::default();
        record.app.name = self.app_name.clone();
        record.loglevel = log_level;
        record.message.text = log_message.to_string();
        if let Some(extras) = log_extras {
            record.tags = extras;
        }
        record
    }

    /// Logs a message with a specified level, handling TTY output and file
    /// writing based on the logger's configuration.
    ///
    /// # Arguments
    /// * `log_level` - The numeric log level (0 for Silly, 6 for Fatal).
    /// * `log_message` - The main message string to be logged.
    /// * `log_extras` - Additional structured data to include in the log.
    pub async fn log(&self, log_level: i64, log_message: &str, log_extras: Option<Value>) {
        let record = self.build_record(log_level, log_message, log_extras);
        let tags_str = if record.has_tags() {
            serde_json::to_string(&record.tags).ok()
        } else {
            None
        };

        if let Some(tty_levels) = &self.options.use_tty {
            if tty_levels.contains(&log_level) {
                let ts = record.rfc9557.as_str().truecolor(128, 128, 128);
                let app_name_colored = format!("[{}]", self.app_name).truecolor(128, 128, 128);
                let colored_message = match log_level {
                    6 => log_message.bright_white().on_bright_red(),
                    5 => log_message.bright_red(),
                    4 => log_message.bright_yellow(),
                    3 => log_message.bright_green(),
                    2 => log_message.bright_white(),
                    1 => log_message.bright_cyan(),
                    _ => log_message.blue(),
                };

                println!("{}{}\n{}", ts, app_name_colored, colored_message);
                if let Some(tags) = &tags_str {
                    println!("{}{}{}", ts, app_name_colored, tags.truecolor(128, 128, 128));
                }
            }
        }

        if let Some(file_levels) = &self.options.use_file {
            if file_levels.contains(&log_level) {
                if let Some(log_file_path) = &self.current_log_file {
                    let mut line = format!(
                        "{} [{}] [{}] [pid {}] {}\n",
                        record.rfc9557,
                        self.app_name,
                        level_name(log_level),
                        PROCESSINFO.pid,
                        log_message
                    );
                    if let Some(tags) = &tags_str {
                        line.push_str(tags);
                        line.push('\n');
                    }

                    // Held until the blocking append finishes so lines never interleave.
                    let _guard = self.file_mutex.lock().await;
                    let path = log_file_path.clone();
                    match task::spawn_blocking(move || append_line(&path, &line)).await {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => {
                            eprintln!("Error writing log file {}: {}", log_file_path.display(), e)
                        }
                        Err(e) => eprintln!("Log file writer task failed: {}", e),
                    }
                }
            }
        }
    }

    /// Logs a message at the "Silly" (level 0) log level.
    pub async fn silly(&self, log_message: &str, log_extras: Option<Value>) {
        self.log(0, log_message, log_extras).await;
    }

    /// Logs a message at the "Trace" (level 1) log level.
    pub async fn trace(&self, log_message: &str, log_extras: Option<Value>) {
        self.log(1, log_message, log_extras).await;
    }

    /// Logs a message at the "Debug" (level 2) log level.
    pub async fn debug(&self, log_message: &str, log_extras: Option<Value>) {
        self.log(2, log_message, log_extras).await;
    }

    /// Logs a message at the "Info" (level 3) log level.
    pub async fn info(&self, log_message: &str, log_extras: Option<Value>) {
        self.log(3, log_message, log_extras).await;
    }

    /// Logs a message at the "Warn" (level 4) log level.
    ///
    /// Used for unusual responses that do not stop the service, such as a
    /// provider reply without the expected payload.
    pub async fn warn(&self, log_message: &str, log_extras: Option<Value>) {
        self.log(4, log_message, log_extras).await;
    }

    /// Logs a message at the "Error" (level 5) log level.
    pub async fn error(&self, log_message: &str, log_extras: Option<Value>) {
        self.log(5, log_message, log_extras).await;
    }

    /// Logs a message at the "Fatal" (level 6) log level.
    pub async fn fatal(&self, log_message: &str, log_extras: Option<Value>) {
        self.log(6, log_message, log_extras).await;
    }
}

fn append_line(path: &Path, line: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(line.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("INFO"), 3);
        assert_eq!(parse_level("warning"), 4);
        assert_eq!(parse_level("trace"), 1);
        assert_eq!(parse_level("nonsense"), 3);
    }

    #[test]
    fn test_from_min_level_filters_lower_levels() {
        let opts = LoggerLocalOptions::from_min_level(4, None);
        assert_eq!(opts.use_tty, Some(vec![6, 5, 4]));
        assert_eq!(opts.use_file, Some(vec![6, 5, 4]));
    }

    #[test]
    fn test_silent_logger_has_no_file() {
        let logger = LoggerLocal::silent("quiet");
        assert!(logger.current_log_file().is_none());
        assert_eq!(logger.app_name(), "quiet");
    }
}
