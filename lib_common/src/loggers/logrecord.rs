use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use static_init::dynamic;

#[dynamic]
/// Statically initialized identity of the current process, stamped on every record.
pub static PROCESSINFO: ProcessInfo = ProcessInfo::current();

/// # Process Info
///
/// Identity of the running process as seen in log records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessInfo {
    /// Process ID.
    pub pid: i64,
    /// File name of the running executable, without directories.
    pub process_basename: String,
    /// Host name of the machine, empty if it cannot be determined.
    pub process_host: String,
}

impl ProcessInfo {
    /// Collects the identity of the current process.
    pub fn current() -> Self {
        let process_basename = std::env::current_exe()
            .ok()
            .and_then(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .unwrap_or_default();
        let process_host = hostname::get()
            .map(|h| h.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            pid: std::process::id() as i64,
            process_basename,
            process_host,
        }
    }
}

/// Returns the current UTC time as an RFC 9557 string, e.g. `2024-03-15T10:30:00.123Z[UTC]`.
pub fn current_datetime_rfc9557() -> String {
    format!(
        "{}[UTC]",
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}

/// Maps a numeric log level to its name.
pub fn level_name(level: i64) -> &'static str {
    match level {
        6 => "FATAL",
        5 => "ERROR",
        4 => "WARN",
        3 => "INFO",
        2 => "DEBUG",
        1 => "TRACE",
        _ => "SILLY",
    }
}

/// # Logrecord
///
/// A single log entry as produced by `LoggerLocal`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Logrecord {
    /// Timestamp (UTC) when the log record was created.
    pub ts: Option<DateTime<Utc>>,
    /// The severity level of the log (0 Silly .. 6 Fatal).
    pub loglevel: i64,
    /// Details about the message content.
    pub message: Message,
    /// Information about the application generating the log.
    pub app: App,
    /// Information about the host where the log originated.
    pub host: Host,
    /// Flexible JSON value for arbitrary tags or additional metadata.
    pub tags: Value,
    /// RFC 9557 formatted timestamp string.
    pub rfc9557: String,
}

impl Default for Logrecord {
    /// Creates a record stamped with the current time and process identity.
    fn default() -> Self {
        Self {
            ts: Some(Utc::now()),
            loglevel: 0,
            message: Message::default(),
            app: App::default(),
            host: Host::default(),
            tags: serde_json::json!([]),
            rfc9557: current_datetime_rfc9557(),
        }
    }
}

impl Logrecord {
    /// Returns true when the record carries structured extras.
    pub fn has_tags(&self) -> bool {
        self.tags != serde_json::json!([])
    }
}

/// # Message
///
/// The textual content of a log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// The language of the message (e.g., "en").
    pub lang: String,
    /// The message text.
    pub text: String,
}

impl Default for Message {
    fn default() -> Self {
        Self {
            text: String::new(),
            lang: "en".to_string(),
        }
    }
}

/// # App
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct App {
    /// The process ID (PID) of the application.
    pub pid: i64,
    /// The name of the application.
    pub name: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            pid: PROCESSINFO.pid,
            name: PROCESSINFO.process_basename.clone(),
        }
    }
}

/// # Host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Host {
    /// The name of the host.
    pub name: String,
}

impl Default for Host {
    fn default() -> Self {
        Self {
            name: PROCESSINFO.process_host.clone(),
        }
    }
}
