//! # lib_common
//!
//! Shared building blocks for the SME announcements relay. Each top-level
//! folder is gated behind a Cargo feature of the same name so binaries only
//! compile what they use.
//!
//! - **`loggers`**: `LoggerLocal` and the `Logrecord` data model.
//! - **`retrieve`**: a cookie-aware HTTP `ApiClient` built on `reqwest`.
//! - **`markets`**: provider clients; currently the NSE corporate
//!   announcements client and the announcement normalizer.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms, unused_qualifications)]

/// Structured local logging (TTY and rotating file output).
#[cfg(feature = "loggers")]
pub mod loggers;

/// Generic HTTP retrieval clients.
#[cfg(feature = "retrieve")]
pub mod retrieve;

/// Financial market data providers.
#[cfg(feature = "markets")]
pub mod markets;

#[cfg(feature = "loggers")]
pub use loggers::loggerlocal::{LoggerLocal, LoggerLocalOptions};
#[cfg(feature = "loggers")]
pub use loggers::logrecord::Logrecord;
