//! # NSE India Integration Module
//!
//! ## Contained Modules:
//!
//! - **`apicall`**: the HTTP client for the NSE website API. It mimics a
//!   desktop browser, primes the session cookies the NSE edge requires and
//!   retries transient failures with a linear backoff.
//!
//! - **`announcements`**: raw and normalized corporate announcement records
//!   and the pure normalization step between them.

/// Browser-mimicking NSE client with cookie priming and linear backoff retries.
pub mod apicall;
/// Corporate announcement data models and normalization.
pub mod announcements;

pub use announcements::{normalize, NormalizedAnnouncement, RawAnnouncement, SEGMENT};
pub use apicall::{ApiCallNse, FetchError, RetryPolicy};
