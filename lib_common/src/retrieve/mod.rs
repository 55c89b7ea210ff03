//! # Data Retrieval Module
//!
//! Generic HTTP retrieval clients shared by the market-specific clients.
//!
//! ## Contained Modules:
//!
//! - **`ky_http`**: A generic HTTP `ApiClient` built on `reqwest`, with its
//!   own cookie jar, default browser headers and a per-call timeout. Retry
//!   policy is left to the callers, since providers differ in what counts as
//!   a transient failure.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Generic cookie-aware HTTP API client.
pub mod ky_http;
