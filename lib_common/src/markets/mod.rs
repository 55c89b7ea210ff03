//! # Financial Market APIs Module
//!
//! This module groups together client implementations for specific
//! financial market data providers. Its purpose is to hide the details of
//! each provider (endpoints, anti-bot workarounds, payload quirks) and hand
//! normalized data to the rest of the system.
//!
//! ## Contained Modules:
//!
//! - **`nse`**: National Stock Exchange of India. Fetches SME segment
//!   corporate announcements and normalizes them into a stable shape.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Client and data models for NSE India corporate announcements.
pub mod nse;
