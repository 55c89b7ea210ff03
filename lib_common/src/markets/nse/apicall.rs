//! # NSE API Client
//!
//! The NSE website rejects API calls that arrive without the cookies its edge
//! hands out on a normal page visit. Every fetch therefore:
//!
//! 1. builds a fresh `ApiClient` (its own cookie jar),
//! 2. primes the jar with a GET to the site root, ignoring the outcome,
//! 3. calls the announcements endpoint, retrying non-2xx statuses and
//!    transport failures with a linear backoff of `2 * attempt` time units.
//!
//! A 2xx reply without a `data` array is final and is not retried.

use crate::loggers::loggerlocal::LoggerLocal;
use crate::markets::nse::announcements::RawAnnouncement;
use crate::retrieve::ky_http::{ApiClient, RetrieveError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;

/// Production origin of the NSE website.
pub const NSE_BASE_URL: &str = "https://www.nseindia.com";

/// Announcements endpoint, relative to the origin.
pub const SME_ANNOUNCEMENTS_PATH: &str = "api/corporate-announcements?segment=SME";

/// Page the browser would be on when it calls the announcements API.
const REFERER_PATH: &str = "companies-listing/corporate-filings-announcements";

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:117.0) Gecko/20100101 Firefox/117.0";

/// Why a fetch produced no announcements.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP client context could not be created.
    #[error("NSE client could not be built: {0}")]
    Client(#[from] RetrieveError),

    /// A 2xx reply without a usable `data` array. Not retried.
    #[error("NSE API response missing 'data' key")]
    MissingData,

    /// Every attempt failed with a transient error.
    #[error("NSE API unreachable after {attempts} attempts: {last_error}")]
    Exhausted {
        /// Number of data calls made.
        attempts: u32,
        /// Description of the final failure.
        last_error: String,
    },
}

/// Bounds and timing of the data-call retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of data calls.
    pub max_retries: u32,
    /// Time unit for the backoff; the n-th failure sleeps `2 * n` units.
    pub backoff_unit: Duration,
    /// Timeout applied to each HTTP call.
    pub request_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_unit: Duration::from_secs(1),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Sleep after the `attempt`-th failed call (1-based). Saturates at `Duration::MAX`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_unit.saturating_mul(attempt.saturating_mul(2))
    }

    /// Total sleep when every attempt fails.
    pub fn total_backoff(&self) -> Duration {
        (1..=self.max_retries)
            .map(|a| self.backoff(a))
            .fold(Duration::ZERO, Duration::saturating_add)
    }
}

/// Browser-mimicking headers sent with both the priming and the data call.
pub fn nse_headers(base_url: &str) -> HeaderMap {
    let origin = base_url.trim_end_matches('/');
    let referer = format!("{}/{}", origin, REFERER_PATH);

    let header_list = [
        ("user-agent", USER_AGENT),
        ("accept", "application/json, text/plain, */*"),
        ("accept-language", "en-US,en;q=0.5"),
        ("referer", referer.as_str()),
        ("connection", "keep-alive"),
        ("origin", origin),
    ];

    let mut headers = HeaderMap::new();
    for (name, value) in header_list {
        if let (Ok(h_name), Ok(h_value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            headers.insert(h_name, h_value);
        }
    }
    headers
}

/// # NSE API Call Client
///
/// Holds only configuration and the shared logger. The HTTP client and its
/// cookie jar live for a single fetch and are dropped on every exit path.
pub struct ApiCallNse {
    base_url: String,
    policy: RetryPolicy,
    logger: Arc<LoggerLocal>,
}

impl ApiCallNse {
    /// Client for the production NSE origin with the default retry policy.
    pub fn new(logger: Arc<LoggerLocal>) -> Self {
        Self::with_base_url(NSE_BASE_URL, RetryPolicy::default(), logger)
    }

    /// Client for an arbitrary origin, e.g. a mock server in tests.
    pub fn with_base_url(base_url: &str, policy: RetryPolicy, logger: Arc<LoggerLocal>) -> Self {
        Self {
            base_url: base_url.to_string(),
            policy,
            logger,
        }
    }

    /// The retry policy used by every fetch.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetches SME announcements, never failing.
    ///
    /// Errors are logged and collapse to an empty list, so callers cannot
    /// tell "nothing announced" apart from "provider unreachable".
    pub async fn fetch(&self) -> Vec<RawAnnouncement> {
        match self.fetch_sme_announcements().await {
            Ok(items) => items,
            Err(FetchError::Client(e)) => {
                self.logger
                    .error(
                        &format!("NSE client could not be built: {}", e),
                        Some(json!({"base_url": self.base_url})),
                    )
                    .await;
                Vec::new()
            }
            // Already logged where they happened.
            Err(FetchError::MissingData) | Err(FetchError::Exhausted { .. }) => Vec::new(),
        }
    }

    /// Fetches SME announcements, reporting why the result is empty.
    pub async fn fetch_sme_announcements(&self) -> Result<Vec<RawAnnouncement>, FetchError> {
        let headers = nse_headers(&self.base_url);
        let client = ApiClient::new(&self.base_url, headers, self.policy.request_timeout)?;

        self.prime(&client).await;

        let max_attempts = self.policy.max_retries;
        let mut attempts: u32 = 0;
        let mut last_error = String::from("no attempt made");

        while attempts < max_attempts {
            let failure = match client
                .request::<Value>(Method::GET, SME_ANNOUNCEMENTS_PATH, None)
                .await
            {
                Ok(response) if response.success => {
                    let body = response.data.unwrap_or(Value::Null);
                    return self.extract_data(body, attempts + 1).await;
                }
                Ok(response) => format!("HTTP status {}", response.status),
                Err(RetrieveError::InvalidUrl(e)) => return Err(FetchError::Client(e.into())),
                Err(e) => e.to_string(),
            };

            attempts += 1;
            self.logger
                .error(
                    &format!(
                        "Request error: {}, retrying ({}/{})",
                        failure, attempts, max_attempts
                    ),
                    Some(json!({
                        "path": SME_ANNOUNCEMENTS_PATH,
                        "attempt": attempts,
                        "max_attempts": max_attempts,
                    })),
                )
                .await;
            last_error = failure;

            sleep(self.policy.backoff(attempts)).await;
        }

        Err(FetchError::Exhausted {
            attempts,
            last_error,
        })
    }

    /// Visits the site root so the edge sets its session cookies. The result is ignored.
    async fn prime(&self, client: &ApiClient) {
        match client.touch(Method::GET, "", None).await {
            Ok(status) => {
                self.logger
                    .debug("NSE session primed", Some(json!({"status": status})))
                    .await;
            }
            Err(e) => {
                self.logger
                    .debug(&format!("NSE priming request failed: {}", e), None)
                    .await;
            }
        }
    }

    async fn extract_data(&self, body: Value, attempt: u32) -> Result<Vec<RawAnnouncement>, FetchError> {
        let items = match body {
            Value::Object(mut map) => match map.remove("data") {
                Some(Value::Array(items)) => items,
                other => {
                    self.logger
                        .warn(
                            "API response missing 'data' key",
                            Some(json!({
                                "attempt": attempt,
                                "data_present": other.is_some(),
                            })),
                        )
                        .await;
                    return Err(FetchError::MissingData);
                }
            },
            _ => {
                self.logger
                    .warn(
                        "API response missing 'data' key",
                        Some(json!({"attempt": attempt, "body_is_object": false})),
                    )
                    .await;
                return Err(FetchError::MissingData);
            }
        };

        let total = items.len();
        let mut announcements = Vec::with_capacity(total);
        for item in items {
            match item {
                Value::Object(fields) => announcements.push(RawAnnouncement::new(fields)),
                other => {
                    self.logger
                        .warn("Skipping non-object announcement", Some(json!({"item": other})))
                        .await;
                }
            }
        }

        self.logger
            .debug(
                "NSE announcements fetched",
                Some(json!({"attempt": attempt, "received": total, "kept": announcements.len()})),
            )
            .await;

        Ok(announcements)
    }
}
