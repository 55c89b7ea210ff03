//! # HTTP Retrieval Utilities
//!
//! This module provides an asynchronous API client wrapper around `reqwest`.
//! Each `ApiClient` owns a private cookie jar, so cookies handed out by one
//! call are replayed on the following calls made through the same client and
//! never leak to another client.

use reqwest::header::HeaderMap;
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by the retrieval layer.
#[derive(Debug, Error)]
pub enum RetrieveError {
    /// The base URL or a joined path is not a valid absolute URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The request could not be sent or the response could not be read
    /// (connection refused, DNS failure, timeout, reset).
    #[error("HTTP transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The response arrived but its body could not be decoded into the target type.
    #[error("Failed to decode response body: {0}")]
    Decode(#[source] reqwest::Error),
}

impl RetrieveError {
    /// True for failures worth retrying: anything that happened on the wire.
    pub fn is_transient(&self) -> bool {
        matches!(self, RetrieveError::Transport(_) | RetrieveError::Decode(_))
    }
}

/// A standardized container for API responses.
///
/// This struct wraps the deserialized data along with metadata about the
/// HTTP transaction, such as status codes and headers.
#[derive(Debug)]
pub struct ApiResponse<T> {
    /// The successfully deserialized response body, if any.
    pub data: Option<T>,
    /// The raw error body returned by the server if the request failed.
    pub error_body: Option<String>,
    /// The numeric HTTP status code.
    pub status: u16,
    /// Indicates if the status code was in the 2xx range.
    pub success: bool,
    /// The headers returned by the server.
    pub headers: HeaderMap,
}

/// A flexible asynchronous HTTP client.
///
/// Handles base URLs, default headers, cookie persistence and per-call timeouts.
/// The underlying connections are released when the client is dropped.
pub struct ApiClient {
    /// The underlying cookie-enabled client.
    inner: reqwest::Client,
    /// The base URL to which all relative paths are joined.
    base_url: Url,
    /// Headers sent with every request unless overridden per call.
    default_headers: HeaderMap,
    /// Timeout applied to each individual call.
    timeout: Duration,
}

impl ApiClient {
    /// Creates a new `ApiClient` with a fresh cookie jar.
    ///
    /// # Arguments
    /// * `base_url` - The absolute base URL (e.g., "https://www.nseindia.com").
    ///   A trailing slash is added when missing so relative paths join below it.
    /// * `default_headers` - Headers attached to every request.
    /// * `timeout` - Per-call timeout.
    ///
    /// # Errors
    /// Returns `RetrieveError::InvalidUrl` if `base_url` is not absolute and
    /// `RetrieveError::Transport` if the TLS backend cannot be initialised.
    pub fn new(
        base_url: &str,
        default_headers: HeaderMap,
        timeout: Duration,
    ) -> Result<Self, RetrieveError> {
        let mut normalized = base_url.trim().to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        let url = Url::parse(&normalized)?;

        let inner = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(RetrieveError::Transport)?;

        Ok(Self {
            inner,
            base_url: url,
            default_headers,
            timeout,
        })
    }

    /// The base URL all paths are joined to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves `path` against the base URL.
    pub fn url_for(&self, path: &str) -> Result<Url, RetrieveError> {
        Ok(self.base_url.join(path)?)
    }

    fn build(&self, method: Method, url: Url, headers: Option<HeaderMap>) -> reqwest::RequestBuilder {
        let mut req = self
            .inner
            .request(method, url)
            .headers(self.default_headers.clone())
            .timeout(self.timeout);

        if let Some(h) = headers {
            req = req.headers(h);
        }
        req
    }

    /// Sends a request and discards the body, returning only the status code.
    ///
    /// Useful for calls made for their side effects, such as collecting
    /// session cookies.
    pub async fn touch(
        &self,
        method: Method,
        path: &str,
        headers: Option<HeaderMap>,
    ) -> Result<u16, RetrieveError> {
        let url = self.url_for(path)?;
        let response = self
            .build(method, url, headers)
            .send()
            .await
            .map_err(RetrieveError::Transport)?;
        Ok(response.status().as_u16())
    }

    /// Performs a generic HTTP request and handles the response.
    ///
    /// Non-2xx statuses are returned as `ApiResponse { success: false, .. }`
    /// with the body captured as text, not as errors.
    ///
    /// # Errors
    /// `InvalidUrl` if the path cannot be joined, `Transport` if the request
    /// fails on the wire, `Decode` if a 2xx body is not valid `T`.
    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        headers: Option<HeaderMap>,
    ) -> Result<ApiResponse<T>, RetrieveError>
    where
        T: DeserializeOwned,
    {
        let url = self.url_for(path)?;
        let response: reqwest::Response = self
            .build(method, url, headers)
            .send()
            .await
            .map_err(RetrieveError::Transport)?;

        let status = response.status();
        let resp_headers = response.headers().clone();

        if status.is_success() {
            let data = response.json::<T>().await.map_err(RetrieveError::Decode)?;
            Ok(ApiResponse {
                data: Some(data),
                error_body: None,
                status: status.as_u16(),
                success: true,
                headers: resp_headers,
            })
        } else {
            let error_text = response.text().await.ok();
            Ok(ApiResponse {
                data: None,
                error_body: error_text,
                status: status.as_u16(),
                success: false,
                headers: resp_headers,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_relative_base_url_is_rejected() {
        let res = ApiClient::new("not a url", HeaderMap::new(), Duration::from_secs(1));
        assert!(matches!(res, Err(RetrieveError::InvalidUrl(_))));
    }

    #[test]
    fn test_paths_join_below_base() {
        let client =
            ApiClient::new("https://example.com/v1", HeaderMap::new(), Duration::from_secs(1))
                .unwrap();
        assert_eq!(client.base_url().as_str(), "https://example.com/v1/");
        assert_eq!(
            client.url_for("items?x=1").unwrap().as_str(),
            "https://example.com/v1/items?x=1"
        );
        assert_eq!(client.url_for("").unwrap().as_str(), "https://example.com/v1/");
    }

    #[tokio::test]
    async fn test_non_success_status_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("nope"))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri(), HeaderMap::new(), Duration::from_secs(5)).unwrap();
        let res = client.request::<Value>(Method::GET, "missing", None).await.unwrap();

        assert!(!res.success);
        assert_eq!(res.status, 404);
        assert_eq!(res.error_body.as_deref(), Some("nope"));
        assert!(res.data.is_none());
    }

    #[tokio::test]
    async fn test_undecodable_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/html"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri(), HeaderMap::new(), Duration::from_secs(5)).unwrap();
        let err = client.request::<Value>(Method::GET, "html", None).await.unwrap_err();

        assert!(matches!(err, RetrieveError::Decode(_)));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_cookies_are_replayed_within_one_client() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).insert_header("set-cookie", "session=abc; Path=/"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .and(header("cookie", "session=abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri(), HeaderMap::new(), Duration::from_secs(5)).unwrap();
        assert_eq!(client.touch(Method::GET, "", None).await.unwrap(), 200);

        let res = client.request::<Value>(Method::GET, "data", None).await.unwrap();
        assert!(res.success);
        assert_eq!(res.data, Some(serde_json::json!({"ok": true})));
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let client =
            ApiClient::new(&server.uri(), HeaderMap::new(), Duration::from_millis(50)).unwrap();
        let err = client.touch(Method::GET, "slow", None).await.unwrap_err();

        match err {
            RetrieveError::Transport(e) => assert!(e.is_timeout()),
            other => panic!("expected a timeout, got {other:?}"),
        }
    }
}
