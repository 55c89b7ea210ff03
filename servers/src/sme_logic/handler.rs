use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use lib_common::loggers::loggerlocal::LoggerLocal;
use lib_common::markets::nse::announcements::{NormalizedAnnouncement, normalize_all};
use lib_common::markets::nse::{ApiCallNse, RetryPolicy};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

pub const EMPTY_RESULT_MESSAGE: &str = "Failed to fetch or no SME announcements found.";

/// Shared, read-only state. Every request builds its own NSE client from it.
#[derive(Clone)]
pub struct AppState {
    pub base_url: Arc<str>,
    pub policy: RetryPolicy,
    pub logger: Arc<LoggerLocal>,
}

impl AppState {
    pub fn new(base_url: &str, policy: RetryPolicy, logger: Arc<LoggerLocal>) -> Self {
        Self {
            base_url: Arc::from(base_url),
            policy,
            logger,
        }
    }
}

/// Response body of `/api/sme_announcements`.
#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Envelope {
    Success {
        count: usize,
        data: Vec<NormalizedAnnouncement>,
    },
    Error {
        message: String,
    },
}

impl Envelope {
    /// An empty list is reported as an error, whatever the cause.
    pub fn from_announcements(data: Vec<NormalizedAnnouncement>) -> Self {
        if data.is_empty() {
            Envelope::Error {
                message: EMPTY_RESULT_MESSAGE.to_string(),
            }
        } else {
            Envelope::Success {
                count: data.len(),
                data,
            }
        }
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        let status = match &self {
            Envelope::Success { .. } => StatusCode::OK,
            Envelope::Error { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/sme_announcements", get(sme_announcements))
        .route("/health", get(health_handler))
        .with_state(state)
}

async fn sme_announcements(State(state): State<AppState>) -> Envelope {
    let api_call = ApiCallNse::with_base_url(&state.base_url, state.policy, Arc::clone(&state.logger));
    let raw = api_call.fetch().await;
    let envelope = Envelope::from_announcements(normalize_all(&raw));

    match &envelope {
        Envelope::Success { count, .. } => {
            tracing::info!(count, "Served SME announcements");
        }
        Envelope::Error { .. } => {
            tracing::warn!("No SME announcements to serve");
        }
    }
    envelope
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use serde_json::Value;
    use std::time::Duration;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_retries: 3,
            backoff_unit: Duration::from_millis(1),
            request_timeout: Duration::from_secs(2),
        }
    }

    async fn call(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn upstream_with(body: ResponseTemplate) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/corporate-announcements"))
            .and(query_param("segment", "SME"))
            .respond_with(body)
            .mount(&server)
            .await;
        server
    }

    fn app_for(server: &MockServer) -> Router {
        router(AppState::new(
            &server.uri(),
            fast_policy(),
            Arc::new(LoggerLocal::silent("handler_test")),
        ))
    }

    #[tokio::test]
    async fn test_end_to_end_success() {
        let server = upstream_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": 1, "symbol": "ABC", "announcementTime": "2024-01-01 09:00:00"}]
        })))
        .await;

        let (status, body) = call(app_for(&server), "/api/sme_announcements").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "status": "success",
                "count": 1,
                "data": [{
                    "announcementId": 1,
                    "symbol": "ABC",
                    "companyName": "",
                    "subject": "",
                    "announcementTime": "2024-01-01 09:00:00",
                    "formattedTime": "2024-01-01T09:00:00",
                    "pdfUrl": "",
                    "segment": "SME",
                    "documentType": "",
                    "description": ""
                }]
            })
        );
    }

    #[tokio::test]
    async fn test_empty_upstream_list_is_500() {
        let server = upstream_with(ResponseTemplate::new(200).set_body_json(json!({"data": []}))).await;

        let (status, body) = call(app_for(&server), "/api/sme_announcements").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"status": "error", "message": EMPTY_RESULT_MESSAGE}));
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_500() {
        let server = upstream_with(ResponseTemplate::new(503)).await;

        let (status, body) = call(app_for(&server), "/api/sme_announcements").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], EMPTY_RESULT_MESSAGE);
    }

    #[tokio::test]
    async fn test_health() {
        let server = MockServer::start().await;
        let (status, body) = call(app_for(&server), "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok"}));
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }

    #[test]
    fn test_envelope_key_order() {
        let text = serde_json::to_string(&Envelope::Success { count: 0, data: vec![] }).unwrap();
        assert_eq!(text, r#"{"status":"success","count":0,"data":[]}"#);
    }
}
