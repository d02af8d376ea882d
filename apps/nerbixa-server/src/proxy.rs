//! Generation proxy
//!
//! Forwards `POST /api/generate` to the configured automation webhook and
//! mirrors the upstream status, content type and body back to the caller.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use nerbixa_core::ProxySettings;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

pub const NOT_CONFIGURED_MESSAGE: &str = "Webhook URL not configured";
pub const TIMEOUT_MESSAGE: &str = "Request timeout";
pub const UPSTREAM_FAILED_MESSAGE: &str = "Upstream call failed";

const DEFAULT_CONTENT_TYPE: &str = "application/json";
const MULTIPART_PREFIX: &str = "multipart/form-data";
const EMPTY_OBJECT: &[u8] = b"{}";

/// Shared proxy state
#[derive(Debug, Clone)]
pub struct ProxyState {
    client: reqwest::Client,
    upstream_url: Option<String>,
    timeout: Duration,
}

impl ProxyState {
    pub fn new(upstream_url: Option<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("nerbixa-server/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            upstream_url: upstream_url.filter(|url| !url.trim().is_empty()),
            timeout,
        })
    }

    pub fn from_settings(settings: &ProxySettings) -> Result<Self, reqwest::Error> {
        Self::new(settings.upstream_url.clone(), settings.timeout())
    }

    pub fn upstream_url(&self) -> Option<&str> {
        self.upstream_url.as_deref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Outcome of one upstream call
enum UpstreamError {
    Timeout,
    Transport(reqwest::Error),
}

struct UpstreamReply {
    status: u16,
    content_type: Option<String>,
    body: Bytes,
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn contains_subslice(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

/// Request details worth logging. Never the message content itself.
fn log_json_request(payload: &Value) {
    let tool_id = payload.pointer("/tool/id").and_then(Value::as_str);
    let message_length = payload
        .pointer("/message/content")
        .and_then(Value::as_str)
        .map(|content| content.chars().count());
    let has_image = payload.get("image").map_or(false, |image| !image.is_null());

    info!(?tool_id, ?message_length, has_image, "Proxying JSON request");
}

async fn call_upstream(
    state: &ProxyState,
    url: &str,
    content_type: &str,
    body: Bytes,
) -> Result<UpstreamReply, UpstreamError> {
    let request = state
        .client
        .post(url)
        .header("content-type", content_type)
        .body(body);

    let exchange = async {
        let response = request.send().await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?;

        Ok::<_, reqwest::Error>(UpstreamReply {
            status,
            content_type,
            body,
        })
    };

    match tokio::time::timeout(state.timeout, exchange).await {
        Ok(Ok(reply)) => Ok(reply),
        Ok(Err(e)) if e.is_timeout() => Err(UpstreamError::Timeout),
        Ok(Err(e)) => Err(UpstreamError::Transport(e)),
        Err(_) => Err(UpstreamError::Timeout),
    }
}

/// Handle `POST /api/generate`
pub async fn generate(
    State(state): State<Arc<ProxyState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let started = Instant::now();

    let Some(upstream_url) = state.upstream_url() else {
        error!("Upstream webhook URL not configured");
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, NOT_CONFIGURED_MESSAGE);
    };

    let inbound_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let (content_type, forwarded) = if inbound_type.starts_with(MULTIPART_PREFIX) {
        info!(
            body_size = body.len(),
            has_file = contains_subslice(&body, b"name=\"file\""),
            "Proxying multipart request"
        );
        (inbound_type, body)
    } else {
        match serde_json::from_slice::<Value>(&body) {
            Ok(payload) => {
                log_json_request(&payload);
                (DEFAULT_CONTENT_TYPE.to_string(), body)
            }
            Err(e) => {
                warn!(error = %e, "Failed to parse JSON payload, forwarding empty object");
                log_json_request(&json!({}));
                (DEFAULT_CONTENT_TYPE.to_string(), Bytes::from_static(EMPTY_OBJECT))
            }
        }
    };

    let result = call_upstream(&state, upstream_url, &content_type, forwarded).await;
    let processing_time_ms = started.elapsed().as_millis() as u64;

    match result {
        Ok(reply) => {
            info!(
                status = reply.status,
                processing_time_ms,
                response_size = reply.body.len(),
                "Upstream response received"
            );

            let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);
            let content_type = reply
                .content_type
                .and_then(|value| HeaderValue::from_str(&value).ok())
                .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));

            (status, [(header::CONTENT_TYPE, content_type)], reply.body).into_response()
        }
        Err(UpstreamError::Timeout) => {
            error!(processing_time_ms, timeout_ms = state.timeout.as_millis() as u64, "Upstream call timed out");
            error_response(StatusCode::GATEWAY_TIMEOUT, TIMEOUT_MESSAGE)
        }
        Err(UpstreamError::Transport(e)) => {
            error!(processing_time_ms, error = %e, "Upstream call failed");
            error_response(StatusCode::BAD_GATEWAY, UPSTREAM_FAILED_MESSAGE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_upstream_is_unconfigured() {
        let state = ProxyState::new(Some("  ".to_string()), Duration::from_secs(30)).unwrap();
        assert!(state.upstream_url().is_none());
    }

    #[test]
    fn test_from_settings() {
        let settings = ProxySettings {
            upstream_url: Some("http://upstream.test/hook".to_string()),
            timeout_secs: 30,
        };
        let state = ProxyState::from_settings(&settings).unwrap();
        assert_eq!(state.upstream_url(), Some("http://upstream.test/hook"));
        assert_eq!(state.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_contains_subslice() {
        assert!(contains_subslice(b"Content-Disposition: form-data; name=\"file\"", b"name=\"file\""));
        assert!(!contains_subslice(b"name=\"message\"", b"name=\"file\""));
    }

    #[tokio::test]
    async fn test_missing_upstream_response() {
        let state = Arc::new(ProxyState::new(None, Duration::from_secs(30)).unwrap());
        let response = generate(State(state), HeaderMap::new(), Bytes::from_static(b"{}")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
