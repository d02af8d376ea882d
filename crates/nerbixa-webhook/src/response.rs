//! Normalizes upstream HTTP responses into a [`WebhookResult`].

use crate::timeout::{classify_transport_error, elapsed_ms};
use nerbixa_core::{WebhookError, WebhookResponse, WebhookResult};
use reqwest::header::CONTENT_TYPE;
use reqwest::Response;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{info, warn};

const TEXT_FIELDS: [&str; 3] = ["response", "content", "message"];

/// Reads `response` fully. Non-2xx becomes `HTTP_<status>`; a JSON content
/// type is parsed first and falls back to raw text when decoding fails.
pub(crate) async fn read_response(
    response: Response,
    deadline: Duration,
    started: Instant,
) -> WebhookResult {
    let status = response.status();

    if !status.is_success() {
        let reason = status.canonical_reason().unwrap_or("Unknown Status");
        let body = response.text().await.unwrap_or_default();
        return Err(WebhookError::http(
            status.as_u16(),
            reason,
            body,
            elapsed_ms(started),
        ));
    }

    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.contains("application/json"))
        .unwrap_or(false);

    let body = response
        .text()
        .await
        .map_err(|e| classify_transport_error(&e, deadline, started))?;
    let processing_time = elapsed_ms(started);

    if is_json {
        match serde_json::from_str::<Value>(&body) {
            Ok(value) => {
                info!(
                    processing_time_ms = processing_time,
                    response_size = body.len(),
                    "API request successful (JSON)"
                );
                return Ok(WebhookResponse {
                    response: extract_text(&value),
                    processing_time,
                    tokens: extract_tokens(&value),
                });
            }
            Err(e) => {
                warn!(error = %e, "JSON parsing failed, falling back to text");
            }
        }
    }

    info!(
        processing_time_ms = processing_time,
        response_size = body.len(),
        "API request successful (text)"
    );
    Ok(WebhookResponse {
        response: body,
        processing_time,
        tokens: None,
    })
}

/// Text carried by a JSON body: a bare string, the first non-empty
/// `response`/`content`/`message` field, or the serialized body.
pub fn extract_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Object(map) => TEXT_FIELDS
            .iter()
            .filter_map(|field| map.get(*field).and_then(Value::as_str))
            .find(|text| !text.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| value.to_string()),
        other => other.to_string(),
    }
}

pub fn extract_tokens(value: &Value) -> Option<u64> {
    value.get("tokens").and_then(Value::as_u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_text_prefers_known_fields() {
        assert_eq!(extract_text(&json!({"response": "a", "content": "b"})), "a");
        assert_eq!(extract_text(&json!({"content": "b", "message": "c"})), "b");
        assert_eq!(extract_text(&json!({"response": "", "message": "c"})), "c");
        assert_eq!(extract_text(&json!("plain")), "plain");
    }

    #[test]
    fn test_extract_text_stringifies_unknown_shapes() {
        assert_eq!(extract_text(&json!({"output": "x"})), r#"{"output":"x"}"#);
        assert_eq!(extract_text(&json!([1, 2])), "[1,2]");
        assert_eq!(extract_text(&json!({"response": 5})), r#"{"response":5}"#);
    }

    #[test]
    fn test_extract_tokens() {
        assert_eq!(extract_tokens(&json!({"tokens": 321})), Some(321));
        assert_eq!(extract_tokens(&json!({"tokens": "many"})), None);
        assert_eq!(extract_tokens(&json!("text")), None);
    }
}
