//! Result model shared by every network operation.
//!
//! A webhook call either produces a [`WebhookResponse`] or a [`WebhookError`]
//! tagged with an [`ErrorCode`]. [`WebhookEnvelope`] gives the
//! `{success, data | error}` wire shape used by clients that need it.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const CONNECTION_MESSAGE: &str =
    "Unable to connect to the server. Please check your internet connection.";
pub const TIMEOUT_MESSAGE: &str = "Request timed out. The server may be busy, please try again.";
pub const RESPONSE_FORMAT_MESSAGE: &str = "Server returned an unexpected response format.";

/// Error code taxonomy for webhook failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Upstream answered with a non-2xx status.
    Http(u16),
    NetworkError,
    ConnectionError,
    TimeoutError,
    ResponseFormatError,
    MaxRetriesExceeded,
    /// Payload rejected before any transport happened.
    ValidationError,
}

impl ErrorCode {
    pub fn as_status(&self) -> Option<u16> {
        match self {
            Self::Http(status) => Some(*status),
            _ => None,
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Http(status) if (400..500).contains(status))
    }

    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Http(status) if *status >= 500)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(status) => write!(f, "HTTP_{}", status),
            Self::NetworkError => write!(f, "NETWORK_ERROR"),
            Self::ConnectionError => write!(f, "CONNECTION_ERROR"),
            Self::TimeoutError => write!(f, "TIMEOUT_ERROR"),
            Self::ResponseFormatError => write!(f, "RESPONSE_FORMAT_ERROR"),
            Self::MaxRetriesExceeded => write!(f, "MAX_RETRIES_EXCEEDED"),
            Self::ValidationError => write!(f, "VALIDATION_ERROR"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown error code: {0}")]
pub struct UnknownErrorCode(pub String);

impl FromStr for ErrorCode {
    type Err = UnknownErrorCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NETWORK_ERROR" => Ok(Self::NetworkError),
            "CONNECTION_ERROR" => Ok(Self::ConnectionError),
            "TIMEOUT_ERROR" => Ok(Self::TimeoutError),
            "RESPONSE_FORMAT_ERROR" => Ok(Self::ResponseFormatError),
            "MAX_RETRIES_EXCEEDED" => Ok(Self::MaxRetriesExceeded),
            "VALIDATION_ERROR" => Ok(Self::ValidationError),
            other => other
                .strip_prefix("HTTP_")
                .and_then(|status| status.parse::<u16>().ok())
                .map(Self::Http)
                .ok_or_else(|| UnknownErrorCode(other.to_string())),
        }
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ErrorCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A failed webhook call.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct WebhookError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl WebhookError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Non-2xx response. `reason` is the canonical reason phrase for `status`.
    pub fn http(status: u16, reason: &str, body: String, processing_time_ms: u64) -> Self {
        Self::new(
            ErrorCode::Http(status),
            format!("Webhook request failed: {}", reason),
        )
        .with_details(json!({
            "status": status,
            "statusText": reason,
            "body": body,
            "processingTime": processing_time_ms,
        }))
    }

    pub fn connection(cause: impl fmt::Display) -> Self {
        Self::new(ErrorCode::ConnectionError, CONNECTION_MESSAGE)
            .with_details(json!({ "cause": cause.to_string() }))
    }

    pub fn timeout(timeout_ms: u64, processing_time_ms: u64) -> Self {
        Self::new(ErrorCode::TimeoutError, TIMEOUT_MESSAGE).with_details(json!({
            "timeoutMs": timeout_ms,
            "processingTime": processing_time_ms,
        }))
    }

    pub fn network(cause: impl fmt::Display) -> Self {
        Self::new(ErrorCode::NetworkError, cause.to_string())
    }

    pub fn response_format(cause: impl fmt::Display) -> Self {
        Self::new(ErrorCode::ResponseFormatError, RESPONSE_FORMAT_MESSAGE)
            .with_details(json!({ "cause": cause.to_string() }))
    }

    pub fn max_retries_exceeded(attempts: u32) -> Self {
        Self::new(
            ErrorCode::MaxRetriesExceeded,
            format!("Request failed after {} attempts", attempts),
        )
    }

    /// Every violated rule is listed, in the order reported by validation.
    pub fn validation(errors: &[String]) -> Self {
        Self::new(
            ErrorCode::ValidationError,
            format!("Invalid payload: {}", errors.join(", ")),
        )
        .with_details(json!({ "errors": errors }))
    }

    /// True when the user hit their generation limit and should see an upgrade prompt.
    pub fn is_upsell(&self) -> bool {
        self.code == ErrorCode::Http(403)
    }

    /// Message suitable for a toast in the presentation layer.
    pub fn user_message(&self) -> String {
        match self.code {
            ErrorCode::Http(403) => {
                "Your generation limit has been reached. Please upgrade to continue.".to_string()
            }
            ErrorCode::ConnectionError => CONNECTION_MESSAGE.to_string(),
            ErrorCode::TimeoutError => TIMEOUT_MESSAGE.to_string(),
            ErrorCode::ResponseFormatError => {
                "Server returned an unexpected response. Please try again.".to_string()
            }
            ErrorCode::NetworkError => {
                "Network error. Please check your connection and try again.".to_string()
            }
            ErrorCode::MaxRetriesExceeded => {
                "Request failed after multiple attempts. Please try again later.".to_string()
            }
            _ => format!("Request failed: {}", self.message),
        }
    }
}

/// Successful webhook call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
    pub response: String,
    /// Milliseconds from request start to body read.
    pub processing_time: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<u64>,
}

pub type WebhookResult = Result<WebhookResponse, WebhookError>;

/// `{success, data | error}` wire form of a [`WebhookResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEnvelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<WebhookResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<WebhookError>,
}

impl From<WebhookResult> for WebhookEnvelope {
    fn from(result: WebhookResult) -> Self {
        match result {
            Ok(data) => Self {
                success: true,
                data: Some(data),
                error: None,
            },
            Err(error) => Self {
                success: false,
                data: None,
                error: Some(error),
            },
        }
    }
}

impl From<WebhookEnvelope> for WebhookResult {
    fn from(envelope: WebhookEnvelope) -> Self {
        match (envelope.success, envelope.data, envelope.error) {
            (true, Some(data), _) => Ok(data),
            (_, _, Some(error)) => Err(error),
            _ => Err(WebhookError::response_format("envelope carried neither data nor error")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_wire_strings() {
        assert_eq!(ErrorCode::Http(404).to_string(), "HTTP_404");
        assert_eq!(ErrorCode::TimeoutError.to_string(), "TIMEOUT_ERROR");
        assert_eq!(
            "MAX_RETRIES_EXCEEDED".parse::<ErrorCode>().unwrap(),
            ErrorCode::MaxRetriesExceeded
        );
        assert_eq!("HTTP_503".parse::<ErrorCode>().unwrap(), ErrorCode::Http(503));
        assert!("HTTP_abc".parse::<ErrorCode>().is_err());
    }

    #[test]
    fn test_http_error_keeps_status_and_body() {
        let error = WebhookError::http(500, "Internal Server Error", "boom".into(), 12);

        assert_eq!(error.code, ErrorCode::Http(500));
        assert_eq!(error.message, "Webhook request failed: Internal Server Error");
        let details = error.details.unwrap();
        assert_eq!(details["status"], 500);
        assert_eq!(details["body"], "boom");
    }

    #[test]
    fn test_user_message_mapping() {
        let limit = WebhookError::new(ErrorCode::Http(403), "Webhook request failed: Forbidden");
        assert!(limit.is_upsell());
        assert!(limit.user_message().contains("generation limit"));

        let timeout = WebhookError::timeout(45_000, 45_001);
        assert!(!timeout.is_upsell());
        assert!(timeout.user_message().contains("busy"));

        let other = WebhookError::new(ErrorCode::Http(418), "teapot");
        assert_eq!(other.user_message(), "Request failed: teapot");
    }

    #[test]
    fn test_validation_error_lists_every_rule() {
        let error = WebhookError::validation(&[
            "Message content is required".to_string(),
            "Tool ID is required".to_string(),
        ]);

        assert_eq!(
            error.message,
            "Invalid payload: Message content is required, Tool ID is required"
        );
    }

    #[test]
    fn test_envelope_serialization() {
        let ok: WebhookResult = Ok(WebhookResponse {
            response: "hello".into(),
            processing_time: 5,
            tokens: None,
        });
        let value = serde_json::to_value(WebhookEnvelope::from(ok)).unwrap();
        assert_eq!(value, json!({"success": true, "data": {"response": "hello", "processingTime": 5}}));

        let err: WebhookResult = Err(WebhookError::network("socket closed"));
        let value = serde_json::to_value(WebhookEnvelope::from(err)).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["error"]["code"], "NETWORK_ERROR");
    }
}
