//! Webhook transport for Nerbixa
//!
//! This crate sends user submissions to the automation webhooks:
//! - Payload construction and validation
//! - JSON requests through the same-origin API proxy
//! - Multipart uploads and text-only requests to direct endpoints
//! - Per-attempt timeouts and error classification
//! - Bounded exponential-backoff retry
//!
//! # Example
//!
//! ```rust,ignore
//! use nerbixa_core::{find_tool, WebhookSettings};
//! use nerbixa_webhook::WebhookClient;
//!
//! let client = WebhookClient::new(WebhookSettings::default())?;
//! let tool = find_tool("master-chef").unwrap();
//! let payload = client.build_payload("Dinner ideas with salmon", "master-chef", &tool, None, None);
//!
//! match client.send_json_with_retry(&payload, client.default_timeout()).await {
//!     Ok(data) => println!("{}", data.response),
//!     Err(error) => eprintln!("{}", error.user_message()),
//! }
//! ```

pub mod client;
pub mod response;
pub mod retry;
pub mod timeout;

pub use client::{WebhookClient, WebhookClientBuilder, DEFAULT_UPLOAD_PROMPT};
pub use retry::{RetryDecision, RetryOrchestrator, RetryPolicy, RetryState, Sleeper, TokioSleeper};
pub use timeout::with_deadline;

use thiserror::Error;

/// Client construction errors
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid webhook URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, ClientError>;
