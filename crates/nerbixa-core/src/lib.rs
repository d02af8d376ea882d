//! Core types shared across the Nerbixa workspace.
//!
//! This crate holds the result model every network operation returns, the
//! outbound webhook payload, the tool catalog and layered configuration.

pub mod config;
pub mod error;
pub mod tools;
pub mod types;

pub use config::{AppConfig, ProxySettings, ServerConfig, WebhookSettings};
pub use error::{ErrorCode, WebhookEnvelope, WebhookError, WebhookResponse, WebhookResult};
pub use tools::{all_tools, find_tool, tool_or_default, tool_price, ToolConfig};
pub use types::{
    generate_request_id, generate_session_id, FileUpload, ImageInfo, MessageInfo, MessageRole,
    PayloadMetadata, ToolInfo, UserInfo, ValidationReport, WebhookPayload,
};
