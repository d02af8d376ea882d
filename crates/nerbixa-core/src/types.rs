//! Outbound webhook payload and id generators.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Largest image accepted for upload.
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;
pub const PAYLOAD_SOURCE: &str = "yum-mi-web-app";
pub const PAYLOAD_VERSION: &str = "1.0";

const ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const ID_SUFFIX_LEN: usize = 9;

fn random_suffix() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_SUFFIX_LEN)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

/// `session_<unix-millis>_<9 lowercase alnum>`
pub fn generate_session_id() -> String {
    format!("session_{}_{}", Utc::now().timestamp_millis(), random_suffix())
}

/// `req_<unix-millis>_<9 lowercase alnum>`, sent as `X-Request-ID`.
pub fn generate_request_id() -> String {
    format!("req_{}_{}", Utc::now().timestamp_millis(), random_suffix())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageInfo {
    pub content: String,
    pub role: MessageRole,
    pub timestamp: DateTime<Utc>,
    pub session_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInfo {
    pub id: String,
    pub name: String,
    pub price: u32,
    pub gradient: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub session_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInfo {
    pub file_name: String,
    pub file_size: u64,
    pub file_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadMetadata {
    pub source: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub user_agent: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

/// A single submission to an automation webhook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub message: MessageInfo,
    pub tool: ToolInfo,
    pub user: UserInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageInfo>,
    pub metadata: PayloadMetadata,
}

/// Outcome of [`WebhookPayload::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

impl ImageInfo {
    fn collect_errors(&self, errors: &mut Vec<String>) {
        if self.file_size > MAX_IMAGE_BYTES {
            errors.push("Image size must be less than 10MB".to_string());
        }
        if !self.file_type.starts_with("image/") {
            errors.push("File must be an image".to_string());
        }
    }

    pub fn validate(&self) -> ValidationReport {
        let mut errors = Vec::new();
        self.collect_errors(&mut errors);
        ValidationReport::from_errors(errors)
    }
}

impl WebhookPayload {
    /// Checks every rule and reports all violations.
    pub fn validate(&self) -> ValidationReport {
        let mut errors = Vec::new();

        if self.message.content.trim().is_empty() {
            errors.push("Message content is required".to_string());
        }
        if self.tool.id.trim().is_empty() {
            errors.push("Tool ID is required".to_string());
        }
        if self.user.session_id.trim().is_empty() {
            errors.push("Session ID is required".to_string());
        }
        if let Some(image) = &self.image {
            image.collect_errors(&mut errors);
        }

        ValidationReport::from_errors(errors)
    }
}

/// An in-memory file ready for multipart upload.
#[derive(Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn image_info(&self) -> ImageInfo {
        ImageInfo {
            file_name: self.file_name.clone(),
            file_size: self.size(),
            file_type: self.mime_type.clone(),
        }
    }
}

impl std::fmt::Debug for FileUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileUpload")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}
