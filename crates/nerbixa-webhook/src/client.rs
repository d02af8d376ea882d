//! Webhook client

use crate::response::read_response;
use crate::retry::{
    RetryOrchestrator, RetryPolicy, Sleeper, TokioSleeper, DESCRIPTION_RETRY_LABEL, RETRY_LABEL,
    UPLOAD_RETRY_LABEL,
};
use crate::timeout::{classify_transport_error, with_deadline};
use crate::{ClientError, Result};
use chrono::{DateTime, Utc};
use nerbixa_core::types::{PAYLOAD_SOURCE, PAYLOAD_VERSION};
use nerbixa_core::{
    generate_request_id, generate_session_id, tool_or_default, tool_price, FileUpload,
    MessageInfo, MessageRole, PayloadMetadata, ToolConfig, ToolInfo, UserInfo, ValidationReport,
    WebhookError, WebhookPayload, WebhookResult, WebhookSettings,
};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use secrecy::ExposeSecret;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, instrument};
use url::Url;

/// Prompt sent with an upload when the user typed nothing.
pub const DEFAULT_UPLOAD_PROMPT: &str = "Analyze this image";

const REQUEST_ID_HEADER: &str = "X-Request-ID";
const USER_AGENT_HEADER: &str = "X-User-Agent";

/// JSON carried in the `message` field of a multipart upload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadMessage<'a> {
    tool_id: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<&'a str>,
    timestamp: DateTime<Utc>,
    session_id: &'a str,
}

impl<'a> From<&'a WebhookPayload> for UploadMessage<'a> {
    fn from(payload: &'a WebhookPayload) -> Self {
        Self {
            tool_id: &payload.tool.id,
            content: &payload.message.content,
            user_id: payload.user.id.as_deref(),
            timestamp: payload.message.timestamp,
            session_id: &payload.user.session_id,
        }
    }
}

/// Builder for [`WebhookClient`]
pub struct WebhookClientBuilder {
    settings: WebhookSettings,
    retry_policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl WebhookClientBuilder {
    pub fn new() -> Self {
        Self {
            settings: WebhookSettings::default(),
            retry_policy: RetryPolicy::default(),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    pub fn settings(mut self, settings: WebhookSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Replace the backoff sleeper, mainly for tests.
    pub fn sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn build(self) -> Result<WebhookClient> {
        for endpoint in [
            self.settings.proxy_url.as_str(),
            self.settings.direct_url(),
            self.settings.description_url(),
        ] {
            Url::parse(endpoint)
                .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", endpoint, e)))?;
        }

        let http = Client::builder()
            .user_agent(self.settings.user_agent.clone())
            .build()?;

        Ok(WebhookClient {
            http,
            settings: self.settings,
            retry: RetryOrchestrator::new(self.retry_policy, self.sleeper),
        })
    }
}

impl Default for WebhookClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Sends submissions to the automation webhooks.
///
/// JSON submissions go through the same-origin proxy; uploads and text-only
/// tool descriptions go straight to their external endpoints.
#[derive(Clone)]
pub struct WebhookClient {
    http: Client,
    settings: WebhookSettings,
    retry: RetryOrchestrator,
}

impl std::fmt::Debug for WebhookClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookClient")
            .field("proxy_url", &self.settings.proxy_url)
            .field("direct_url", &self.settings.direct_url())
            .field("description_url", &self.settings.description_url())
            .field("has_auth_token", &self.settings.auth_token.is_some())
            .finish()
    }
}

impl WebhookClient {
    pub fn builder() -> WebhookClientBuilder {
        WebhookClientBuilder::new()
    }

    pub fn new(settings: WebhookSettings) -> Result<Self> {
        Self::builder().settings(settings).build()
    }

    pub fn settings(&self) -> &WebhookSettings {
        &self.settings
    }

    /// Default per-attempt timeout from settings.
    pub fn default_timeout(&self) -> Duration {
        self.settings.timeout()
    }

    /// Builds a fresh payload. Only the session id and timestamps vary
    /// between calls with identical inputs.
    pub fn build_payload(
        &self,
        prompt: &str,
        tool_id: &str,
        tool: &ToolConfig,
        file: Option<&FileUpload>,
        user_id: Option<&str>,
    ) -> WebhookPayload {
        let now = Utc::now();
        let session_id = generate_session_id();

        WebhookPayload {
            message: MessageInfo {
                content: prompt.to_string(),
                role: MessageRole::User,
                timestamp: now,
                session_id: session_id.clone(),
            },
            tool: ToolInfo {
                id: tool_id.to_string(),
                name: tool.title.clone(),
                price: tool_price(tool_id),
                gradient: tool.gradient.clone(),
            },
            user: UserInfo {
                id: user_id.map(str::to_string),
                session_id,
            },
            image: file.map(FileUpload::image_info),
            metadata: PayloadMetadata {
                source: PAYLOAD_SOURCE.to_string(),
                version: PAYLOAD_VERSION.to_string(),
                timestamp: now,
                user_agent: self.settings.user_agent.clone(),
                locale: Some(self.settings.locale.clone()),
            },
        }
    }

    pub fn validate(&self, payload: &WebhookPayload) -> ValidationReport {
        payload.validate()
    }

    fn ensure_valid(&self, payload: &WebhookPayload) -> std::result::Result<(), WebhookError> {
        let report = payload.validate();
        if report.valid {
            Ok(())
        } else {
            error!(errors = ?report.errors, "Payload validation failed");
            Err(WebhookError::validation(&report.errors))
        }
    }

    fn upload_payload(
        &self,
        file: &FileUpload,
        tool_id: &str,
        prompt: Option<&str>,
        user_id: Option<&str>,
    ) -> WebhookPayload {
        let content = prompt
            .map(str::trim)
            .filter(|prompt| !prompt.is_empty())
            .unwrap_or(DEFAULT_UPLOAD_PROMPT);
        let tool = tool_or_default(tool_id);
        self.build_payload(content, tool_id, &tool, Some(file), user_id)
    }

    fn description_payload(
        &self,
        description: &str,
        tool_id: &str,
        user_id: Option<&str>,
    ) -> WebhookPayload {
        let tool = tool_or_default(tool_id);
        self.build_payload(description, tool_id, &tool, None, user_id)
    }

    /// POSTs `payload` as JSON to the proxy.
    #[instrument(skip(self, payload), fields(tool_id = %payload.tool.id))]
    pub async fn send_json(&self, payload: &WebhookPayload, timeout: Duration) -> WebhookResult {
        self.ensure_valid(payload)?;

        let request_id = generate_request_id();
        info!(
            request_id = %request_id,
            message_length = payload.message.content.chars().count(),
            has_image = payload.image.is_some(),
            "Sending request to API proxy"
        );

        let request = self
            .http
            .post(&self.settings.proxy_url)
            .header(CONTENT_TYPE, "application/json")
            .header(REQUEST_ID_HEADER, request_id)
            .json(payload);

        self.execute("send_json", request, timeout).await
    }

    /// Uploads `file` as multipart form data to the direct endpoint. The
    /// content type (with boundary) is left to the transport.
    #[instrument(skip(self, file, prompt), fields(file_name = %file.file_name, file_size = file.size()))]
    pub async fn send_multipart(
        &self,
        file: &FileUpload,
        tool_id: &str,
        prompt: Option<&str>,
        user_id: Option<&str>,
        timeout: Duration,
    ) -> WebhookResult {
        let payload = self.upload_payload(file, tool_id, prompt, user_id);
        self.ensure_valid(&payload)?;

        let message = serde_json::to_string(&UploadMessage::from(&payload))
            .map_err(WebhookError::network)?;
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.mime_type)
            .map_err(|_| WebhookError::validation(&["File must be an image".to_string()]))?;
        let form = Form::new().part("file", part).text("message", message);

        info!(tool_id = %tool_id, "Uploading file to webhook");

        let request = self.http.post(self.settings.direct_url()).multipart(form);
        self.execute("send_multipart", request, timeout).await
    }

    /// POSTs a text-only request to the tool's description endpoint.
    #[instrument(skip(self, description))]
    pub async fn send_description(
        &self,
        description: &str,
        tool_id: &str,
        user_id: Option<&str>,
        timeout: Duration,
    ) -> WebhookResult {
        let payload = self.description_payload(description, tool_id, user_id);
        self.ensure_valid(&payload)?;

        let request_id = generate_request_id();
        info!(
            request_id = %request_id,
            message_length = description.chars().count(),
            "Sending description request"
        );

        let mut request = self
            .http
            .post(self.settings.description_url())
            .header(CONTENT_TYPE, "application/json")
            .header(REQUEST_ID_HEADER, request_id)
            .header(USER_AGENT_HEADER, &self.settings.user_agent)
            .json(&payload);

        if let Some(token) = &self.settings.auth_token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token.expose_secret()));
        }

        self.execute("send_description", request, timeout).await
    }

    pub async fn send_json_with_retry(
        &self,
        payload: &WebhookPayload,
        timeout: Duration,
    ) -> WebhookResult {
        self.ensure_valid(payload)?;
        self.retry
            .run(RETRY_LABEL, self.settings.max_retries, || {
                self.send_json(payload, timeout)
            })
            .await
    }

    pub async fn send_multipart_with_retry(
        &self,
        file: &FileUpload,
        tool_id: &str,
        prompt: Option<&str>,
        user_id: Option<&str>,
        timeout: Duration,
    ) -> WebhookResult {
        // Invalid uploads fail the same way on every attempt.
        self.ensure_valid(&self.upload_payload(file, tool_id, prompt, user_id))?;
        self.retry
            .run(UPLOAD_RETRY_LABEL, self.settings.max_retries, || {
                self.send_multipart(file, tool_id, prompt, user_id, timeout)
            })
            .await
    }

    pub async fn send_description_with_retry(
        &self,
        description: &str,
        tool_id: &str,
        user_id: Option<&str>,
        timeout: Duration,
    ) -> WebhookResult {
        if description.trim().is_empty() {
            return Err(WebhookError::validation(&[
                "Message content is required".to_string()
            ]));
        }
        self.ensure_valid(&self.description_payload(description, tool_id, user_id))?;
        self.retry
            .run(DESCRIPTION_RETRY_LABEL, self.settings.max_retries, || {
                self.send_description(description, tool_id, user_id, timeout)
            })
            .await
    }

    async fn execute(
        &self,
        operation: &'static str,
        request: RequestBuilder,
        timeout: Duration,
    ) -> WebhookResult {
        let started = Instant::now();

        let outcome = with_deadline(operation, timeout, started, async {
            let response = request
                .send()
                .await
                .map_err(|e| classify_transport_error(&e, timeout, started))?;
            read_response(response, timeout, started).await
        })
        .await;

        if let Err(e) = &outcome {
            error!(
                operation,
                error_code = %e.code,
                error = %e.message,
                processing_time_ms = started.elapsed().as_millis() as u64,
                "API request failed"
            );
        }
        outcome
    }
}
