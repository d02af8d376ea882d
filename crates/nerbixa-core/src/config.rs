use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use config::builder::DefaultState;
use secrecy::Secret;
use serde::Deserialize;
use std::time::Duration;

pub const ENV_PREFIX: &str = "NERBIXA";
pub const DEFAULT_PROXY_URL: &str = "http://localhost:8080/api/generate";

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub webhook: WebhookSettings,
    #[serde(default)]
    pub proxy: ProxySettings,
    #[serde(default)]
    pub server: ServerConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_env(ENV_PREFIX)
    }

    /// Load configuration from environment with custom prefix
    pub fn load_from_env(prefix: &str) -> Result<Self, ConfigError> {
        let builder = Self::defaults()?.add_source(env_source(prefix));
        Self::finish(builder)
    }

    /// Load configuration from file with environment overrides
    pub fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let builder = Self::defaults()?
            .add_source(File::with_name(path))
            .add_source(env_source(ENV_PREFIX));
        Self::finish(builder)
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("webhook.proxy_url", DEFAULT_PROXY_URL)?
            .set_default("webhook.user_agent", default_user_agent())?
            .set_default("webhook.locale", "en-US")?
            .set_default("webhook.timeout_ms", 45_000)?
            .set_default("webhook.max_retries", 2)?
            .set_default("proxy.timeout_secs", 30)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let mut config: Self = builder.build()?.try_deserialize()?;
        config.apply_legacy_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Fill unset values from the variable names older deployments use.
    pub fn apply_legacy_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if self.webhook.direct_url.is_none() {
            self.webhook.direct_url = lookup("NEXT_PUBLIC_N8N_WEBHOOK_URL");
        }
        if self.webhook.description_url.is_none() {
            self.webhook.description_url = lookup("NEXT_PUBLIC_N8N_MASTER_NUTRITIONIST_URL");
        }
        if self.webhook.auth_token.is_none() {
            self.webhook.auth_token = lookup("NEXT_PUBLIC_N8N_AUTH_TOKEN").map(Secret::new);
        }
        if let Some(upstream) = lookup("N8N_WEBHOOK_URL").or_else(|| lookup("WEBHOOK_URL")) {
            self.proxy.upstream_url = Some(upstream);
        }
    }
}

fn env_source(prefix: &str) -> Environment {
    Environment::with_prefix(prefix)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Webhook client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookSettings {
    #[serde(default = "default_proxy_url")]
    pub proxy_url: String,
    /// Multipart upload endpoint. Falls back to the proxy.
    #[serde(default)]
    pub direct_url: Option<String>,
    /// Text-only tool endpoint. Falls back to the proxy.
    #[serde(default)]
    pub description_url: Option<String>,
    #[serde(default)]
    pub auth_token: Option<Secret<String>>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl WebhookSettings {
    pub fn new(proxy_url: impl Into<String>) -> Self {
        Self {
            proxy_url: proxy_url.into(),
            ..Self::default()
        }
    }

    pub fn with_direct_url(mut self, url: impl Into<String>) -> Self {
        self.direct_url = Some(url.into());
        self
    }

    pub fn with_description_url(mut self, url: impl Into<String>) -> Self {
        self.description_url = Some(url.into());
        self
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(Secret::new(token.into()));
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn direct_url(&self) -> &str {
        self.direct_url.as_deref().unwrap_or(&self.proxy_url)
    }

    pub fn description_url(&self) -> &str {
        self.description_url.as_deref().unwrap_or(&self.proxy_url)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for WebhookSettings {
    fn default() -> Self {
        Self {
            proxy_url: default_proxy_url(),
            direct_url: None,
            description_url: None,
            auth_token: None,
            user_agent: default_user_agent(),
            locale: default_locale(),
            timeout_ms: default_timeout_ms(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_proxy_url() -> String {
    DEFAULT_PROXY_URL.to_string()
}

fn default_user_agent() -> String {
    format!("nerbixa/{}", env!("CARGO_PKG_VERSION"))
}

fn default_locale() -> String {
    "en-US".to_string()
}

fn default_timeout_ms() -> u64 {
    45_000
}

fn default_max_retries() -> u32 {
    2
}

/// API proxy configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ProxySettings {
    #[serde(default)]
    pub upstream_url: Option<String>,
    #[serde(default = "default_proxy_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProxySettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            upstream_url: None,
            timeout_secs: default_proxy_timeout_secs(),
        }
    }
}

fn default_proxy_timeout_secs() -> u64 {
    30
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_webhook_defaults() {
        let settings = WebhookSettings::default();

        assert_eq!(settings.proxy_url, DEFAULT_PROXY_URL);
        assert_eq!(settings.locale, "en-US");
        assert_eq!(settings.timeout_ms, 45_000);
        assert_eq!(settings.max_retries, 2);
        assert_eq!(settings.direct_url(), DEFAULT_PROXY_URL);
        assert_eq!(settings.description_url(), DEFAULT_PROXY_URL);
    }

    #[test]
    fn test_webhook_builders() {
        let settings = WebhookSettings::new("http://proxy")
            .with_direct_url("http://upload")
            .with_description_url("http://describe")
            .with_auth_token("token-123")
            .with_timeout_ms(1_000)
            .with_max_retries(5);

        assert_eq!(settings.direct_url(), "http://upload");
        assert_eq!(settings.description_url(), "http://describe");
        assert_eq!(settings.auth_token.as_ref().unwrap().expose_secret(), "token-123");
        assert_eq!(settings.timeout(), Duration::from_secs(1));
        assert_eq!(settings.max_retries, 5);
    }

    #[test]
    fn test_auth_token_is_redacted_in_debug() {
        let settings = WebhookSettings::default().with_auth_token("super-secret");
        assert!(!format!("{:?}", settings).contains("super-secret"));
    }

    #[test]
    fn test_legacy_env_precedence() {
        let vars: HashMap<&str, &str> = [
            ("N8N_WEBHOOK_URL", "http://first"),
            ("WEBHOOK_URL", "http://second"),
            ("NEXT_PUBLIC_N8N_MASTER_NUTRITIONIST_URL", "http://nutritionist"),
            ("NEXT_PUBLIC_N8N_AUTH_TOKEN", ""),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_legacy_env(|key| vars.get(key).map(|value| value.to_string()));

        assert_eq!(config.proxy.upstream_url.as_deref(), Some("http://first"));
        assert_eq!(config.webhook.description_url(), "http://nutritionist");
        assert!(config.webhook.auth_token.is_none());
    }

    #[test]
    fn test_second_upstream_name_is_used_when_first_missing() {
        let mut config = AppConfig::default();
        config.apply_legacy_env(|key| (key == "WEBHOOK_URL").then(|| "http://second".to_string()));

        assert_eq!(config.proxy.upstream_url.as_deref(), Some("http://second"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[webhook]\nproxy_url = \"http://file-proxy\"\nmax_retries = 4\n\n[proxy]\ntimeout_secs = 5\n\n[server]\nport = 3000"
        )
        .unwrap();

        let config = AppConfig::load_from_file(file.path().to_str().unwrap()).unwrap();

        assert_eq!(config.webhook.proxy_url, "http://file-proxy");
        assert_eq!(config.webhook.max_retries, 4);
        assert_eq!(config.webhook.timeout_ms, 45_000);
        assert_eq!(config.proxy.timeout(), Duration::from_secs(5));
        assert_eq!(config.server.address(), "0.0.0.0:3000");
    }

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::default().with_port(9090);
        assert_eq!(config.address(), "0.0.0.0:9090");
    }
}
