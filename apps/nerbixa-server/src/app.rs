//! Application state and initialization

use anyhow::{Context, Result};
use tracing::{info, warn};

use nerbixa_core::AppConfig;
use nerbixa_server::ProxyState;

use crate::cli::Args;
use crate::server::Server;

/// Main application
pub struct App {
    config: AppConfig,
    state: ProxyState,
}

impl App {
    /// Load configuration and build the proxy state
    pub fn build(args: Args) -> Result<Self> {
        args.validate().context("Invalid command line arguments")?;

        let mut config = match &args.config {
            Some(path) => AppConfig::load_from_file(&path.to_string_lossy())
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => AppConfig::load().context("Failed to load configuration")?,
        };
        apply_port_override(&mut config, &args);

        let state = ProxyState::from_settings(&config.proxy).context("Failed to build HTTP client")?;
        match state.upstream_url() {
            Some(_) => info!(timeout_secs = config.proxy.timeout_secs, "Upstream webhook configured"),
            None => warn!("No upstream webhook URL configured, generation requests will fail"),
        }

        Ok(Self { config, state })
    }

    /// Run the application
    pub async fn run(self) -> Result<()> {
        let server = Server::new(self.config.server, self.state);
        server.run().await
    }
}

/// The configured port wins unless `--port`/`PORT` was given.
fn apply_port_override(config: &mut AppConfig, args: &Args) {
    if let Some(port) = args.port {
        config.server.port = port;
    }
}
