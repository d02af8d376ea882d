//! Command-line argument parsing

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "nerbixa-server",
    about = "Nerbixa generation proxy",
    version,
    long_about = "Forwards generation requests from the Nerbixa front end to the \
                  configured automation webhook and mirrors its responses."
)]
pub struct Args {
    /// Path to an optional TOML configuration file
    #[arg(short, long, env = "CONFIG_PATH")]
    pub config: Option<PathBuf>,

    /// HTTP server port, overriding the configured one
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(
        short,
        long,
        env = "LOG_LEVEL",
        default_value = "info",
        value_parser = ["trace", "debug", "info", "warn", "error"]
    )]
    pub log_level: String,

    /// Environment (dev, staging, prod)
    #[arg(
        short,
        long,
        env = "ENVIRONMENT",
        default_value = "dev",
        value_parser = ["dev", "staging", "prod"]
    )]
    pub env: String,

    /// Enable JSON log format (useful for production)
    #[arg(long, env = "JSON_LOGS")]
    pub json_logs: bool,
}

impl Args {
    /// Validate the arguments
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(path) = &self.config {
            anyhow::ensure!(path.is_file(), "config file not found: {}", path.display());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["nerbixa-server"]);
        assert!(args.port.is_none());
        assert_eq!(args.log_level, "info");
        assert!(args.config.is_none());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_port_flag() {
        let args = Args::parse_from(["nerbixa-server", "--port", "9090"]);
        assert_eq!(args.port, Some(9090));
    }

    #[test]
    fn test_missing_config_file_is_rejected() {
        let args = Args::parse_from(["nerbixa-server", "--config", "/definitely/not/here.toml"]);
        assert!(args.validate().is_err());
    }
}
