//! Nerbixa CLI
//!
//! Sends prompts and food photos to the Nerbixa tools and prints the
//! formatted answers.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use colored::Colorize;
use nerbixa_formatter::nutritionist::Personality;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::commands::{Context, FormatterKind};

#[derive(Parser)]
#[command(
    name = "nerbixa",
    version,
    about = "Nerbixa - nutrition tools from the command line",
    long_about = "Ask Master Chef, Master Nutritionist or Cal Tracker a question, upload a\n\
                  food photo for analysis, or re-format a saved raw answer."
)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Proxy endpoint for JSON requests
    #[arg(long, env = "NERBIXA_PROXY_URL")]
    proxy_url: Option<String>,

    /// Endpoint for photo uploads
    #[arg(long, env = "NERBIXA_DIRECT_URL")]
    direct_url: Option<String>,

    /// Endpoint for text-only tool requests
    #[arg(long, env = "NERBIXA_DESCRIPTION_URL")]
    description_url: Option<String>,

    /// Per-attempt timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Retries after the first failed attempt
    #[arg(long)]
    retries: Option<u32>,

    /// User id sent with requests
    #[arg(short, long, env = "NERBIXA_USER_ID")]
    user: Option<String>,

    /// Output format (text, json, yaml)
    #[arg(
        short,
        long,
        default_value = "text",
        value_parser = ["text", "json", "yaml"]
    )]
    format: String,

    /// Leave emoji out of formatted answers
    #[arg(long)]
    no_emoji: bool,

    /// Dialogue tone for recipe answers (professional, friendly, playful, enthusiastic)
    #[arg(long)]
    tone: Option<Personality>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a text prompt to a tool
    Ask {
        /// Tool id (master-chef, master-nutritionist, cal-tracker)
        tool: String,

        /// The question or description to send
        prompt: String,
    },

    /// Upload a food photo to a tool
    Upload {
        /// Tool id (master-chef, master-nutritionist, cal-tracker)
        tool: String,

        /// Image file to upload
        file: PathBuf,

        /// Prompt sent with the image
        #[arg(short, long)]
        prompt: Option<String>,
    },

    /// Format a saved raw answer without calling any tool
    Format {
        /// Formatter to apply
        #[arg(value_enum)]
        formatter: FormatterKind,

        /// File holding the raw answer (stdin when omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// List the available tools
    Tools,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let result = run(&cli).await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            if cli.verbose {
                if let Some(source) = e.source() {
                    eprintln!("{}: {}", "Caused by".yellow(), source);
                }
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let ctx = Context::from_cli(cli)?;

    match &cli.command {
        Commands::Ask { tool, prompt } => commands::ask::run(&ctx, tool, prompt).await,
        Commands::Upload { tool, file, prompt } => {
            commands::upload::run(&ctx, tool, file, prompt.as_deref()).await
        }
        Commands::Format { formatter, input } => {
            commands::format::run(&ctx, *formatter, input.as_deref())
        }
        Commands::Tools => commands::tools::run(&ctx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert()
    }

    #[test]
    fn test_parse_upload() {
        let cli = Cli::parse_from([
            "nerbixa",
            "--no-emoji",
            "--format",
            "json",
            "upload",
            "cal-tracker",
            "meal.jpg",
            "--prompt",
            "How many calories?",
        ]);

        assert!(cli.no_emoji);
        assert_eq!(cli.format, "json");
        match cli.command {
            Commands::Upload { tool, file, prompt } => {
                assert_eq!(tool, "cal-tracker");
                assert_eq!(file, PathBuf::from("meal.jpg"));
                assert_eq!(prompt.as_deref(), Some("How many calories?"));
            }
            _ => panic!("expected upload command"),
        }
    }

    #[test]
    fn test_parse_tone() {
        let cli = Cli::parse_from(["nerbixa", "--tone", "playful", "tools"]);
        assert_eq!(cli.tone, Some(Personality::Playful));
    }
}
