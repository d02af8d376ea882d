//! CLI command implementations

pub mod ask;
pub mod format;
pub mod tools;
pub mod upload;

use anyhow::Context as _;
use clap::ValueEnum;
use indicatif::{ProgressBar, ProgressStyle};
use nerbixa_core::{AppConfig, WebhookError, WebhookResponse, WebhookSettings};
use nerbixa_formatter::cal_tracker::CalTrackerToneUpdate;
use nerbixa_formatter::friendly::ToneUpdate;
use nerbixa_formatter::nutritionist::{DialogueToneConfig, DialogueToneUpdate, Personality};
use nerbixa_formatter::{
    CalTrackerResponseFormatter, FriendlyResponseFormatter, NutritionistResponseFormatter,
    ResponseFormatter,
};
use nerbixa_webhook::WebhookClient;
use std::time::Duration;

use crate::output::{self, OutputFormat};
use crate::Cli;

/// Which formatter turns a raw answer into output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatterKind {
    /// Conversational advice (Master Nutritionist)
    Friendly,
    /// Calorie and macro breakdown (Cal Tracker)
    CalTracker,
    /// Recipe documents, legacy or v2 (Master Chef)
    Nutritionist,
}

impl FormatterKind {
    /// Formatter used for a tool's answers. Unknown tools get conversational output.
    pub fn for_tool(tool_id: &str) -> Self {
        match tool_id {
            "master-chef" => FormatterKind::Nutritionist,
            "cal-tracker" => FormatterKind::CalTracker,
            _ => FormatterKind::Friendly,
        }
    }
}

/// Settings shared by every command
#[derive(Debug, Clone)]
pub struct Context {
    pub settings: WebhookSettings,
    pub user_id: Option<String>,
    pub format: OutputFormat,
    pub use_emojis: bool,
    pub tone: Option<Personality>,
    pub verbose: bool,
}

impl Context {
    pub fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
        let config = match &cli.config {
            Some(path) => {
                let path = path.to_string_lossy();
                AppConfig::load_from_file(&path)
                    .with_context(|| format!("Failed to load configuration from {}", path))?
            }
            None => AppConfig::load().context("Failed to load configuration")?,
        };

        let mut settings = config.webhook;
        if let Some(url) = &cli.proxy_url {
            settings.proxy_url = url.clone();
        }
        if let Some(url) = &cli.direct_url {
            settings = settings.with_direct_url(url.clone());
        }
        if let Some(url) = &cli.description_url {
            settings = settings.with_description_url(url.clone());
        }
        if let Some(timeout_ms) = cli.timeout_ms {
            settings = settings.with_timeout_ms(timeout_ms);
        }
        if let Some(retries) = cli.retries {
            settings = settings.with_max_retries(retries);
        }

        Ok(Self {
            settings,
            user_id: cli.user.clone(),
            format: cli.format.parse().map_err(anyhow::Error::msg)?,
            use_emojis: !cli.no_emoji,
            tone: cli.tone,
            verbose: cli.verbose,
        })
    }

    pub fn client(&self) -> anyhow::Result<WebhookClient> {
        WebhookClient::new(self.settings.clone()).context("Failed to create webhook client")
    }

    /// Format a raw answer with the chosen formatter and output format.
    pub fn render(
        &self,
        kind: FormatterKind,
        raw: &str,
        processing_time_ms: u64,
    ) -> anyhow::Result<String> {
        match kind {
            FormatterKind::Friendly => {
                let mut formatter = FriendlyResponseFormatter::default();
                formatter.update_tone(ToneUpdate {
                    use_emojis: Some(self.use_emojis),
                    ..Default::default()
                });
                let response = formatter.format_response(raw);
                match self.format {
                    OutputFormat::Text => Ok(output::render_friendly(&response)),
                    format => output::format_structured(&response, format),
                }
            }
            FormatterKind::CalTracker => {
                let mut formatter = CalTrackerResponseFormatter::default();
                formatter.update_tone(CalTrackerToneUpdate {
                    use_emojis: Some(self.use_emojis),
                    ..Default::default()
                });
                let response = formatter.format_response(raw);
                match self.format {
                    OutputFormat::Text => {
                        Ok(output::render_cal_tracker(&response, self.use_emojis))
                    }
                    format => output::format_structured(&response, format),
                }
            }
            FormatterKind::Nutritionist => {
                let tone = self
                    .tone
                    .map(DialogueToneConfig::preset)
                    .unwrap_or_default();
                let mut formatter = NutritionistResponseFormatter::new(tone);
                formatter.update_tone(DialogueToneUpdate {
                    use_emojis: Some(self.use_emojis),
                    ..Default::default()
                });
                let parsed = formatter.parse_response(raw, processing_time_ms as f64);
                match self.format {
                    OutputFormat::Text => Ok(output::render_nutritionist(&parsed)),
                    format => output::format_structured(&parsed, format),
                }
            }
        }
    }

    /// Print a tool answer, with timing details in verbose text mode.
    pub fn print_response(&self, kind: FormatterKind, response: &WebhookResponse) -> anyhow::Result<()> {
        let rendered = self.render(kind, &response.response, response.processing_time)?;
        println!("{}", rendered.trim_end());

        if self.verbose && self.format == OutputFormat::Text {
            let mut details = format!(
                "[processed in {}]",
                output::format_duration(response.processing_time)
            );
            if let Some(tokens) = response.tokens {
                details = format!("{} [{} tokens]", details, tokens);
            }
            output::dimmed(&details);
        }
        Ok(())
    }
}

/// Create the waiting spinner shown during a tool call
pub fn spinner(message: String) -> anyhow::Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")?,
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(80));
    Ok(spinner)
}

/// Surface a failed call with its user-facing message; the full error stays as the cause.
pub fn webhook_failure(error: WebhookError) -> anyhow::Error {
    if error.is_upsell() {
        output::error("This tool needs an upgraded plan.");
    }
    let message = error.user_message();
    anyhow::Error::new(error).context(message)
}
