//! Ask command implementation

use anyhow::Result;
use nerbixa_core::tool_or_default;

use super::{spinner, webhook_failure, Context, FormatterKind};

/// Send a text prompt to a tool and print the formatted answer
pub async fn run(ctx: &Context, tool_id: &str, prompt: &str) -> Result<()> {
    let client = ctx.client()?;
    let tool = tool_or_default(tool_id);

    let progress = spinner(format!("Asking {}...", tool.title))?;
    let result = client
        .send_description_with_retry(
            prompt,
            tool_id,
            ctx.user_id.as_deref(),
            client.default_timeout(),
        )
        .await;
    progress.finish_and_clear();

    let response = result.map_err(webhook_failure)?;
    ctx.print_response(FormatterKind::for_tool(tool_id), &response)
}
