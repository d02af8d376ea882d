//! Upload command implementation

use anyhow::{Context as _, Result};
use nerbixa_core::{tool_or_default, FileUpload};
use std::path::Path;

use super::{spinner, webhook_failure, Context, FormatterKind};

/// MIME type for an image path, by extension.
pub fn mime_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase);

    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        _ => "application/octet-stream",
    }
}

/// Read a file from disk into an upload
pub fn load_upload(path: &Path) -> Result<FileUpload> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());

    Ok(FileUpload::new(file_name, mime_for_path(path), bytes))
}

/// Upload a food photo to a tool and print the formatted answer
pub async fn run(ctx: &Context, tool_id: &str, path: &Path, prompt: Option<&str>) -> Result<()> {
    let file = load_upload(path)?;
    let client = ctx.client()?;
    let tool = tool_or_default(tool_id);

    let progress = spinner(format!("Sending {} to {}...", file.file_name, tool.title))?;
    let result = client
        .send_multipart_with_retry(
            &file,
            tool_id,
            prompt,
            ctx.user_id.as_deref(),
            client.default_timeout(),
        )
        .await;
    progress.finish_and_clear();

    let response = result.map_err(webhook_failure)?;
    ctx.print_response(FormatterKind::for_tool(tool_id), &response)
}
