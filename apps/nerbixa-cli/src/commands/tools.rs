//! Tools command implementation

use anyhow::Result;
use colored::Colorize;
use nerbixa_core::all_tools;

use super::{Context, FormatterKind};
use crate::output::{self, OutputFormat};

/// List the tool catalog
pub fn run(ctx: &Context) -> Result<()> {
    let tools = all_tools();

    match ctx.format {
        OutputFormat::Text => {
            for tool in &tools {
                let price = if tool.price == 0 {
                    "free".to_string()
                } else {
                    format!("{} credits", tool.price)
                };
                println!(
                    "{} {} ({}, {:?} output)",
                    tool.id.bold(),
                    tool.title,
                    price,
                    FormatterKind::for_tool(&tool.id)
                );
            }
        }
        format => println!("{}", output::format_structured(&tools, format)?),
    }
    Ok(())
}
