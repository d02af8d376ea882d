//! Format command implementation

use anyhow::{Context as _, Result};
use std::io::Read;
use std::path::Path;

use super::{Context, FormatterKind};

/// Read the raw answer from a file, or stdin when no path is given
pub fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("Failed to read stdin")?;
            Ok(input)
        }
    }
}

/// Format a saved raw answer without calling any tool
pub fn run(ctx: &Context, kind: FormatterKind, input: Option<&Path>) -> Result<()> {
    let raw = read_input(input)?;
    let rendered = ctx.render(kind, &raw, 0)?;
    println!("{}", rendered.trim_end());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_input_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"calories": 410, "protein": 20}}"#).unwrap();

        let raw = read_input(Some(file.path())).unwrap();
        assert!(raw.contains("\"calories\": 410"));
    }
}
