//! Serialization of the finished forest.

use crate::artifact::Artifact;
use crate::tree::render::render_text;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::io::Write;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Indented JSON document (`name`, `version`, `dependencies`).
    #[default]
    Json,
    /// ASCII tree for humans.
    Text,
}

/// Pretty JSON, two-space indented, with a trailing newline.
pub fn to_json(forest: &[Artifact]) -> Result<String> {
    let mut json = serde_json::to_string_pretty(forest).context("Failed to serialize tree")?;
    json.push('\n');
    Ok(json)
}

pub fn from_json(json: &str) -> Result<Vec<Artifact>> {
    serde_json::from_str(json).context("Failed to parse dependency tree document")
}

pub fn write_forest<W: Write>(
    out: &mut W,
    forest: &[Artifact],
    format: OutputFormat,
    root_label: &str,
    color: bool,
) -> Result<()> {
    let document = match format {
        OutputFormat::Json => to_json(forest)?,
        OutputFormat::Text => render_text(root_label, forest, color),
    };
    out.write_all(document.as_bytes())
        .context("Failed to write dependency tree")?;
    out.flush()?;
    Ok(())
}
