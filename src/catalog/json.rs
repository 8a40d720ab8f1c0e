//! JSON catalog codec.
//!
//! Catalogs are flat, pretty-printed objects whose values are either a
//! string or a two-element string array (singular/plural).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use super::Catalog;

pub fn read(path: &Path) -> Result<Catalog> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog file: {}", path.display()))?;
    decode(&content)
}

pub fn decode(content: &str) -> Result<Catalog> {
    serde_json::from_str(content).context("Failed to parse JSON catalog")
}

pub fn encode(catalog: &Catalog) -> Result<String> {
    let mut out = serde_json::to_string_pretty(catalog).context("Failed to encode JSON catalog")?;
    out.push('\n');
    Ok(out)
}
