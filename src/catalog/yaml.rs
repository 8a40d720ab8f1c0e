//! YAML catalog codec with comment round-tripping.
//!
//! Reading goes through serde_yaml; writing is a hand-rolled line writer so
//! that `#` section comments survive a regeneration cycle. A top-level
//! comment line opens a section that owns every following top-level key line
//! until the next comment or end of file. This is format-preserving text
//! surgery by design; callers never see the section machinery beyond
//! [`parse_sections`].

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde_yaml::Value;

use super::{Catalog, CatalogValue};

/// A `#` heading and the top-level keys it owns, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentSection {
    pub heading: String,
    pub keys: Vec<String>,
}

pub fn read(path: &Path) -> Result<Catalog> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog file: {}", path.display()))?;
    decode(&content)
}

pub fn decode(content: &str) -> Result<Catalog> {
    let value: Value = serde_yaml::from_str(content).context("Failed to parse YAML catalog")?;

    let mut catalog = Catalog::new();
    match value {
        Value::Null => {}
        Value::Mapping(map) => {
            for (key, value) in map {
                let Value::String(key) = key else {
                    bail!("Catalog keys must be strings");
                };
                catalog.insert(key, decode_value(value));
            }
        }
        _ => bail!("Catalog must be a mapping"),
    }
    Ok(catalog)
}

fn decode_value(value: Value) -> CatalogValue {
    match value {
        Value::String(s) => CatalogValue::Single(s),
        Value::Sequence(items) => CatalogValue::Plural(
            items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => s,
                    Value::Null => String::new(),
                    other => scalar_to_string(&other),
                })
                .collect(),
        ),
        Value::Null => CatalogValue::Single(String::new()),
        other => CatalogValue::Single(scalar_to_string(&other)),
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

/// Scan raw file text for comment sections and the keys they own.
pub fn parse_sections(content: &str) -> Vec<CommentSection> {
    let mut sections: Vec<CommentSection> = Vec::new();

    for line in content.lines() {
        if line.starts_with('#') {
            sections.push(CommentSection {
                heading: line.trim_end().to_string(),
                keys: Vec::new(),
            });
        } else if !line.starts_with([' ', '\t'])
            && line.contains(':')
            && let Some(section) = sections.last_mut()
        {
            let key = line.split(':').next().unwrap_or_default().trim();
            if !key.is_empty() {
                section.keys.push(key.to_string());
            }
        }
    }

    sections
}

/// Encode a catalog, re-emitting each section's heading followed by its
/// surviving keys, then any unsectioned keys as a trailing block.
pub fn encode(catalog: &Catalog, sections: &[CommentSection]) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut emitted: Vec<&str> = Vec::new();

    for section in sections {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(section.heading.clone());
        for key in &section.keys {
            if let Some(value) = catalog.get(key) {
                lines.push(format!("{key}: {}", format_value(value)));
                emitted.push(key);
            }
        }
    }

    let remaining: Vec<(&String, &CatalogValue)> = catalog
        .iter()
        .filter(|(key, _)| !emitted.contains(&key.as_str()))
        .collect();
    if !remaining.is_empty() {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        for (key, value) in remaining {
            lines.push(format!("{key}: {}", format_value(value)));
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn format_value(value: &CatalogValue) -> String {
    match value {
        CatalogValue::Single(s) => format_scalar(s),
        CatalogValue::Plural(items) => {
            let quoted: Vec<String> = items.iter().map(|s| quote(s)).collect();
            format!("[{}]", quoted.join(", "))
        }
    }
}

/// Values carrying YAML-significant characters (or nothing at all) are
/// single-quoted, with embedded quotes doubled.
fn format_scalar(value: &str) -> String {
    if value.is_empty() || value.contains([':', '#', '@', '|', '>']) {
        quote(value)
    } else {
        value.to_string()
    }
}

fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
