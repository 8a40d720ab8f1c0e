//! Catalog reconciliation.
//!
//! Groups extraction records by key, scaffolds per-language catalog entries,
//! merges them into the on-disk catalogs (additively or destructively) and
//! reports missing/unused keys. The read-merge-write cycle for one language
//! is the unit of atomicity: new content goes to a temporary sibling file
//! and is renamed into place.

pub mod json;
pub mod yaml;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::{Config, OutputFormat};
use crate::extract::{ExtractionRecord, TranslationFunction};

/// One catalog entry value: a plain string, or a singular/plural pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CatalogValue {
    Single(String),
    Plural(Vec<String>),
}

impl CatalogValue {
    /// The emptiness predicate shared by missing detection and clean-mode
    /// merging: an empty string, or a pair whose elements are all empty.
    pub fn is_empty(&self) -> bool {
        match self {
            CatalogValue::Single(s) => s.is_empty(),
            CatalogValue::Plural(items) => items.iter().all(|s| s.is_empty()),
        }
    }
}

/// Catalogs are persisted in ascending key order; a sorted map keeps that
/// invariant by construction.
pub type Catalog = BTreeMap<String, CatalogValue>;

/// Where a grouped key was seen.
#[derive(Debug, Clone)]
pub struct Occurrence {
    pub file: PathBuf,
    pub line: Option<usize>,
    pub function: Option<TranslationFunction>,
    pub field_path: Option<String>,
}

/// All extraction records sharing one string key.
#[derive(Debug, Clone)]
pub struct GroupedKey {
    pub key: String,
    /// Union of the plural flags across all occurrences.
    pub plural: bool,
    pub occurrences: Vec<Occurrence>,
}

pub fn group_by_key(records: &[ExtractionRecord]) -> BTreeMap<String, GroupedKey> {
    let mut grouped: BTreeMap<String, GroupedKey> = BTreeMap::new();

    for record in records {
        let entry = grouped
            .entry(record.key.clone())
            .or_insert_with(|| GroupedKey {
                key: record.key.clone(),
                plural: false,
                occurrences: Vec::new(),
            });
        entry.plural |= record.context.plural;
        entry.occurrences.push(Occurrence {
            file: record.file.clone(),
            line: record.line,
            function: record.function,
            field_path: record.field_path.clone(),
        });
    }

    grouped
}

pub struct TranslationManager {
    output_path: PathBuf,
    format: OutputFormat,
    source_language: Option<String>,
    languages: Vec<String>,
}

impl TranslationManager {
    pub fn new(
        output_path: PathBuf,
        format: OutputFormat,
        source_language: Option<String>,
        languages: Vec<String>,
    ) -> Self {
        Self {
            output_path,
            format,
            source_language,
            languages,
        }
    }

    pub fn from_config(config: &Config, root: &Path) -> Self {
        let output_path = if Path::new(&config.output_path).is_absolute() {
            PathBuf::from(&config.output_path)
        } else {
            root.join(&config.output_path)
        };
        Self::new(
            output_path,
            config.output_format,
            config.source_language.clone(),
            config.languages.clone(),
        )
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_path
    }

    pub fn catalog_path(&self, language: &str) -> PathBuf {
        self.output_path
            .join(format!("{language}.{}", self.format.extension()))
    }

    /// Load a language's on-disk catalog; missing or unreadable files count
    /// as empty.
    pub fn load_existing(&self, language: &str) -> Catalog {
        let path = self.catalog_path(language);
        if !path.exists() {
            return Catalog::new();
        }
        let result = match self.format {
            OutputFormat::Json => json::read(&path),
            OutputFormat::Yaml => yaml::read(&path),
        };
        result.unwrap_or_default()
    }

    /// Scaffold catalog entries for one language: plural keys become a
    /// singular/plural pair, the source language is seeded with the key
    /// itself, every other language starts empty.
    pub fn build_for_language(
        &self,
        grouped: &BTreeMap<String, GroupedKey>,
        language: &str,
    ) -> Catalog {
        let is_source = self.source_language.as_deref() == Some(language);

        grouped
            .values()
            .map(|group| {
                let value = if group.plural {
                    let plural = if is_source { group.key.clone() } else { String::new() };
                    CatalogValue::Plural(vec![String::new(), plural])
                } else {
                    let single = if is_source { group.key.clone() } else { String::new() };
                    CatalogValue::Single(single)
                };
                (group.key.clone(), value)
            })
            .collect()
    }

    /// Additive generation: scaffolded entries fill gaps, existing values
    /// (even empty ones) are never overwritten.
    pub fn generate(&self, records: &[ExtractionRecord]) -> Result<Vec<(String, PathBuf)>> {
        let grouped = group_by_key(records);
        let mut generated = Vec::new();

        for language in &self.languages {
            let mut catalog = self.load_existing(language);
            for (key, value) in self.build_for_language(&grouped, language) {
                catalog.entry(key).or_insert(value);
            }
            generated.push((language.clone(), self.save(language, &catalog)?));
        }

        Ok(generated)
    }

    /// Clean generation: the resulting key set is exactly the extracted key
    /// set; existing non-empty values survive, everything else is
    /// re-scaffolded.
    pub fn generate_clean(&self, records: &[ExtractionRecord]) -> Result<Vec<(String, PathBuf)>> {
        let grouped = group_by_key(records);
        let mut generated = Vec::new();

        for language in &self.languages {
            let existing = self.load_existing(language);
            let catalog: Catalog = self
                .build_for_language(&grouped, language)
                .into_iter()
                .map(|(key, scaffold)| {
                    let value = match existing.get(&key) {
                        Some(value) if !value.is_empty() => value.clone(),
                        _ => scaffold,
                    };
                    (key, value)
                })
                .collect();
            generated.push((language.clone(), self.save(language, &catalog)?));
        }

        Ok(generated)
    }

    /// Per-language keys that are absent, empty, or all-empty pairs.
    pub fn missing(&self, records: &[ExtractionRecord]) -> BTreeMap<String, Vec<String>> {
        let grouped = group_by_key(records);
        let mut missing = BTreeMap::new();

        for language in &self.languages {
            let catalog = self.load_existing(language);
            let keys: Vec<String> = grouped
                .keys()
                .filter(|key| catalog.get(*key).is_none_or(CatalogValue::is_empty))
                .cloned()
                .collect();
            if !keys.is_empty() {
                missing.insert(language.clone(), keys);
            }
        }

        missing
    }

    /// Per-language catalog keys no longer present in the extraction set.
    pub fn unused(&self, records: &[ExtractionRecord]) -> BTreeMap<String, Vec<String>> {
        let grouped = group_by_key(records);
        let mut unused = BTreeMap::new();

        for language in &self.languages {
            let catalog = self.load_existing(language);
            let keys: Vec<String> = catalog
                .keys()
                .filter(|key| !grouped.contains_key(*key))
                .cloned()
                .collect();
            if !keys.is_empty() {
                unused.insert(language.clone(), keys);
            }
        }

        unused
    }

    fn save(&self, language: &str, catalog: &Catalog) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_path).with_context(|| {
            format!("Failed to create output directory: {}", self.output_path.display())
        })?;

        let path = self.catalog_path(language);
        let content = match self.format {
            OutputFormat::Json => json::encode(catalog)?,
            OutputFormat::Yaml => {
                // Preserve comment sections from the previous file, if any.
                let sections = fs::read_to_string(&path)
                    .map(|raw| yaml::parse_sections(&raw))
                    .unwrap_or_default();
                yaml::encode(catalog, &sections)
            }
        };

        write_atomic(&path, &content)?;
        Ok(path)
    }
}

/// Write via a temporary sibling and rename, so no partial catalog is ever
/// observable.
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, content)
        .with_context(|| format!("Failed to write catalog file: {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("Failed to move catalog file into place: {}", path.display()))?;
    Ok(())
}
