//! Translation extraction pipeline.
//!
//! Resolves the configured include/exclude patterns, partitions the matched
//! files by extension and fans the per-file extractors out in parallel.
//! Per-file extraction is side-effect-free, so ordering only matters for the
//! final record list, which follows the sorted file list.

pub mod blueprint;
pub mod php;
pub mod record;

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use rayon::prelude::*;

use crate::config::Config;
use crate::scanner;
use blueprint::{BlueprintExtractor, BlueprintRegistry, DirectoryRegistry};
pub use record::{ExtractionRecord, FieldKind, RecordContext, TranslationFunction};

pub struct Extractor {
    root: PathBuf,
    include: Vec<String>,
    exclude: Vec<String>,
    blueprint: BlueprintExtractor,
}

impl Extractor {
    pub fn new(
        root: &Path,
        include: Vec<String>,
        exclude: Vec<String>,
        registry: Box<dyn BlueprintRegistry>,
    ) -> Self {
        Self {
            root: root.to_path_buf(),
            include,
            exclude,
            blueprint: BlueprintExtractor::new(registry),
        }
    }

    pub fn from_config(config: &Config, root: &Path) -> Self {
        Self::new(
            root,
            config.include.clone(),
            config.exclude.clone(),
            Box::new(DirectoryRegistry::new(root)),
        )
    }

    /// Run a full extraction pass over the configured patterns.
    ///
    /// Fails when an include pattern's base directory is missing or when no
    /// files match at all; either error message lists every resolved pattern
    /// to aid debugging.
    pub fn extract(&self) -> Result<Vec<ExtractionRecord>> {
        let files = match scanner::find_files(&self.root, &self.include, &self.exclude) {
            Ok(files) => files,
            Err(err) => bail!("{err}\nSearched patterns:\n{}", self.pattern_list()),
        };

        if files.is_empty() {
            bail!("No files found. Searched patterns:\n{}", self.pattern_list());
        }

        Ok(files
            .par_iter()
            .flat_map_iter(|file| self.extract_one(file))
            .collect())
    }

    fn pattern_list(&self) -> String {
        self.include
            .iter()
            .map(|pattern| format!("  - {}\n", scanner::resolve_pattern(pattern, &self.root)))
            .collect()
    }

    fn extract_one(&self, file: &Path) -> Vec<ExtractionRecord> {
        match file.extension().and_then(|e| e.to_str()) {
            Some("php") => php::extract_file(file),
            Some("yml") => self.blueprint.extract_file(file),
            _ => Vec::new(),
        }
    }
}

/// Summary counters over an extraction pass.
#[derive(Debug, Default)]
pub struct ExtractionStats {
    pub total: usize,
    pub unique: usize,
    /// Occurrences per translation function name, or `blueprint`.
    pub by_type: BTreeMap<&'static str, usize>,
    pub by_file: BTreeMap<PathBuf, usize>,
}

impl ExtractionStats {
    pub fn from_records(records: &[ExtractionRecord]) -> Self {
        let mut stats = ExtractionStats {
            total: records.len(),
            unique: records
                .iter()
                .map(|r| r.key.as_str())
                .collect::<HashSet<_>>()
                .len(),
            ..Default::default()
        };

        for record in records {
            let kind = record.function.map_or("blueprint", |f| f.as_str());
            *stats.by_type.entry(kind).or_insert(0) += 1;
            *stats.by_file.entry(record.file.clone()).or_insert(0) += 1;
        }

        stats
    }
}
