//! Key migration.
//!
//! Rewrites translation call sites in PHP files and translatable field
//! values in blueprints, replacing any old key found in the migration map
//! with its new key while leaving every other byte untouched. Preview mode
//! runs the identical matching logic without mutating files.
//!
//! Blueprint rewriting is line-oriented text surgery rather than a decode/
//! re-encode cycle, so formatting and comments survive. The trade-off is a
//! quasi-parse of `field: value` lines; it stays contained in this module.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;

use crate::catalog::{Catalog, CatalogValue, json, yaml};
use crate::extract::blueprint::TRANSLATABLE_FIELDS;
use crate::scanner;

pub type MigrationMap = BTreeMap<String, String>;

/// Source patterns for migration. Broader than the extraction defaults:
/// plugin and config scripts also carry translation calls.
pub const SOURCE_PATTERNS: &[&str] = &[
    "site/templates/**/*.php",
    "site/snippets/**/*.php",
    "site/models/**/*.php",
    "site/plugins/**/*.php",
    "site/config/**/*.php",
];

pub const BLUEPRINT_PATTERNS: &[&str] = &["site/blueprints/**/*.yml"];

#[derive(Debug, Default)]
pub struct AffectedFiles {
    pub source: Vec<PathBuf>,
    pub blueprints: Vec<PathBuf>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct MigrationOutcome {
    /// Source files actually modified.
    pub source_files: usize,
    /// Blueprint files actually modified.
    pub blueprint_files: usize,
    pub replacements: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewChange {
    /// 1-based line number.
    pub line: usize,
    pub old: String,
    pub new: String,
}

#[derive(Debug)]
pub struct FileChanges {
    pub file: PathBuf,
    pub changes: Vec<PreviewChange>,
}

/// Build the old-key → new-key map from the source language's catalog:
/// every dotted key paired with its non-empty string value.
pub fn build_migration_map(
    catalog_dir: &Path,
    languages: &[String],
    source_language: &str,
) -> MigrationMap {
    let mut map = MigrationMap::new();

    for language in languages {
        if language != source_language {
            continue;
        }
        for (key, value) in read_catalog(catalog_dir, language) {
            if !key.contains('.') {
                continue;
            }
            if let CatalogValue::Single(new_key) = value
                && !new_key.is_empty()
            {
                map.insert(key, new_key);
            }
        }
    }

    map
}

fn owned(patterns: &[&str]) -> Vec<String> {
    patterns.iter().map(|p| p.to_string()).collect()
}

fn read_catalog(catalog_dir: &Path, language: &str) -> Catalog {
    let yml = catalog_dir.join(format!("{language}.yml"));
    if yml.exists() {
        return yaml::read(&yml).unwrap_or_default();
    }
    let json_path = catalog_dir.join(format!("{language}.json"));
    if json_path.exists() {
        return json::read(&json_path).unwrap_or_default();
    }
    Catalog::new()
}

pub struct Migrator {
    map: MigrationMap,
    call: Regex,
    field_line: Regex,
    double_quoted: Regex,
    single_quoted: Regex,
    unquoted: Regex,
}

impl Migrator {
    pub fn new(map: MigrationMap) -> Self {
        let fields = TRANSLATABLE_FIELDS
            .iter()
            .copied()
            .chain(["*"])
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join("|");

        Self {
            map,
            call: Regex::new(r#"\b(t|tc|tt)\s*\(\s*(?:"([^'"]+)"|'([^'"]+)')"#)
                .expect("call pattern"),
            field_line: Regex::new(&format!(r"(?i)^(\s*(?:{fields})\s*:\s*)(.*)$"))
                .expect("field line pattern"),
            double_quoted: Regex::new(r#"^"([^"]*)"(.*)$"#).expect("double quote pattern"),
            single_quoted: Regex::new(r"^'([^']*)'(.*)$").expect("single quote pattern"),
            unquoted: Regex::new(r"^([^#\n]+?)(\s*#.*)?$").expect("unquoted pattern"),
        }
    }

    /// Find the files a migration run would touch. Missing directories are
    /// skipped silently, unlike extraction's strict discovery.
    pub fn find_affected_files(&self, root: &Path, exclude: &[String]) -> AffectedFiles {
        AffectedFiles {
            source: scanner::find_files_lenient(root, &owned(SOURCE_PATTERNS), exclude),
            blueprints: scanner::find_files_lenient(root, &owned(BLUEPRINT_PATTERNS), exclude),
        }
    }

    /// Rewrite the affected files in place. A file is written back only when
    /// at least one replacement occurred in it.
    pub fn migrate(&self, files: &AffectedFiles) -> Result<MigrationOutcome> {
        let mut outcome = MigrationOutcome::default();

        for file in &files.source {
            let count = self.migrate_file(file, |content| self.rewrite_source(content))?;
            if count > 0 {
                outcome.source_files += 1;
                outcome.replacements += count;
            }
        }
        for file in &files.blueprints {
            let count = self.migrate_file(file, |content| self.rewrite_blueprint(content))?;
            if count > 0 {
                outcome.blueprint_files += 1;
                outcome.replacements += count;
            }
        }

        Ok(outcome)
    }

    fn migrate_file(
        &self,
        path: &Path,
        rewrite: impl Fn(&str) -> (String, usize),
    ) -> Result<usize> {
        let Ok(content) = fs::read_to_string(path) else {
            return Ok(0);
        };
        let (new_content, count) = rewrite(&content);
        if count > 0 {
            fs::write(path, new_content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        Ok(count)
    }

    /// Identical matching to [`migrate`](Self::migrate), without mutation.
    pub fn preview(&self, files: &AffectedFiles) -> Vec<FileChanges> {
        let mut all = Vec::new();

        for file in &files.source {
            let Ok(content) = fs::read_to_string(file) else {
                continue;
            };
            let changes = self.preview_source(&content);
            if !changes.is_empty() {
                all.push(FileChanges {
                    file: file.clone(),
                    changes,
                });
            }
        }
        for file in &files.blueprints {
            let Ok(content) = fs::read_to_string(file) else {
                continue;
            };
            let changes = self.preview_blueprint(&content);
            if !changes.is_empty() {
                all.push(FileChanges {
                    file: file.clone(),
                    changes,
                });
            }
        }

        all
    }

    /// Replace mapped keys in `t`/`tc`/`tt` call sites, splicing the new key
    /// into the original text so spacing and quote style survive.
    fn rewrite_source(&self, content: &str) -> (String, usize) {
        let mut out = String::with_capacity(content.len());
        let mut last = 0;
        let mut count = 0;

        for captures in self.call.captures_iter(content) {
            let Some(key) = captures.get(2).or_else(|| captures.get(3)) else {
                continue;
            };
            if let Some(new_key) = self.map.get(key.as_str()) {
                out.push_str(&content[last..key.start()]);
                out.push_str(new_key);
                last = key.end();
                count += 1;
            }
        }
        out.push_str(&content[last..]);

        (out, count)
    }

    fn preview_source(&self, content: &str) -> Vec<PreviewChange> {
        let mut changes = Vec::new();

        for (index, line) in content.lines().enumerate() {
            for captures in self.call.captures_iter(line) {
                let Some(key) = captures.get(2).or_else(|| captures.get(3)) else {
                    continue;
                };
                let Some(new_key) = self.map.get(key.as_str()) else {
                    continue;
                };
                let whole = captures.get(0).map(|m| m.range()).unwrap_or_default();
                changes.push(PreviewChange {
                    line: index + 1,
                    old: line[whole.clone()].to_string(),
                    new: format!(
                        "{}{}{}",
                        &line[whole.start..key.start()],
                        new_key,
                        &line[key.end()..whole.end]
                    ),
                });
            }
        }

        changes
    }

    fn rewrite_blueprint(&self, content: &str) -> (String, usize) {
        let mut count = 0;
        let lines: Vec<String> = content
            .split('\n')
            .map(|line| match self.rewrite_line(line) {
                Some(new_line) => {
                    count += 1;
                    new_line
                }
                None => line.to_string(),
            })
            .collect();

        (lines.join("\n"), count)
    }

    fn preview_blueprint(&self, content: &str) -> Vec<PreviewChange> {
        content
            .split('\n')
            .enumerate()
            .filter_map(|(index, line)| {
                self.rewrite_line(line).map(|new_line| PreviewChange {
                    line: index + 1,
                    old: line.trim().to_string(),
                    new: new_line.trim().to_string(),
                })
            })
            .collect()
    }

    /// Rewrite one blueprint line, or `None` when it does not change.
    fn rewrite_line(&self, line: &str) -> Option<String> {
        let (body, line_ending) = match line.strip_suffix('\r') {
            Some(body) => (body, "\r"),
            None => (line, ""),
        };

        let captures = self.field_line.captures(body)?;
        let prefix = &captures[1];
        let new_value_part = self.rewrite_value_part(&captures[2])?;

        Some(format!("{prefix}{new_value_part}{line_ending}"))
    }

    /// The three quoting shapes, mutually exclusive and tried in order.
    fn rewrite_value_part(&self, value_part: &str) -> Option<String> {
        if let Some(captures) = self.double_quoted.captures(value_part) {
            let new_value = self.rewrite_value(&captures[1])?;
            return Some(format!("\"{new_value}\"{}", &captures[2]));
        }

        if let Some(captures) = self.single_quoted.captures(value_part) {
            let new_value = self.rewrite_value(&captures[1])?;
            return Some(format!("'{new_value}'{}", &captures[2]));
        }

        if let Some(captures) = self.unquoted.captures(value_part) {
            let value = captures[1].trim();
            let comment = captures.get(2).map(|m| m.as_str()).unwrap_or_default();
            let new_value = self.rewrite_value(value)?;
            return Some(format!("{new_value}{comment}"));
        }

        None
    }

    /// Rewrite a field value: translation calls inside an embedded
    /// expression, or the whole value when it is itself a mapped key.
    fn rewrite_value(&self, value: &str) -> Option<String> {
        if value.contains("{{") && value.contains("}}") {
            let (new_value, count) = self.rewrite_source(value);
            return (count > 0).then_some(new_value);
        }
        self.map.get(value).cloned()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;

    fn migrator(pairs: &[(&str, &str)]) -> Migrator {
        Migrator::new(
            pairs
                .iter()
                .map(|(old, new)| (old.to_string(), new.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_rewrite_source_replaces_mapped_key() {
        let m = migrator(&[("Content", "Inhalt")]);

        let (out, count) = m.rewrite_source("<?php echo t(\"Content\"); ?>");

        assert_eq!(out, "<?php echo t(\"Inhalt\"); ?>");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_rewrite_source_preserves_quote_style_and_spacing() {
        let m = migrator(&[("a.b", "New")]);

        let (out, count) = m.rewrite_source("t ( 'a.b' , $x); tc('a.b', 2);");

        assert_eq!(out, "t ( 'New' , $x); tc('New', 2);");
        assert_eq!(count, 2);
    }

    #[test]
    fn test_rewrite_source_leaves_unmapped_keys() {
        let m = migrator(&[("Content", "Inhalt")]);

        let (out, count) = m.rewrite_source("t('Other'); translate('Content');");

        assert_eq!(out, "t('Other'); translate('Content');");
        assert_eq!(count, 0);
    }

    #[test]
    fn test_rewrite_source_is_idempotent() {
        let m = migrator(&[("site.title", "Site Title")]);

        let (first, count) = m.rewrite_source("<?= t('site.title') ?>");
        assert_eq!(count, 1);

        let (second, count) = m.rewrite_source(&first);
        assert_eq!(count, 0);
        assert_eq!(second, first);
    }

    #[test]
    fn test_blueprint_double_quoted_value() {
        let m = migrator(&[("page.title", "Page Title")]);

        let (out, count) = m.rewrite_blueprint("fields:\n  title:\n    label: \"page.title\"\n");

        assert_eq!(out, "fields:\n  title:\n    label: \"Page Title\"\n");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_blueprint_single_quoted_value() {
        let m = migrator(&[("page.title", "Page Title")]);

        let (out, count) = m.rewrite_blueprint("label: 'page.title'\n");

        assert_eq!(out, "label: 'Page Title'\n");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_blueprint_unquoted_value_keeps_trailing_comment() {
        let m = migrator(&[("page.title", "Page Title")]);

        let (out, count) = m.rewrite_blueprint("label: page.title  # main label\n");

        assert_eq!(out, "label: Page Title  # main label\n");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_blueprint_expression_value() {
        let m = migrator(&[("Old", "New")]);

        let (out, count) = m.rewrite_blueprint("label: '{{ t(\"Old\") }}'\n");

        assert_eq!(out, "label: '{{ t(\"New\") }}'\n");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_blueprint_expression_without_mapped_key_is_untouched() {
        let m = migrator(&[("Old", "New")]);
        let content = "label: '{{ t(\"Other\") }}'\n";

        let (out, count) = m.rewrite_blueprint(content);

        assert_eq!(out, content);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_blueprint_field_match_is_case_insensitive() {
        let m = migrator(&[("a.b", "AB")]);

        let (out, count) = m.rewrite_blueprint("Label: a.b\n");

        assert_eq!(out, "Label: AB\n");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_blueprint_star_field() {
        let m = migrator(&[("nav.home", "Home")]);

        let (out, count) = m.rewrite_blueprint("*: nav.home\n");
        assert_eq!(out, "*: Home\n");
        assert_eq!(count, 1);

        // A quoted `'*'` key does not match the plain field pattern
        let (out, count) = m.rewrite_blueprint("'*': nav.home\n");
        assert_eq!(out, "'*': nav.home\n");
        assert_eq!(count, 0);
    }

    #[test]
    fn test_blueprint_non_translatable_field_is_untouched() {
        let m = migrator(&[("a.b", "AB")]);
        let content = "type: a.b\nwidth: a.b\n";

        let (out, count) = m.rewrite_blueprint(content);

        assert_eq!(out, content);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_blueprint_preserves_unmodified_lines_verbatim() {
        let m = migrator(&[("a.b", "AB")]);
        let content = "# comment\r\nfields:\r\n  x:\r\n    label: a.b\r\n";

        let (out, count) = m.rewrite_blueprint(content);

        assert_eq!(out, "# comment\r\nfields:\r\n  x:\r\n    label: AB\r\n");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_value_with_hash_is_treated_as_comment_boundary() {
        // Known edge: an unquoted value legitimately containing `#` is split
        // at the `#`, so the remainder survives as a "comment".
        let m = migrator(&[("a.b", "Rank #1")]);

        let (out, _) = m.rewrite_blueprint("label: a.b\n");
        assert_eq!(out, "label: Rank #1\n");

        let (out, count) = m.rewrite_blueprint(&out);
        assert_eq!(count, 0);
        assert_eq!(out, "label: Rank #1\n");
    }

    #[test]
    fn test_preview_source_reports_line_and_snippets() {
        let m = migrator(&[("Content", "Inhalt")]);

        let changes = m.preview_source("<?php\necho t('Content');\n");

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].line, 2);
        assert_eq!(changes[0].old, "t('Content'");
        assert_eq!(changes[0].new, "t('Inhalt'");
    }

    #[test]
    fn test_preview_blueprint_reports_trimmed_lines() {
        let m = migrator(&[("page.title", "Page Title")]);

        let changes = m.preview_blueprint("fields:\n  title:\n    label: page.title\n");

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].line, 3);
        assert_eq!(changes[0].old, "label: page.title");
        assert_eq!(changes[0].new, "label: Page Title");
    }

    #[test]
    fn test_migrate_writes_only_changed_files() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let templates = root.join("site/templates");
        fs::create_dir_all(&templates).unwrap();
        fs::write(templates.join("a.php"), "<?php echo t('old.key');").unwrap();
        fs::write(templates.join("b.php"), "<?php echo t('other');").unwrap();

        let m = migrator(&[("old.key", "New Key")]);
        let files = m.find_affected_files(root, &[]);
        let outcome = m.migrate(&files).unwrap();

        assert_eq!(outcome.source_files, 1);
        assert_eq!(outcome.blueprint_files, 0);
        assert_eq!(outcome.replacements, 1);
        assert_eq!(
            fs::read_to_string(templates.join("a.php")).unwrap(),
            "<?php echo t('New Key');"
        );
        assert_eq!(
            fs::read_to_string(templates.join("b.php")).unwrap(),
            "<?php echo t('other');"
        );
    }

    #[test]
    fn test_migrate_twice_is_a_no_op() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let blueprints = root.join("site/blueprints");
        fs::create_dir_all(&blueprints).unwrap();
        fs::write(blueprints.join("page.yml"), "title: a.b\n").unwrap();

        let m = migrator(&[("a.b", "AB")]);
        let files = m.find_affected_files(root, &[]);

        let first = m.migrate(&files).unwrap();
        assert_eq!(first.replacements, 1);

        let second = m.migrate(&files).unwrap();
        assert_eq!(second, MigrationOutcome::default());
    }

    #[test]
    fn test_find_affected_files_is_lenient() {
        let dir = tempdir().unwrap();

        let m = migrator(&[]);
        let files = m.find_affected_files(dir.path(), &[]);

        assert!(files.source.is_empty());
        assert!(files.blueprints.is_empty());
    }

    #[test]
    fn test_build_migration_map_prefers_yaml_and_skips_undotted_keys() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("en.yml"),
            "site.title: Site Title\nplain: Ignored\nempty.key: ''\n",
        )
        .unwrap();
        fs::write(dir.path().join("en.json"), r#"{"from.json": "nope"}"#).unwrap();

        let map = build_migration_map(dir.path(), &["en".into(), "de".into()], "en");

        assert_eq!(map.len(), 1);
        assert_eq!(map.get("site.title").map(String::as_str), Some("Site Title"));
    }

    #[test]
    fn test_build_migration_map_falls_back_to_json() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("en.json"), r#"{"site.title": "Site Title"}"#).unwrap();

        let map = build_migration_map(dir.path(), &["en".into()], "en");

        assert_eq!(map.get("site.title").map(String::as_str), Some("Site Title"));
    }
}
