//! Blueprint extraction.
//!
//! Walks a decoded blueprint tree and collects the values of translatable
//! fields, plus the special `*` key used for per-language default variables.
//! Scalar values may embed `{{ ... }}` query expressions; when such an
//! expression calls one of the translation helpers, the quoted arguments are
//! extracted instead of the raw value.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex};

use regex::Regex;
use serde_yaml::Value;

use super::record::{ExtractionRecord, FieldKind, RecordContext};

/// Field names whose string values are user-facing text.
pub const TRANSLATABLE_FIELDS: &[&str] = &[
    "label",
    "title",
    "help",
    "placeholder",
    "empty",
    "info",
    "text",
    "description",
    "confirm",
];

static TRANSLATION_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:t|tc|tt)\s*\(").expect("translation call pattern"));

static QUOTED_ARGUMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(?:t|tc|tt)\s*\(\s*(?:"((?:[^"\\]|\\.)*)"|'((?:[^'\\]|\\.)*)')"#)
        .expect("quoted argument pattern")
});

/// Lookup for values that name another blueprint (`extends: fields/date`).
/// Those are references, not translatable text.
pub trait BlueprintRegistry: Send + Sync {
    fn contains(&self, name: &str) -> bool;
}

/// Registry backed by the project's blueprint directory.
pub struct DirectoryRegistry {
    blueprints_dir: PathBuf,
}

impl DirectoryRegistry {
    pub fn new(root: &Path) -> Self {
        Self {
            blueprints_dir: root.join("site").join("blueprints"),
        }
    }
}

impl BlueprintRegistry for DirectoryRegistry {
    fn contains(&self, name: &str) -> bool {
        !name.contains("..") && self.blueprints_dir.join(format!("{name}.yml")).is_file()
    }
}

pub struct BlueprintExtractor {
    registry: Box<dyn BlueprintRegistry>,
    // Only shared state on the extraction path; keep it behind a lock so
    // per-file extraction can fan out.
    cache: Mutex<HashMap<String, bool>>,
}

impl BlueprintExtractor {
    pub fn new(registry: Box<dyn BlueprintRegistry>) -> Self {
        Self {
            registry,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Extract translation records from a blueprint file. Files that are
    /// missing, not `.yml`, or undecodable yield an empty list.
    pub fn extract_file(&self, path: &Path) -> Vec<ExtractionRecord> {
        if path.extension().and_then(|e| e.to_str()) != Some("yml") {
            return Vec::new();
        }
        match fs::read_to_string(path) {
            Ok(content) => self.extract_source(&content, path),
            Err(_) => Vec::new(),
        }
    }

    pub fn extract_source(&self, content: &str, path: &Path) -> Vec<ExtractionRecord> {
        let Ok(tree) = serde_yaml::from_str::<Value>(content) else {
            return Vec::new();
        };

        let mut records = Vec::new();
        self.walk(&tree, path, "", &mut records);
        records
    }

    fn walk(&self, value: &Value, file: &Path, path: &str, records: &mut Vec<ExtractionRecord>) {
        match value {
            Value::Mapping(map) => {
                for (key, child) in map {
                    let Some(key) = scalar_key(key) else {
                        continue;
                    };
                    let current = join_path(path, &key);

                    if key == "*" && child.is_string() {
                        // Language variables: the kind derives from the
                        // parent path, not the `*` segment's own path.
                        self.emit(child.as_str().unwrap_or_default(), file, &current, path, records);
                    } else if let Value::String(text) = child {
                        if TRANSLATABLE_FIELDS.contains(&key.as_str()) {
                            self.emit(text, file, &current, &current, records);
                        }
                    } else if child.is_mapping() || child.is_sequence() {
                        self.walk(child, file, &current, records);
                    }
                }
            }
            Value::Sequence(items) => {
                for (index, child) in items.iter().enumerate() {
                    if child.is_mapping() || child.is_sequence() {
                        self.walk(child, file, &join_path(path, &index.to_string()), records);
                    }
                }
            }
            _ => {}
        }
    }

    fn emit(
        &self,
        value: &str,
        file: &Path,
        field_path: &str,
        context_path: &str,
        records: &mut Vec<ExtractionRecord>,
    ) {
        if self.should_skip(value) {
            return;
        }

        let context = RecordContext {
            kind: FieldKind::from_path(context_path),
            ..Default::default()
        };

        let keys = if has_template_expression(value) {
            extract_from_template(value)
        } else {
            vec![value.to_string()]
        };

        for key in keys {
            records.push(ExtractionRecord {
                key,
                file: file.to_path_buf(),
                line: None,
                function: None,
                field_path: Some(field_path.to_string()),
                context: context.clone(),
            });
        }
    }

    fn should_skip(&self, value: &str) -> bool {
        if value.trim().is_empty() {
            return true;
        }

        if has_template_expression(value) {
            // Keep the value only when the expression calls a translation
            // helper; other query expressions carry no translatable text.
            return !TRANSLATION_CALL.is_match(value);
        }

        self.is_known_reference(value)
    }

    fn is_known_reference(&self, value: &str) -> bool {
        let mut cache = self.cache.lock().expect("blueprint cache lock");
        if let Some(&known) = cache.get(value) {
            return known;
        }
        let known = self.registry.contains(value);
        cache.insert(value.to_string(), known);
        known
    }
}

fn join_path(path: &str, segment: &str) -> String {
    if path.is_empty() {
        segment.to_string()
    } else {
        format!("{path}.{segment}")
    }
}

fn scalar_key(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn has_template_expression(value: &str) -> bool {
    value.contains("{{") && value.contains("}}")
}

/// Pull the quoted first arguments of translation calls out of a query
/// expression, in first-seen order, deduplicated.
fn extract_from_template(value: &str) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for captures in QUOTED_ARGUMENT.captures_iter(value) {
        let raw = captures
            .get(1)
            .or_else(|| captures.get(2))
            .map(|m| m.as_str())
            .unwrap_or_default();
        if raw.is_empty() {
            continue;
        }
        let key = unescape(raw);
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
    keys
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
