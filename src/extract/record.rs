//! Extraction record types shared by the PHP and blueprint extractors.

use std::fmt;
use std::path::PathBuf;

/// The three recognized translation helper functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TranslationFunction {
    /// `t("key")` - plain translation
    T,
    /// `tc("key", $count)` - translation with plural forms
    Tc,
    /// `tt("key", ["name" => $value])` - translation with template placeholders
    Tt,
}

impl TranslationFunction {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "t" => Some(TranslationFunction::T),
            "tc" => Some(TranslationFunction::Tc),
            "tt" => Some(TranslationFunction::Tt),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TranslationFunction::T => "t",
            TranslationFunction::Tc => "tc",
            TranslationFunction::Tt => "tt",
        }
    }
}

impl fmt::Display for TranslationFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Blueprint structure a field path belongs to.
///
/// Derived from the dotted path, first match wins in the order below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Field,
    Section,
    Tab,
    Column,
    Block,
}

impl FieldKind {
    /// Derive the kind from a dotted blueprint path.
    pub fn from_path(path: &str) -> Option<Self> {
        let segments: Vec<&str> = path.split('.').collect();
        for (segment, kind) in [
            ("fields", FieldKind::Field),
            ("sections", FieldKind::Section),
            ("tabs", FieldKind::Tab),
            ("columns", FieldKind::Column),
            ("blocks", FieldKind::Block),
        ] {
            if segments.contains(&segment) {
                return Some(kind);
            }
        }
        None
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Field => "field",
            FieldKind::Section => "section",
            FieldKind::Tab => "tab",
            FieldKind::Column => "column",
            FieldKind::Block => "block",
        }
    }
}

/// Flags attached to an extraction occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordContext {
    /// Set for `tc()` calls with a count argument.
    pub plural: bool,
    /// Set for `tt()` calls with a data argument.
    pub template: bool,
    /// `{name}`-style placeholders found in the key of a template call.
    pub variables: Vec<String>,
    /// Blueprint structure the field path belongs to.
    pub kind: Option<FieldKind>,
}

impl RecordContext {
    pub fn is_empty(&self) -> bool {
        !self.plural && !self.template && self.variables.is_empty() && self.kind.is_none()
    }
}

/// One occurrence of a translatable string, with provenance metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRecord {
    /// The literal text passed to a translation function, or the field value.
    /// Never empty or whitespace-only.
    pub key: String,
    pub file: PathBuf,
    /// 1-based source line; always set by the PHP extractor, absent for
    /// blueprint records.
    pub line: Option<usize>,
    /// Present only for PHP extractions; `None` implies a blueprint origin.
    pub function: Option<TranslationFunction>,
    /// Dotted path within the blueprint tree (blueprint records only).
    pub field_path: Option<String>,
    pub context: RecordContext,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_function_from_name() {
        assert_eq!(TranslationFunction::from_name("t"), Some(TranslationFunction::T));
        assert_eq!(TranslationFunction::from_name("tc"), Some(TranslationFunction::Tc));
        assert_eq!(TranslationFunction::from_name("tt"), Some(TranslationFunction::Tt));
        assert_eq!(TranslationFunction::from_name("translate"), None);
        assert_eq!(TranslationFunction::from_name(""), None);
    }

    #[test]
    fn test_field_kind_from_path() {
        assert_eq!(FieldKind::from_path("fields.title.label"), Some(FieldKind::Field));
        assert_eq!(FieldKind::from_path("sections.content"), Some(FieldKind::Section));
        assert_eq!(FieldKind::from_path("tabs.main.label"), Some(FieldKind::Tab));
        assert_eq!(FieldKind::from_path("columns.0.width"), Some(FieldKind::Column));
        assert_eq!(FieldKind::from_path("blocks.heading"), Some(FieldKind::Block));
        assert_eq!(FieldKind::from_path("title"), None);
        assert_eq!(FieldKind::from_path(""), None);
    }

    #[test]
    fn test_field_kind_priority() {
        // `fields` wins over `sections` regardless of position
        assert_eq!(
            FieldKind::from_path("sections.main.fields.title"),
            Some(FieldKind::Field)
        );
        assert_eq!(
            FieldKind::from_path("tabs.main.columns.0.sections.x"),
            Some(FieldKind::Section)
        );
    }

    #[test]
    fn test_field_kind_matches_whole_segments_only() {
        // `subfields` is not `fields`
        assert_eq!(FieldKind::from_path("subfields.title"), None);
    }

    #[test]
    fn test_context_is_empty() {
        assert!(RecordContext::default().is_empty());
        assert!(
            !RecordContext {
                plural: true,
                ..Default::default()
            }
            .is_empty()
        );
        assert!(
            !RecordContext {
                kind: Some(FieldKind::Field),
                ..Default::default()
            }
            .is_empty()
        );
    }
}
