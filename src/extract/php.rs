//! PHP call-site extraction.
//!
//! Parses a PHP file with tree-sitter and collects the literal first
//! arguments of `t()`, `tc()` and `tt()` calls. Only compile-time literals
//! count: a plain string, or a `.` concatenation of (recursively) plain
//! strings. Anything else at argument 0 skips the call.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tree_sitter::{Node, Parser};

use super::record::{ExtractionRecord, RecordContext, TranslationFunction};

static TEMPLATE_VARIABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\w+)\}").expect("template variable pattern"));

/// Extract translation records from a PHP file. Unreadable or unparsable
/// files yield an empty list.
pub fn extract_file(path: &Path) -> Vec<ExtractionRecord> {
    match fs::read_to_string(path) {
        Ok(source) => extract_source(&source, path),
        Err(_) => Vec::new(),
    }
}

/// Extract translation records from PHP source text.
pub fn extract_source(source: &str, path: &Path) -> Vec<ExtractionRecord> {
    let mut parser = Parser::new();
    if parser
        .set_language(&tree_sitter_php::LANGUAGE_PHP.into())
        .is_err()
    {
        return Vec::new();
    }

    let Some(tree) = parser.parse(source, None) else {
        return Vec::new();
    };
    // A file with syntax errors contributes nothing; the run continues.
    if tree.root_node().has_error() {
        return Vec::new();
    }

    let mut records = Vec::new();
    visit(tree.root_node(), source.as_bytes(), path, &mut records);
    records
}

fn visit(node: Node, source: &[u8], path: &Path, records: &mut Vec<ExtractionRecord>) {
    if node.kind() == "function_call_expression"
        && let Some(record) = record_from_call(node, source, path)
    {
        records.push(record);
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        visit(child, source, path, records);
    }
}

fn record_from_call(call: Node, source: &[u8], path: &Path) -> Option<ExtractionRecord> {
    let callee = call.child_by_field_name("function")?;
    if callee.kind() != "name" {
        return None;
    }
    let function = TranslationFunction::from_name(callee.utf8_text(source).ok()?)?;

    let arguments = call.child_by_field_name("arguments")?;
    let mut cursor = arguments.walk();
    let args: Vec<Node> = arguments
        .named_children(&mut cursor)
        .filter(|n| n.kind() == "argument")
        .collect();
    let first = args.first()?;

    // A named argument carries its name as an extra child; the expression is
    // always the last named child.
    let expression = first.named_child(first.named_child_count().checked_sub(1)?)?;
    let key = resolve_literal(expression, source)?;
    if key.trim().is_empty() {
        return None;
    }

    Some(ExtractionRecord {
        context: call_context(function, &key, args.len()),
        key,
        file: path.to_path_buf(),
        line: Some(call.start_position().row + 1),
        function: Some(function),
        field_path: None,
    })
}

/// Resolve a compile-time string literal, following `.` concatenations.
/// Returns `None` for anything that is not fully literal (interpolation,
/// variables, calls, other scalars).
fn resolve_literal(node: Node, source: &[u8]) -> Option<String> {
    match node.kind() {
        "string" | "encapsed_string" => {
            let mut value = String::new();
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                match child.kind() {
                    "string_content" => value.push_str(child.utf8_text(source).ok()?),
                    "escape_sequence" => {
                        value.push_str(&unescape_sequence(child.utf8_text(source).ok()?));
                    }
                    // Interpolated variables or expressions
                    _ => return None,
                }
            }
            Some(value)
        }
        "binary_expression" => {
            let operator = node.child_by_field_name("operator")?;
            if operator.utf8_text(source).ok()? != "." {
                return None;
            }
            let left = resolve_literal(node.child_by_field_name("left")?, source)?;
            let right = resolve_literal(node.child_by_field_name("right")?, source)?;
            Some(left + &right)
        }
        _ => None,
    }
}

fn unescape_sequence(sequence: &str) -> String {
    let Some(rest) = sequence.strip_prefix('\\') else {
        return sequence.to_string();
    };
    match rest {
        "n" => "\n".to_string(),
        "t" => "\t".to_string(),
        "r" => "\r".to_string(),
        "0" => "\0".to_string(),
        _ => rest.to_string(),
    }
}

fn call_context(function: TranslationFunction, key: &str, arg_count: usize) -> RecordContext {
    let mut context = RecordContext::default();

    // For tc(), a second argument is the count; its value is irrelevant.
    if function == TranslationFunction::Tc && arg_count > 1 {
        context.plural = true;
    }

    if function == TranslationFunction::Tt && arg_count > 1 {
        context.template = true;
        context.variables = TEMPLATE_VARIABLE
            .captures_iter(key)
            .map(|c| c[1].to_string())
            .collect();
    }

    context
}
