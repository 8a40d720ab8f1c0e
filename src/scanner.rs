//! Include/exclude pattern resolution against a project root.
//!
//! Include patterns support one `**` segment ("any depth") plus `*`/`?`
//! single-segment wildcards; patterns without `**` are evaluated as plain
//! OS-level globs. Exclude patterns compile to a deliberately looser,
//! unanchored regex. The two translations are intentionally not unified:
//! tightening the exclude side would change which files get excluded.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use regex::Regex;
use walkdir::WalkDir;

/// Find files under `root` matching at least one include pattern and no
/// exclude pattern. Fails when an include pattern's `**` base directory does
/// not exist.
pub fn find_files(root: &Path, include: &[String], exclude: &[String]) -> Result<Vec<PathBuf>> {
    collect_files(root, include, exclude, true)
}

/// Like [`find_files`], but a missing `**` base directory silently yields no
/// files for that pattern. Used by migration file discovery.
pub fn find_files_lenient(root: &Path, include: &[String], exclude: &[String]) -> Vec<PathBuf> {
    collect_files(root, include, exclude, false).unwrap_or_default()
}

/// Make a pattern absolute by prefixing the project root.
pub fn resolve_pattern(pattern: &str, root: &Path) -> String {
    if pattern.starts_with('/') {
        pattern.to_string()
    } else {
        format!("{}/{}", root.display().to_string().trim_end_matches('/'), pattern)
    }
}

fn collect_files(
    root: &Path,
    include: &[String],
    exclude: &[String],
    strict: bool,
) -> Result<Vec<PathBuf>> {
    let exclude_regexes: Vec<Regex> = exclude
        .iter()
        .filter_map(|p| Regex::new(&exclude_to_regex(p)).ok())
        .collect();

    let mut files: HashSet<PathBuf> = HashSet::new();

    for pattern in include {
        let resolved = resolve_pattern(pattern, root);
        for file in glob_pattern(&resolved, strict)? {
            let path_str = file.to_string_lossy();
            if !exclude_regexes.iter().any(|re| re.is_match(&path_str)) {
                files.insert(file);
            }
        }
    }

    let mut files: Vec<PathBuf> = files.into_iter().collect();
    files.sort();
    Ok(files)
}

fn glob_pattern(pattern: &str, strict: bool) -> Result<Vec<PathBuf>> {
    if !pattern.contains("**") {
        // Plain pattern, let the OS-level glob handle it.
        let Ok(paths) = glob::glob(pattern) else {
            return Ok(Vec::new());
        };
        return Ok(paths.flatten().filter(|p| p.is_file()).collect());
    }

    let (base, remainder) = match pattern.split_once("**/") {
        Some((base, remainder)) => (base.trim_end_matches('/'), remainder),
        None => (pattern.trim_end_matches('/'), "*"),
    };

    let base_path = Path::new(base);
    if !base_path.is_dir() {
        if strict {
            bail!("Base path not found: {base}");
        }
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(base_path).into_iter().flatten() {
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(base_path) else {
            continue;
        };
        if matches_wildcard(&relative.to_string_lossy(), remainder) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Test a path relative to the `**` base against the remainder pattern.
fn matches_wildcard(path: &str, pattern: &str) -> bool {
    if pattern.is_empty() || pattern == "*" {
        return true;
    }

    // Fast path for the common `*.ext` case.
    if let Some(extension) = pattern.strip_prefix("*.")
        && !extension.contains(['*', '?', '/'])
    {
        return path.ends_with(&format!(".{extension}"));
    }

    match Regex::new(&wildcard_to_regex(pattern)) {
        Ok(re) => re.is_match(path),
        Err(_) => false,
    }
}

/// Anchored regex for include remainders: metacharacters are escaped, then
/// `*` matches any chars and `?` any one char.
fn wildcard_to_regex(pattern: &str) -> String {
    let mut regex = String::from("^");
    for c in pattern.chars() {
        match c {
            '*' => regex.push_str(".*"),
            '?' => regex.push('.'),
            c => regex.push_str(&regex::escape(&c.to_string())),
        }
    }
    regex.push('$');
    regex
}

/// Unanchored regex for exclude patterns: `**/` crosses directories, `*`
/// stays within a segment, every other character (dots included) is left
/// raw. Looser than include matching, on purpose.
fn exclude_to_regex(pattern: &str) -> String {
    let mut regex = String::new();
    let mut rest = pattern;
    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("**/") {
            regex.push_str(".*/");
            rest = after;
        } else if let Some(after) = rest.strip_prefix('*') {
            regex.push_str("[^/]*");
            rest = after;
        } else if let Some(after) = rest.strip_prefix('?') {
            regex.push('.');
            rest = after;
        } else {
            let mut chars = rest.chars();
            regex.push(chars.next().unwrap());
            rest = chars.as_str();
        }
    }
    regex
}
