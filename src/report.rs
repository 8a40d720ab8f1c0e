//! Terminal output helpers.
//!
//! Command modules funnel all user-facing output through these so the
//! formatting stays in one place.

use colored::Colorize;

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

pub fn out(message: &str) {
    println!("{message}");
}

pub fn br() {
    println!();
}

pub fn info(message: &str) {
    println!("{}", message.cyan());
}

pub fn success(message: &str) {
    println!("{} {}", SUCCESS_MARK.green(), message.green());
}

pub fn warning(message: &str) {
    println!("{} {}", "warning:".bold().yellow(), message);
}

pub fn error(message: &str) {
    eprintln!("{} {}", "error:".bold().red(), message);
}

/// Print up to `limit` items, indented, with an "... and N more" trailer.
pub fn list_truncated(items: &[String], limit: usize) {
    for item in items.iter().take(limit) {
        println!("  - {item}");
    }
    if items.len() > limit {
        println!("  ... and {} more", items.len() - limit);
    }
}
