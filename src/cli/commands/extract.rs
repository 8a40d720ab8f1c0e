use std::path::Path;

use anyhow::Result;

use super::super::args::ExtractArgs;
use super::super::exit_status::ExitStatus;
use crate::catalog::TranslationManager;
use crate::extract::{ExtractionStats, Extractor};
use crate::report;

pub fn extract(args: ExtractArgs) -> Result<ExitStatus> {
    let project = super::load_project(&args.common)?;
    let config = &project.config;

    report::info("Starting translation extraction...");
    report::out("Configuration:");
    report::out(&format!(
        "  Source language: {}",
        config.source_language.as_deref().unwrap_or("none")
    ));
    report::out(&format!("  Output format: {}", config.output_format.as_str()));
    report::out(&format!("  Output path: {}", config.output_path));
    report::out(&format!("  Languages: {}", config.languages.join(", ")));
    report::br();

    let extractor = Extractor::from_config(config, &project.root);
    let records = extractor.extract()?;

    let stats = ExtractionStats::from_records(&records);
    report::success(&format!(
        "Found {} translation strings ({} unique)",
        stats.total, stats.unique
    ));

    if args.common.verbose {
        report::out(&format!("Files scanned: {}", stats.by_file.len()));
        for (file, count) in &stats.by_file {
            report::out(&format!("  - {}: {count}", base_name(file)));
        }
    }

    if !stats.by_type.is_empty() {
        report::out("By type:");
        for (kind, count) in &stats.by_type {
            report::out(&format!("  - {kind}: {count}"));
        }
    }

    report::br();
    report::info("Generating translation files...");

    let manager = TranslationManager::from_config(config, &project.root);
    let generated = if args.clean {
        report::info("Clean mode enabled - removing unused translations");
        manager.generate_clean(&records)?
    } else {
        manager.generate(&records)?
    };

    for (_, path) in &generated {
        report::success(&format!("Generated: {}", path.display()));
    }

    let missing = manager.missing(&records);
    if !missing.is_empty() {
        report::br();
        report::warning("Missing translations:");
        for (language, keys) in &missing {
            report::out(&format!("{language}: {} missing", keys.len()));
            if args.common.verbose {
                report::list_truncated(keys, 10);
            }
        }
    }

    let unused = manager.unused(&records);
    if !unused.is_empty() {
        report::br();
        report::warning("Unused translations:");
        for (language, keys) in &unused {
            report::out(&format!("{language}: {} unused", keys.len()));
            if args.common.verbose {
                report::list_truncated(keys, 10);
            }
        }
    }

    report::br();
    report::success("Translation extraction completed!");
    Ok(ExitStatus::Success)
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
