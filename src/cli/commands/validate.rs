use anyhow::Result;
use colored::Colorize;

use super::super::args::ValidateArgs;
use super::super::exit_status::ExitStatus;
use crate::catalog::TranslationManager;
use crate::extract::{ExtractionStats, Extractor};
use crate::report;

pub fn validate(args: ValidateArgs) -> Result<ExitStatus> {
    let project = super::load_project(&args.common)?;

    report::info("Validating translations...");

    let extractor = Extractor::from_config(&project.config, &project.root);
    let records = extractor.extract()?;

    let stats = ExtractionStats::from_records(&records);
    report::out(&format!(
        "Analyzing {} unique translation keys...",
        stats.unique
    ));
    report::br();

    let manager = TranslationManager::from_config(&project.config, &project.root);
    let mut has_issues = false;

    let missing = manager.missing(&records);
    if missing.is_empty() {
        report::success("All translations are present");
    } else {
        has_issues = true;
        report::error("Missing translations found:");
        for (language, keys) in &missing {
            report::br();
            report::out(&format!("Language: {language}"));
            report::out(&format!("Missing: {} translations", keys.len()));
            for key in keys {
                report::out(&format!("  {} {key}", report::FAILURE_MARK.red()));
            }
        }
    }

    report::br();

    let unused = manager.unused(&records);
    if unused.is_empty() {
        report::success("No unused translations");
    } else {
        has_issues = true;
        report::warning("Unused translations found:");
        for (language, keys) in &unused {
            report::br();
            report::out(&format!("Language: {language}"));
            report::out(&format!("Unused: {} translations", keys.len()));
            for key in keys {
                report::out(&format!("  {} {key}", "!".yellow()));
            }
        }
    }

    report::br();

    if has_issues {
        report::error("Validation completed with issues");
        Ok(ExitStatus::Failure)
    } else {
        report::success("Validation completed successfully!");
        Ok(ExitStatus::Success)
    }
}
