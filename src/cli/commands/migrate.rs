use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, bail};

use super::super::args::MigrateArgs;
use super::super::exit_status::ExitStatus;
use crate::catalog::TranslationManager;
use crate::config::Config;
use crate::extract::Extractor;
use crate::migrate::{Migrator, build_migration_map};
use crate::report;

pub fn migrate(args: MigrateArgs) -> Result<ExitStatus> {
    let project = super::load_project(&args.common)?;
    let config = &project.config;

    report::info("Migration from key-based to value-based translations");
    report::br();

    // Nothing gets rewritten unless the tree is recoverable.
    match working_tree_clean(&project.root) {
        Err(err) => {
            report::error(&format!("This command requires a git repository. ({err})"));
            return Ok(ExitStatus::Failure);
        }
        Ok(clean) => {
            if !clean && !args.force {
                report::error("Working tree is not clean. Please commit or stash your changes.");
                report::out("Use --force to override this check (not recommended).");
                return Ok(ExitStatus::Failure);
            }
        }
    }

    report::warning("This will convert your existing translation keys to use values as keys.");
    report::br();

    let source_language = config
        .source_language
        .clone()
        .unwrap_or_else(|| "en".to_string());
    let manager = TranslationManager::from_config(config, &project.root);
    let map = build_migration_map(manager.output_dir(), &config.languages, &source_language);

    if map.is_empty() {
        report::warning("No translation keys found to migrate.");
        return Ok(ExitStatus::Success);
    }

    report::out(&format!("Found {} translation keys to migrate.", map.len()));
    report::br();
    report::out("Preview of migration:");
    for (old_key, new_key) in map.iter().take(5) {
        report::out(&format!("  {old_key} → {new_key}"));
    }
    if map.len() > 5 {
        report::out(&format!("  ... and {} more", map.len() - 5));
    }
    report::br();

    let migrator = Migrator::new(map);
    let files = migrator.find_affected_files(&project.root, &config.exclude);

    report::out("Files to be updated:");
    report::out(&format!("  PHP files: {}", files.source.len()));
    report::out(&format!("  Blueprint files: {}", files.blueprints.len()));
    report::br();

    if args.dry_run {
        report::info("Dry run mode - no changes will be made.");
        report::br();

        for file_changes in migrator.preview(&files) {
            report::out(&format!("File: {}", file_changes.file.display()));
            for change in &file_changes.changes {
                report::out(&format!(
                    "  Line {}: {} → {}",
                    change.line, change.old, change.new
                ));
            }
            report::br();
        }
        return Ok(ExitStatus::Success);
    }

    let outcome = migrator.migrate(&files)?;
    report::success("Migration completed!");
    report::out("Updated files:");
    report::out(&format!("  PHP files: {}", outcome.source_files));
    report::out(&format!("  Blueprint files: {}", outcome.blueprint_files));
    report::out(&format!("  Total replacements: {}", outcome.replacements));

    report::br();
    report::info("Updating translation files...");
    if regenerate_catalogs(config, &project.root).is_err() {
        report::warning("Could not automatically update translation files.");
        report::info("Run \"trawl extract --clean\" manually to update them.");
    }

    report::br();
    report::success("Migration completed successfully!");
    report::info("Please review the changes and test your application.");
    Ok(ExitStatus::Success)
}

/// Re-run extraction in clean mode so the catalogs pick up the new keys.
fn regenerate_catalogs(config: &Config, root: &Path) -> Result<()> {
    let records = Extractor::from_config(config, root).extract()?;
    TranslationManager::from_config(config, root).generate_clean(&records)?;
    Ok(())
}

/// `git status --porcelain`; true when the working tree is clean.
fn working_tree_clean(root: &Path) -> Result<bool> {
    let output = Command::new("git")
        .args(["status", "--porcelain"])
        .current_dir(root)
        .output()
        .context("Failed to run git")?;

    if !output.status.success() {
        bail!("git status failed");
    }

    Ok(output.stdout.iter().all(u8::is_ascii_whitespace))
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_working_tree_status_fails_outside_a_repository() {
        let dir = tempdir().unwrap();

        // Errors whether git is missing or the directory is not a repository
        assert!(working_tree_clean(dir.path()).is_err());
    }
}
