//! End-to-end tests driving the built binary against temporary project
//! trees.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

struct Project {
    dir: TempDir,
}

impl Project {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        for sub in ["templates", "snippets", "models", "blueprints"] {
            fs::create_dir_all(dir.path().join("site").join(sub)).unwrap();
        }
        Self { dir }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn write(&self, relative: &str, content: &str) {
        let path = self.root().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.root().join(relative)).unwrap()
    }

    fn catalog(&self, relative: &str) -> serde_json::Value {
        serde_json::from_str(&self.read(relative)).unwrap()
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_trawl"))
            .args(args)
            .arg("--root")
            .arg(self.root())
            .output()
            .unwrap()
    }

    /// `git init`, so `migrate` passes its version-control gate. Returns
    /// false when git is unavailable; callers skip in that case.
    fn init_git(&self) -> bool {
        Command::new("git")
            .arg("init")
            .current_dir(self.root())
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }
}

#[test]
fn extract_generates_catalogs_for_all_languages() {
    let project = Project::new();
    project.write(".trawlrc.json", r#"{ "sourceLanguage": "en" }"#);
    project.write(
        "site/templates/default.php",
        "<?php echo t('Welcome'); echo tc('item', 5); ?>",
    );
    project.write(
        "site/blueprints/pages/default.yml",
        "fields:\n  title:\n    label: Page Title\n",
    );

    let output = project.run(&["extract"]);
    assert!(output.status.success(), "{:?}", output);

    let en = project.catalog("site/translations/en.json");
    assert_eq!(en["Welcome"], "Welcome");
    assert_eq!(en["Page Title"], "Page Title");
    assert_eq!(en["item"], serde_json::json!(["", "item"]));

    let de = project.catalog("site/translations/de.json");
    assert_eq!(de["Welcome"], "");
    assert_eq!(de["item"], serde_json::json!(["", ""]));
}

#[test]
fn extract_preserves_existing_translations() {
    let project = Project::new();
    project.write(".trawlrc.json", r#"{ "sourceLanguage": "en" }"#);
    project.write("site/templates/default.php", "<?php echo t('Welcome');");
    project.write(
        "site/translations/de.json",
        "{\n  \"Welcome\": \"Willkommen\"\n}\n",
    );

    let output = project.run(&["extract"]);
    assert!(output.status.success());

    let de = project.catalog("site/translations/de.json");
    assert_eq!(de["Welcome"], "Willkommen");
}

#[test]
fn extract_clean_drops_stale_keys() {
    let project = Project::new();
    project.write(".trawlrc.json", r#"{ "sourceLanguage": "en" }"#);
    project.write("site/templates/default.php", "<?php echo t('Kept');");
    project.write(
        "site/translations/en.json",
        "{\n  \"Kept\": \"Kept\",\n  \"Stale\": \"old\"\n}\n",
    );

    let output = project.run(&["extract", "--clean"]);
    assert!(output.status.success());

    let en = project.catalog("site/translations/en.json");
    assert_eq!(en["Kept"], "Kept");
    assert!(en.get("Stale").is_none());
}

#[test]
fn extract_fails_when_nothing_matches() {
    let project = Project::new();

    let output = project.run(&["extract"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No files found"), "{stderr}");
}

#[test]
fn validate_fails_on_missing_translations() {
    let project = Project::new();
    project.write(
        ".trawlrc.json",
        r#"{ "sourceLanguage": "en", "languages": ["en", "de"] }"#,
    );
    project.write("site/templates/default.php", "<?php echo t('Welcome');");

    // No catalogs on disk yet: everything is missing
    let output = project.run(&["validate"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn validate_passes_once_catalogs_are_complete() {
    let project = Project::new();
    project.write(
        ".trawlrc.json",
        r#"{ "sourceLanguage": "en", "languages": ["en"] }"#,
    );
    project.write("site/templates/default.php", "<?php echo t('Welcome');");

    // Extraction seeds the source language with the keys themselves
    assert!(project.run(&["extract"]).status.success());

    let output = project.run(&["validate"]);
    assert!(output.status.success(), "{:?}", output);
}

#[test]
fn migrate_requires_a_git_repository() {
    let project = Project::new();
    project.write(".trawlrc.json", r#"{ "sourceLanguage": "en" }"#);

    let output = project.run(&["migrate"]);

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn migrate_dry_run_leaves_files_untouched() {
    let project = Project::new();
    if !project.init_git() {
        return;
    }
    project.write(".trawlrc.json", r#"{ "sourceLanguage": "en" }"#);
    project.write(
        "site/translations/en.json",
        "{\n  \"site.welcome\": \"Welcome\"\n}\n",
    );
    let template = "<?php echo t('site.welcome');";
    project.write("site/templates/default.php", template);

    let output = project.run(&["migrate", "--dry-run", "--force"]);

    assert!(output.status.success(), "{:?}", output);
    assert_eq!(project.read("site/templates/default.php"), template);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("site.welcome"), "{stdout}");
}

#[test]
fn migrate_rewrites_keys_and_regenerates_catalogs() {
    let project = Project::new();
    if !project.init_git() {
        return;
    }
    project.write(".trawlrc.json", r#"{ "sourceLanguage": "en" }"#);
    project.write(
        "site/translations/en.json",
        "{\n  \"site.welcome\": \"Welcome\"\n}\n",
    );
    project.write("site/templates/default.php", "<?php echo t('site.welcome');");
    project.write(
        "site/blueprints/pages/default.yml",
        "fields:\n  intro:\n    label: site.welcome\n",
    );

    let output = project.run(&["migrate", "--force"]);
    assert!(output.status.success(), "{:?}", output);

    assert_eq!(
        project.read("site/templates/default.php"),
        "<?php echo t('Welcome');"
    );
    assert_eq!(
        project.read("site/blueprints/pages/default.yml"),
        "fields:\n  intro:\n    label: Welcome\n"
    );

    // Catalogs were regenerated in clean mode: the dotted key is gone
    let en = project.catalog("site/translations/en.json");
    assert_eq!(en["Welcome"], "Welcome");
    assert!(en.get("site.welcome").is_none());
}

#[test]
fn help_lists_the_commands() {
    let output = Command::new(env!("CARGO_BIN_EXE_trawl"))
        .arg("--help")
        .output()
        .unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["extract", "validate", "migrate"] {
        assert!(stdout.contains(command), "{stdout}");
    }
}

#[test]
fn yaml_catalogs_round_trip_comments() {
    let project = Project::new();
    project.write(
        ".trawlrc.json",
        r#"{ "sourceLanguage": "en", "languages": ["en"], "outputFormat": "yml" }"#,
    );
    project.write("site/templates/default.php", "<?php echo t('Save');");
    project.write(
        "site/translations/en.yml",
        "# Buttons\nSave: Save\nCancel: Cancel\n",
    );

    let output = project.run(&["extract"]);
    assert!(output.status.success(), "{:?}", output);

    let content = project.read("site/translations/en.yml");
    assert!(content.starts_with("# Buttons\n"), "{content}");
    assert!(content.contains("Save: Save"));
    // Additive mode keeps keys that are no longer extracted
    assert!(content.contains("Cancel: Cancel"));
}
