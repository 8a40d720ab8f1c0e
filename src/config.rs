use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_NAME: &str = ".trawlrc.json";

/// Catalog file format on disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    #[serde(alias = "yml")]
    Yaml,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yml",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Language whose catalogs are seeded with the keys themselves.
    #[serde(default)]
    pub source_language: Option<String>,
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
    #[serde(default = "default_output_path")]
    pub output_path: String,
    #[serde(default)]
    pub output_format: OutputFormat,
    #[serde(default = "default_include")]
    pub include: Vec<String>,
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
}

fn default_languages() -> Vec<String> {
    vec!["en".to_string(), "de".to_string()]
}

fn default_output_path() -> String {
    "site/translations".to_string()
}

fn default_include() -> Vec<String> {
    [
        "site/templates/**/*.php",
        "site/snippets/**/*.php",
        "site/models/**/*.php",
        "site/blueprints/**/*.yml",
    ]
    .map(String::from)
    .to_vec()
}

fn default_exclude() -> Vec<String> {
    ["**/node_modules/**", "**/vendor/**"].map(String::from).to_vec()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_language: None,
            languages: default_languages(),
            output_path: default_output_path(),
            output_format: OutputFormat::default(),
            include: default_include(),
            exclude: default_exclude(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.languages.is_empty() {
            bail!("Config must list at least one language");
        }
        if self.include.is_empty() {
            bail!("Config must list at least one include pattern");
        }
        Ok(())
    }
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// Project root: the directory holding the config file, or the start
    /// directory when no file was found.
    pub root: PathBuf,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            let root = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| start_dir.to_path_buf());
            Ok(ConfigLoadResult {
                config,
                root,
                from_file: true,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            root: start_dir.to_path_buf(),
            from_file: false,
        }),
    }
}
