pub mod extract;
pub mod migrate;
pub mod validate;

use anyhow::{Context, Result};

use super::args::CommonArgs;
use crate::config::{ConfigLoadResult, load_config};

/// Resolve the project for a command: config discovery starts at `--root`
/// or the current directory.
pub(crate) fn load_project(common: &CommonArgs) -> Result<ConfigLoadResult> {
    let start_dir = match &common.root {
        Some(root) => root.clone(),
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };
    load_config(&start_dir)
}
