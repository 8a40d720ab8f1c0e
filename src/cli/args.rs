//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `extract`: extract translation strings and regenerate catalogs
//! - `validate`: report missing and unused translations
//! - `migrate`: rewrite translation keys across the project

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }
}

/// Common arguments shared by all commands.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Project directory (config file is searched upwards from here)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Show detailed output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Parser)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Remove catalog keys no longer found by extraction
    #[arg(long)]
    pub clean: bool,
}

#[derive(Debug, Parser)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Parser)]
pub struct MigrateArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Force migration even with uncommitted changes
    #[arg(short, long)]
    pub force: bool,

    /// Show what would be changed without making changes
    #[arg(short = 'd', long)]
    pub dry_run: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract translation strings from PHP files and blueprints
    Extract(ExtractArgs),
    /// Validate translations and check for missing or unused keys
    Validate(ValidateArgs),
    /// Migrate from key-based to value-based translations
    Migrate(MigrateArgs),
}
