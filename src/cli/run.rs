use anyhow::Result;

use super::args::{Arguments, Command};
use super::commands::{extract::extract, migrate::migrate, validate::validate};
use super::exit_status::ExitStatus;

pub fn run(Arguments { command }: Arguments) -> Result<ExitStatus> {
    match command {
        Some(Command::Extract(args)) => extract(args),
        Some(Command::Validate(args)) => validate(args),
        Some(Command::Migrate(args)) => migrate(args),
        None => {
            anyhow::bail!("No command provided. Use --help to see available commands.")
        }
    }
}
