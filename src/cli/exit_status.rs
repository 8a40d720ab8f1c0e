use std::process::ExitCode;

/// Exit status for CLI commands.
///
/// - `Success` (0): command completed, nothing to report
/// - `Failure` (1): validation found issues, or the command failed
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Failure,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => ExitCode::from(0),
            ExitStatus::Failure => ExitCode::from(1),
        }
    }
}
