use std::process::ExitCode;

/// Exit status for CLI commands, following common conventions for linter tools.
///
/// - `Success` (0): Command completed successfully, no issues found at or
///   above the configured thresholds.
/// - `IssuesFound` (1): Command completed but found at least one diagnostic.
/// - `ConfigError` (2): Command failed before analysis could run (bad config,
///   bad path, or every target file failed to parse).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    IssuesFound,
    ConfigError,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => ExitCode::from(0),
            ExitStatus::IssuesFound => ExitCode::from(1),
            ExitStatus::ConfigError => ExitCode::from(2),
        }
    }
}
