//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `check`: Analyze component/hook source files for reactivity bugs.
//! - `init`: Write a default `.rldrc.json` configuration file.

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};

use crate::issues::{Confidence, Severity};

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

    pub fn verbose(&self) -> bool {
        match &self.command {
            Some(Command::Check(args)) => args.verbose,
            Some(Command::Init) | None => false,
        }
    }
}

/// clap-facing mirror of [`Severity`], since the domain type lives in
/// `issues` and carries a `serde` rename rather than a `ValueEnum` impl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SeverityArg {
    Low,
    Medium,
    High,
}

impl From<SeverityArg> for Severity {
    fn from(value: SeverityArg) -> Self {
        match value {
            SeverityArg::Low => Severity::Low,
            SeverityArg::Medium => Severity::Medium,
            SeverityArg::High => Severity::High,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConfidenceArg {
    Low,
    Medium,
    High,
}

impl From<ConfidenceArg> for Confidence {
    fn from(value: ConfidenceArg) -> Self {
        match value {
            ConfidenceArg::Low => Confidence::Low,
            ConfidenceArg::Medium => Confidence::Medium,
            ConfidenceArg::High => Confidence::High,
        }
    }
}

#[derive(Debug, Parser)]
pub struct CheckArgs {
    /// Root file or directory to analyze (defaults to the current directory).
    #[arg(default_value = ".")]
    pub root: PathBuf,

    /// Only report diagnostics at or above this severity (overrides config file).
    #[arg(long, value_enum)]
    pub min_severity: Option<SeverityArg>,

    /// Only report diagnostics at or above this confidence (overrides config file).
    #[arg(long, value_enum)]
    pub min_confidence: Option<ConfidenceArg>,

    /// Include `performance`-category diagnostics in the report.
    #[arg(long)]
    pub include_potential_issues: bool,

    /// Treat unstable dependencies with no unconditional setter as medium
    /// rather than low severity.
    #[arg(long)]
    pub strict: bool,

    /// Emit machine-readable JSON instead of the cargo-style report.
    #[arg(long)]
    pub json: bool,

    /// Explicit config file path, overriding the usual upward search for
    /// `.rldrc.json`.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose output (surfaces parse-error detail).
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyze source files for infinite re-render loops and reactivity bugs
    Check(CheckArgs),
    /// Initialize a new .rldrc.json configuration file
    Init,
}
