//! RLD CLI application entry point.
//!
//! This binary handles command dispatch for the reactive-loop-detector.

use std::process::ExitCode;

use clap::Parser;
use rld::cli::{Arguments, ExitStatus};

fn main() -> ExitCode {
    let args = Arguments::parse();

    match rld::cli::run_cli(args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitStatus::ConfigError.into()
        }
    }
}
