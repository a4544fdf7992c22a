use std::fs;
use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use crate::cli::exit_status::ExitStatus;
use crate::cli::report::SUCCESS_MARK;
use crate::config::{default_config_json, CONFIG_FILE_NAME};

pub fn init() -> Result<ExitStatus> {
    let config_path = Path::new(CONFIG_FILE_NAME);

    if config_path.exists() {
        eprintln!("Error: {} already exists", CONFIG_FILE_NAME);
        return Ok(ExitStatus::ConfigError);
    }

    fs::write(config_path, default_config_json()?)?;
    println!(
        "{} {}",
        SUCCESS_MARK.green(),
        format!("Created {}", CONFIG_FILE_NAME).green()
    );

    Ok(ExitStatus::Success)
}
