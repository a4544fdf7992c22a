//! Check command - analyze component/hook source for reactivity bugs.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::args::CheckArgs;
use crate::cli::exit_status::ExitStatus;
use crate::cli::report;
use crate::config::{self, Config};
use crate::core::context::CheckContext;

pub fn check(args: CheckArgs) -> Result<ExitStatus> {
    let CheckArgs {
        root,
        min_severity,
        min_confidence,
        include_potential_issues,
        strict,
        json,
        config: config_path,
        verbose,
    } = args;

    if !root.exists() {
        eprintln!("Error: path does not exist: {}", root.display());
        return Ok(ExitStatus::ConfigError);
    }

    let mut cfg = match config_path {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config
        }
        None => {
            let config_dir = if root.is_dir() {
                root.clone()
            } else {
                root.parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| Path::new(".").to_path_buf())
            };
            config::load_config(&config_dir)?.config
        }
    };

    if let Some(severity) = min_severity {
        cfg.min_severity = severity.into();
    }
    if let Some(confidence) = min_confidence {
        cfg.min_confidence = confidence.into();
    }
    if include_potential_issues {
        cfg.include_potential_issues = true;
    }
    if strict {
        cfg.strict_mode = true;
    }
    cfg.validate()?;

    let ctx = CheckContext::new(root, cfg);
    let analysis = ctx.run();

    if json {
        report::report_json(&analysis)?;
    } else {
        report::report(&analysis, verbose);
    }

    let has_issues = analysis
        .diagnostics
        .iter()
        .any(|d| d.category != crate::issues::Category::Safe);

    if has_issues {
        Ok(ExitStatus::IssuesFound)
    } else {
        Ok(ExitStatus::Success)
    }
}
