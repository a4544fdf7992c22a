//! Configuration file loading and parsing.
//!
//! Mirrors the teacher's `.glotrc.json` discovery/merge shape: a config file
//! is searched for by walking up from the analyzed directory until either
//! the file is found or a `.git` directory is reached, then merged under CLI
//! overrides. Absence of a config file is not an error - defaults apply.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::issues::{Confidence, Severity};

pub const CONFIG_FILE_NAME: &str = ".rldrc.json";

/// Per-function override for the stability classifier (§4.3) and the
/// async-callback discovery pre-pass (§4.6).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomFunction {
    #[serde(default)]
    pub stable: Option<bool>,
    #[serde(default)]
    pub deferred: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    /// Hook names, beyond the built-in known-stable call list, whose return
    /// value is treated as `stable` by the classifier (§4.3).
    #[serde(default)]
    pub stable_hooks: Vec<String>,
    /// Hook names explicitly excluded from the "any `use*` call is stable"
    /// convention (§4.3, §9's "deliberate policy decision" note).
    #[serde(default)]
    pub unstable_hooks: Vec<String>,
    /// Glob patterns of files/directories to exclude from analysis.
    #[serde(default)]
    pub ignore: Vec<String>,
    #[serde(default = "default_min_severity")]
    pub min_severity: Severity,
    #[serde(default = "default_min_confidence")]
    pub min_confidence: Confidence,
    /// Include `performance`-category diagnostics (otherwise only
    /// `critical`/`warning` are reported by default).
    #[serde(default)]
    pub include_potential_issues: bool,
    /// Per-function stability/deferred-dispatch overrides, keyed by name.
    #[serde(default)]
    pub custom_functions: HashMap<String, CustomFunction>,
    /// When set, an effect/layout-effect unstable-dependency pre-check with
    /// no unconditional setter still emits at `medium` rather than `low`
    /// severity (a stricter posture some teams opt into).
    #[serde(default)]
    pub strict_mode: bool,
    /// Optional path to a `tsconfig.json`-equivalent, consulted by the
    /// import resolver (§4.4) for path aliases.
    #[serde(default)]
    pub tsconfig_path: Option<PathBuf>,
}

fn default_min_severity() -> Severity {
    Severity::Low
}

fn default_min_confidence() -> Confidence {
    Confidence::Low
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stable_hooks: Vec::new(),
            unstable_hooks: Vec::new(),
            ignore: default_ignore(),
            min_severity: default_min_severity(),
            min_confidence: default_min_confidence(),
            include_potential_issues: false,
            custom_functions: HashMap::new(),
            strict_mode: false,
            tsconfig_path: None,
        }
    }
}

fn default_ignore() -> Vec<String> {
    ["**/node_modules/**", "**/.next/**", "**/dist/**", "**/build/**"]
        .map(String::from)
        .to_vec()
}

impl Config {
    /// Validate glob patterns in `ignore`. Unknown keys are already rejected
    /// by `deny_unknown_fields` at deserialization time.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.ignore {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'ignore': \"{}\"", pattern))?;
        }
        Ok(())
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
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
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            Ok(ConfigLoadResult {
                config,
                from_file: true,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            from_file: false,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.stable_hooks.is_empty());
        assert!(!config.strict_mode);
        assert_eq!(config.min_severity, Severity::Low);
    }

    #[test]
    fn test_parse_config() {
        let json = r#"{
              "ignore": ["**/dist/**"],
              "stableHooks": ["useMyStableHook"],
              "minSeverity": "medium"
          }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.ignore, vec!["**/dist/**"]);
        assert_eq!(config.stable_hooks, vec!["useMyStableHook"]);
        assert_eq!(config.min_severity, Severity::Medium);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let json = r#"{ "notARealKey": true }"#;
        let result: Result<Config, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_custom_functions() {
        let json = r#"{
              "customFunctions": {
                  "myIdentity": { "stable": true },
                  "scheduleLater": { "deferred": true }
              }
          }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.custom_functions["myIdentity"].stable, Some(true));
        assert_eq!(
            config.custom_functions["scheduleLater"].deferred,
            Some(true)
        );
    }

    #[test]
    fn test_find_config_file() {
        let dir = tempdir().unwrap();
        let sub_dir = dir.path().join("src").join("components");
        fs::create_dir_all(&sub_dir).unwrap();

        let config_path = dir.path().join(CONFIG_FILE_NAME);
        File::create(&config_path).unwrap();

        let found = find_config_file(&sub_dir);
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_not_found() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();

        let found = find_config_file(dir.path());
        assert!(found.is_none());
    }

    #[test]
    fn test_load_config_default_when_not_found() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();

        let result = load_config(dir.path()).unwrap();
        assert!(!result.from_file);
    }

    #[test]
    fn test_validate_invalid_ignore_pattern() {
        let config = Config {
            ignore: vec!["[invalid".to_string()],
            ..Config::default()
        };
        let result = config.validate();
        assert!(result.is_err());
    }
}
