//! File discovery (§4.1).
//!
//! Walks the analyzed root collecting `.tsx`/`.ts`/`.jsx`/`.js` files,
//! skipping anything matched by a configured ignore pattern. Ignore entries
//! that contain glob metacharacters are matched with `glob::Pattern` against
//! the path relative to the root; plain entries are matched as a path-prefix,
//! mirroring how a `.gitignore`-style directory name is expected to behave.

use std::path::{Path, PathBuf};

use glob::Pattern;
use walkdir::WalkDir;

use crate::config::Config;

pub struct ScanResult {
    pub files: Vec<PathBuf>,
    pub skipped_count: usize,
}

fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains(['*', '?', '[', ']'])
}

fn is_scannable_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("tsx") | Some("ts") | Some("jsx") | Some("js")
    )
}

fn is_ignored(rel_path: &Path, ignore: &[String]) -> bool {
    let rel_str = rel_path.to_string_lossy().replace('\\', "/");
    ignore.iter().any(|pattern| {
        if is_glob_pattern(pattern) {
            Pattern::new(pattern)
                .map(|p| p.matches(&rel_str))
                .unwrap_or(false)
        } else {
            let needle = pattern.trim_end_matches('/');
            rel_str
                .split('/')
                .any(|component| component == needle)
        }
    })
}

/// Recursively scan `root` for analyzable source files, honoring `config`'s
/// `ignore` patterns. The root itself may be a single file, in which case it
/// is returned as-is (subject to the extension filter, not to `ignore`).
pub fn discover_files(root: &Path, config: &Config) -> ScanResult {
    if root.is_file() {
        return ScanResult {
            files: if is_scannable_file(root) {
                vec![root.to_path_buf()]
            } else {
                Vec::new()
            },
            skipped_count: 0,
        };
    }

    let mut files = Vec::new();
    let mut skipped_count = 0;

    for entry in WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 {
                return true;
            }
            let rel = entry.path().strip_prefix(root).unwrap_or(entry.path());
            !is_ignored(rel, &config.ignore)
        })
    {
        let Ok(entry) = entry else {
            continue;
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry.path().strip_prefix(root).unwrap_or(entry.path());
        if is_ignored(rel, &config.ignore) {
            skipped_count += 1;
            continue;
        }
        if is_scannable_file(entry.path()) {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort();
    ScanResult {
        files,
        skipped_count,
    }
}
