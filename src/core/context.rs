//! Run orchestrator: wires the per-file passes (§4.2-§4.9) and the
//! cross-file graph (§4.4) into one analysis of a directory tree.
//!
//! Most fields are computed lazily the first time a caller asks for them,
//! the same staging the teacher's own `CheckContext` uses: a file is parsed
//! at most once, the cross-file graph is assembled once all per-file
//! summaries exist, and diagnostics are derived last. Per-file work runs in
//! parallel (§5: "embarrassingly parallel across files"); the cross-file
//! graph assembly is the one genuinely sequential merge, since `insert_file`
//! is single-writer-per-key.

use std::cell::OnceCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use swc_common::SourceMap;

use crate::config::Config;
use crate::core::body;
use crate::core::bindings::{self, ReactiveSymbols};
use crate::core::discovery::{self, ScanResult};
use crate::core::hooks::{self, HookSite};
use crate::core::ignore;
use crate::core::imports::{self, CrossFileGraph, FunctionSummary, ImportBinding, ImportedName};
use crate::core::stability::{self, StabilityTable};
use crate::core::syntax::{self, FileRecord};
use crate::core::verdict;
use crate::issues::{Diagnostic, ParseError};
use crate::rules;

/// Everything about one file that doesn't depend on the cross-file graph.
struct PerFileData {
    symbols: ReactiveSymbols,
    stability: StabilityTable,
    hook_sites: Vec<HookSite>,
    summaries: Vec<FunctionSummary>,
    import_targets: HashMap<String, String>,
}

/// Result of one full run, as returned by [`CheckContext::run`].
pub struct AnalysisReport<'a> {
    pub diagnostics: &'a [Diagnostic],
    pub parse_errors: &'a [ParseError],
    pub files_analyzed: usize,
}

pub struct CheckContext {
    root: PathBuf,
    config: Config,
    source_map: Arc<SourceMap>,
    discovered: OnceCell<ScanResult>,
    parsed: OnceCell<HashMap<String, FileRecord>>,
    parse_errors: OnceCell<Vec<ParseError>>,
    per_file: OnceCell<HashMap<String, PerFileData>>,
    cross_file_graph: OnceCell<CrossFileGraph>,
    diagnostics: OnceCell<Vec<Diagnostic>>,
    tsconfig_aliases: OnceCell<HashMap<String, Vec<String>>>,
}

impl CheckContext {
    pub fn new(root: PathBuf, config: Config) -> Self {
        Self {
            root,
            config,
            source_map: Arc::new(SourceMap::default()),
            discovered: OnceCell::new(),
            parsed: OnceCell::new(),
            parse_errors: OnceCell::new(),
            per_file: OnceCell::new(),
            cross_file_graph: OnceCell::new(),
            diagnostics: OnceCell::new(),
            tsconfig_aliases: OnceCell::new(),
        }
    }

    /// Run the full pipeline and return the collected report. Safe to call
    /// more than once - every phase is memoized.
    pub fn run(&self) -> AnalysisReport<'_> {
        AnalysisReport {
            diagnostics: self.diagnostics(),
            parse_errors: self.parse_errors(),
            files_analyzed: self.parsed().len(),
        }
    }

    pub fn skipped_count(&self) -> usize {
        self.discovered().skipped_count
    }

    fn discovered(&self) -> &ScanResult {
        self.discovered
            .get_or_init(|| discovery::discover_files(&self.root, &self.config))
    }

    /// Explicit stable/unstable call-name overrides from configuration,
    /// folding `stableHooks`/`unstableHooks` and the `stable` flag of
    /// `customFunctions` into the two sets the classifier consults (§4.3).
    fn overrides(&self) -> (HashSet<String>, HashSet<String>) {
        let mut stable: HashSet<String> = self.config.stable_hooks.iter().cloned().collect();
        let mut unstable: HashSet<String> = self.config.unstable_hooks.iter().cloned().collect();
        for (name, custom) in &self.config.custom_functions {
            match custom.stable {
                Some(true) => {
                    stable.insert(name.clone());
                }
                Some(false) => {
                    unstable.insert(name.clone());
                }
                None => {}
            }
        }
        (stable, unstable)
    }

    /// Function names configured as deferred-dispatch receivers via
    /// `customFunctions.{name}.deferred` (§4.6), consulted by the body
    /// analyzer's async-callback pre-pass alongside the built-in list.
    fn deferred_overrides(&self) -> HashSet<String> {
        self.config
            .custom_functions
            .iter()
            .filter(|(_, custom)| custom.deferred == Some(true))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Path-alias table from `config.tsconfig_path` (§4.4), loaded once and
    /// shared across every file's import resolution.
    fn tsconfig_aliases(&self) -> &HashMap<String, Vec<String>> {
        self.tsconfig_aliases.get_or_init(|| match &self.config.tsconfig_path {
            Some(path) => imports::load_tsconfig_aliases(path),
            None => HashMap::new(),
        })
    }

    fn parsed(&self) -> &HashMap<String, FileRecord> {
        self.parsed.get_or_init(|| {
            let results: Vec<(Option<(String, FileRecord)>, Option<ParseError>)> = self
                .discovered()
                .files
                .par_iter()
                .map(|path| {
                    let key = path.to_string_lossy().to_string();
                    match std::fs::read_to_string(path) {
                        Ok(text) => match syntax::parse_file(&key, text, self.source_map.clone()) {
                            Ok(record) => (Some((key, record)), None),
                            Err(err) => (
                                None,
                                Some(ParseError {
                                    file: key,
                                    error: err.to_string(),
                                }),
                            ),
                        },
                        Err(err) => (
                            None,
                            Some(ParseError {
                                file: key,
                                error: err.to_string(),
                            }),
                        ),
                    }
                })
                .collect();

            let mut records = HashMap::new();
            let mut errors = Vec::new();
            for (record, error) in results {
                if let Some((key, record)) = record {
                    records.insert(key, record);
                }
                if let Some(error) = error {
                    errors.push(error);
                }
            }
            self.parse_errors.set(errors).ok();
            records
        })
    }

    fn parse_errors(&self) -> &[ParseError] {
        self.parsed();
        self.parse_errors.get().map(Vec::as_slice).unwrap_or(&[])
    }

    fn path_lookup(&self) -> HashMap<String, String> {
        self.parsed()
            .keys()
            .map(|key| (canonical_key(Path::new(key)), key.clone()))
            .collect()
    }

    fn per_file(&self) -> &HashMap<String, PerFileData> {
        self.per_file.get_or_init(|| {
            let (stable_overrides, unstable_overrides) = self.overrides();
            let path_lookup = self.path_lookup();
            let tsconfig_aliases = self.tsconfig_aliases();

            self.parsed()
                .par_iter()
                .map(|(path, record)| {
                    let symbols =
                        bindings::extract_reactive_symbols(&record.module, &record.source_map);
                    let stability = stability::classify_stability(
                        &record.module,
                        &record.source_map,
                        &symbols,
                        &stable_overrides,
                        &unstable_overrides,
                    );
                    let hook_sites = hooks::find_hook_sites(&record.module, &record.source_map);
                    let import_bindings = imports::extract_imports(&record.module);
                    let alias_map = imports::alias_rewrite_map(&import_bindings);
                    let summaries = imports::extract_function_summaries(
                        &record.module,
                        path,
                        &symbols,
                        &alias_map,
                    );
                    let import_targets = resolve_import_targets(
                        path,
                        &import_bindings,
                        &path_lookup,
                        tsconfig_aliases,
                    );

                    let data = PerFileData {
                        symbols,
                        stability,
                        hook_sites,
                        summaries,
                        import_targets,
                    };
                    (path.clone(), data)
                })
                .collect()
        })
    }

    fn cross_file_graph(&self) -> &CrossFileGraph {
        self.cross_file_graph.get_or_init(|| {
            let mut graph = CrossFileGraph::default();
            for (path, data) in self.per_file() {
                graph.insert_file(path, data.summaries.clone(), data.import_targets.clone());
            }
            graph
        })
    }

    fn diagnostics(&self) -> &[Diagnostic] {
        self.diagnostics.get_or_init(|| {
            let graph = self.cross_file_graph();
            let parsed = self.parsed();
            let min_severity = self.config.min_severity;
            let min_confidence = self.config.min_confidence;
            let include_potential = self.config.include_potential_issues;
            let deferred_overrides = self.deferred_overrides();

            let mut all: Vec<Diagnostic> = self
                .per_file()
                .par_iter()
                .flat_map_iter(|(path, data)| {
                    let record = &parsed[path];
                    let mut diags = Vec::new();

                    for site in &data.hook_sites {
                        let interaction = body::analyze_body(
                            &site.body,
                            &data.symbols,
                            &record.source_map,
                            &deferred_overrides,
                        );
                        diags.extend(verdict::evaluate_site(
                            site,
                            &interaction,
                            path,
                            &data.symbols,
                            &data.stability,
                            graph,
                            self.config.strict_mode,
                        ));
                    }

                    diags.extend(rules::render_phase::check(
                        &record.module,
                        &record.source_map,
                        &data.symbols,
                        path,
                    ));
                    diags.extend(rules::missing_deps::check(
                        &data.hook_sites,
                        path,
                        &data.symbols,
                        &record.source_map,
                        graph,
                        &deferred_overrides,
                    ));
                    diags.extend(rules::sync_external_store::check(
                        &data.hook_sites,
                        path,
                        &data.stability,
                    ));
                    diags.extend(rules::jsx_prop::check(
                        &record.module,
                        &record.source_map,
                        &data.stability,
                        path,
                    ));

                    diags.retain(|d| {
                        !ignore::is_ignored(record, d.line)
                            && d.meets_threshold(min_severity, min_confidence)
                            && (include_potential || d.category != crate::issues::Category::Performance)
                    });
                    diags
                })
                .collect();

            all.sort();
            all
        })
    }
}

fn canonical_key(path: &Path) -> String {
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .to_string_lossy()
        .to_string()
}

/// Resolve this file's imports to cross-file call targets, keyed by the
/// *original* exported name (the name `calls` entries carry after alias
/// rewriting, per §4.4's "aliases are rewritten to original names"). Default
/// imports are tracked under the literal name `"default"`, which only
/// resolves when the target also names its default export that way -
/// a known approximation, since no export-metadata table tracks the real
/// local name behind `export default`.
fn resolve_import_targets(
    file_path: &str,
    import_bindings: &[ImportBinding],
    path_lookup: &HashMap<String, String>,
    tsconfig_aliases: &HashMap<String, Vec<String>>,
) -> HashMap<String, String> {
    let importer_dir = Path::new(file_path).parent().unwrap_or_else(|| Path::new("."));
    let mut targets = HashMap::new();

    for binding in import_bindings {
        let original_name = match &binding.imported {
            ImportedName::Named(name) => name.clone(),
            ImportedName::Default => "default".to_string(),
            ImportedName::Namespace => continue,
        };

        let Some(resolved) = imports::resolve_import_path(
            importer_dir,
            &binding.source,
            tsconfig_aliases,
            &HashMap::new(),
            &|p: &Path| p.exists(),
        ) else {
            continue;
        };

        let Some(target_file) = path_lookup.get(&canonical_key(&resolved)) else {
            continue;
        };

        targets
            .entry(original_name.clone())
            .or_insert_with(|| format!("{target_file}#{original_name}"));
    }

    targets
}
