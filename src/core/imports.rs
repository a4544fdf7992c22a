//! Import Resolver & Cross-File Graph (§4.4).
//!
//! Resolves relative and aliased imports to on-disk paths, extracts one
//! function summary per declared function (or arrow bound to a variable),
//! and answers "does function F transitively reach setter S?" via
//! depth-first search with a per-query visited set (§9's cyclic-graph note).

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use swc_ecma_ast::{
    Decl, ExportDecl, ExportDefaultDecl, ImportDecl, ImportSpecifier, Module, ModuleDecl,
    ModuleItem, Pat, Stmt,
};
use swc_ecma_visit::{Visit, VisitWith};

use crate::core::bindings::{ReactiveSymbols, call_callee_name, extract_binding_names};
use crate::utils::is_setter_name;

const RESOLVABLE_EXTENSIONS: &[&str] = &["tsx", "ts", "jsx", "js"];
const INDEX_BASENAMES: &[&str] = &["index.tsx", "index.ts", "index.jsx", "index.js"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportedName {
    Default,
    Named(String),
    Namespace,
}

/// One `import` specifier as written in a file, before resolution.
#[derive(Debug, Clone)]
pub struct ImportBinding {
    pub local_name: String,
    pub imported: ImportedName,
    /// The module specifier exactly as written (`"./foo"`, `"@app/ui"`, …).
    pub source: String,
}

/// Collect every import specifier in a module (default, named with and
/// without `as` renaming, and namespace imports).
pub fn extract_imports(module: &Module) -> Vec<ImportBinding> {
    let mut out = Vec::new();
    for item in &module.body {
        let ModuleItem::ModuleDecl(ModuleDecl::Import(decl)) = item else {
            continue;
        };
        collect_import_decl(decl, &mut out);
    }
    out
}

fn collect_import_decl(decl: &ImportDecl, out: &mut Vec<ImportBinding>) {
    let source = decl.src.value.to_string();
    for spec in &decl.specifiers {
        let (local_name, imported) = match spec {
            ImportSpecifier::Default(d) => (d.local.sym.to_string(), ImportedName::Default),
            ImportSpecifier::Namespace(n) => (n.local.sym.to_string(), ImportedName::Namespace),
            ImportSpecifier::Named(n) => {
                let local_name = n.local.sym.to_string();
                let imported_name = match &n.imported {
                    Some(swc_ecma_ast::ModuleExportName::Ident(i)) => i.sym.to_string(),
                    Some(swc_ecma_ast::ModuleExportName::Str(s)) => s.value.to_string(),
                    None => local_name.clone(),
                };
                (local_name, ImportedName::Named(imported_name))
            }
        };
        out.push(ImportBinding {
            local_name,
            imported,
            source: source.clone(),
        });
    }
}

/// Resolve one import specifier to an on-disk path, or `None` if it is an
/// external package with no matching alias.
///
/// Handles: relative paths with implicit extension and `index` files; path
/// aliases from a `tsconfig`-style `paths` map; workspace-package names
/// present in `workspace_packages`. Existence is checked with `exists_fn` so
/// tests can substitute an in-memory filesystem.
pub fn resolve_import_path(
    importer_dir: &Path,
    specifier: &str,
    alias_paths: &HashMap<String, Vec<String>>,
    workspace_packages: &HashMap<String, PathBuf>,
    exists_fn: &dyn Fn(&Path) -> bool,
) -> Option<PathBuf> {
    if specifier.starts_with('.') {
        return resolve_relative(importer_dir, specifier, exists_fn);
    }

    if let Some(target) = workspace_packages.get(specifier) {
        return Some(target.clone());
    }

    for (alias, targets) in alias_paths {
        if let Some(rest) = match_alias(alias, specifier) {
            for target in targets {
                let candidate_spec = target.replacen('*', &rest, 1);
                let candidate = importer_dir.join(&candidate_spec);
                if let Some(resolved) = resolve_relative_to(&candidate, exists_fn) {
                    return Some(resolved);
                }
            }
        }
    }

    None
}

/// Loads the `compilerOptions.paths` alias table from a `tsconfig.json`-style
/// manifest (§4.4: "path aliases configured in a project manifest"), with
/// each target absolutized against `baseUrl` so the caller can pass the same
/// map for every file regardless of the importing file's own directory.
/// Returns an empty map if the file is missing, unreadable, or not valid JSON.
pub fn load_tsconfig_aliases(tsconfig_path: &Path) -> HashMap<String, Vec<String>> {
    let base_dir = tsconfig_path.parent().unwrap_or_else(|| Path::new("."));
    let Ok(content) = std::fs::read_to_string(tsconfig_path) else {
        return HashMap::new();
    };
    let Ok(root) = serde_json::from_str::<serde_json::Value>(&content) else {
        return HashMap::new();
    };
    let compiler_options = root.get("compilerOptions");
    let base_url = compiler_options
        .and_then(|c| c.get("baseUrl"))
        .and_then(serde_json::Value::as_str)
        .unwrap_or(".");
    let resolved_base = base_dir.join(base_url);

    let mut aliases = HashMap::new();
    let Some(paths) = compiler_options
        .and_then(|c| c.get("paths"))
        .and_then(serde_json::Value::as_object)
    else {
        return aliases;
    };
    for (alias, targets) in paths {
        let Some(targets) = targets.as_array() else {
            continue;
        };
        let absolute_targets: Vec<String> = targets
            .iter()
            .filter_map(serde_json::Value::as_str)
            .map(|target| resolved_base.join(target).to_string_lossy().into_owned())
            .collect();
        aliases.insert(alias.clone(), absolute_targets);
    }
    aliases
}

/// Matches a `tsconfig`-style alias key (`"@app/*"`) against a specifier,
/// returning the wildcard capture (`"foo/bar"` for `"@app/foo/bar"`).
/// An alias with no `*` only matches exactly.
fn match_alias<'a>(alias: &str, specifier: &'a str) -> Option<String> {
    match alias.split_once('*') {
        Some((prefix, suffix)) => specifier
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_suffix(suffix))
            .map(str::to_string),
        None => (alias == specifier).then(|| String::new()),
    }
}

fn resolve_relative(importer_dir: &Path, specifier: &str, exists_fn: &dyn Fn(&Path) -> bool) -> Option<PathBuf> {
    resolve_relative_to(&importer_dir.join(specifier), exists_fn)
}

fn resolve_relative_to(base: &Path, exists_fn: &dyn Fn(&Path) -> bool) -> Option<PathBuf> {
    if exists_fn(base) && base.is_file_like() {
        return Some(base.to_path_buf());
    }
    for ext in RESOLVABLE_EXTENSIONS {
        let candidate = with_extension(base, ext);
        if exists_fn(&candidate) {
            return Some(candidate);
        }
    }
    for index_name in INDEX_BASENAMES {
        let candidate = base.join(index_name);
        if exists_fn(&candidate) {
            return Some(candidate);
        }
    }
    None
}

fn with_extension(base: &Path, ext: &str) -> PathBuf {
    let mut s = base.as_os_str().to_os_string();
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}

trait IsFileLike {
    fn is_file_like(&self) -> bool;
}

impl IsFileLike for Path {
    /// An already-extensioned path (`./Button.tsx`) should be accepted as a
    /// direct hit without also matching as a directory.
    fn is_file_like(&self) -> bool {
        self.extension().is_some()
    }
}

/// One function (or variable-bound arrow/function expression) declared in a
/// file, with its directly invoked setters and outgoing calls (§3's
/// "Function summary").
#[derive(Debug, Clone, Default)]
pub struct FunctionSummary {
    pub key: String,
    pub params: Vec<String>,
    pub setters_invoked: HashSet<String>,
    pub calls: Vec<String>,
    pub is_exported: bool,
}

struct SummaryVisitor<'a> {
    file_path: &'a str,
    symbols: &'a ReactiveSymbols,
    alias_to_original: &'a HashMap<String, String>,
    in_export: bool,
    summaries: Vec<FunctionSummary>,
}

impl SummaryVisitor<'_> {
    fn rewrite(&self, name: &str) -> String {
        self.alias_to_original
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }

    fn is_setter_like(&self, name: &str) -> bool {
        self.symbols.is_setter(name) || is_setter_name(name)
    }

    fn build_summary(&self, name: &str, params: &[String], body: &swc_ecma_ast::BlockStmtOrExpr) -> FunctionSummary {
        let mut collector = CallCollector { calls: Vec::new() };
        body.visit_with(&mut collector);
        let rewritten: Vec<String> = collector.calls.iter().map(|c| self.rewrite(c)).collect();
        let setters_invoked = rewritten
            .iter()
            .filter(|name| self.is_setter_like(name))
            .cloned()
            .collect();
        FunctionSummary {
            key: format!("{}#{}", self.file_path, name),
            params: params.to_vec(),
            setters_invoked,
            calls: rewritten,
            is_exported: self.in_export,
        }
    }
}

struct CallCollector {
    calls: Vec<String>,
}

impl Visit for CallCollector {
    fn visit_call_expr(&mut self, node: &swc_ecma_ast::CallExpr) {
        if let Some(name) = call_callee_name(&swc_ecma_ast::Expr::Call(node.clone())) {
            self.calls.push(name);
        }
        node.visit_children_with(self);
    }
}

impl Visit for SummaryVisitor<'_> {
    fn visit_module_item(&mut self, item: &ModuleItem) {
        match item {
            ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(ExportDecl { decl, .. })) => {
                self.in_export = true;
                self.visit_decl(decl);
                self.in_export = false;
            }
            ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultDecl(ExportDefaultDecl {
                decl, ..
            })) => {
                self.in_export = true;
                if let swc_ecma_ast::DefaultDecl::Fn(f) = decl {
                    let name = f
                        .ident
                        .as_ref()
                        .map(|i| i.sym.to_string())
                        .unwrap_or_else(|| "default".to_string());
                    let params: Vec<String> = f
                        .function
                        .params
                        .iter()
                        .flat_map(|p| extract_binding_names(&p.pat))
                        .collect();
                    if let Some(body) = &f.function.body {
                        let block = swc_ecma_ast::BlockStmtOrExpr::BlockStmt(body.clone());
                        self.summaries.push(self.build_summary(&name, &params, &block));
                    }
                }
                self.in_export = false;
            }
            ModuleItem::Stmt(stmt) => self.visit_stmt(stmt),
            _ => {}
        }
    }

    fn visit_stmt(&mut self, node: &Stmt) {
        if let Stmt::Decl(Decl::Fn(f)) = node {
            let name = f.ident.sym.to_string();
            let params: Vec<String> = f
                .function
                .params
                .iter()
                .flat_map(|p| extract_binding_names(&p.pat))
                .collect();
            if let Some(body) = &f.function.body {
                let block = swc_ecma_ast::BlockStmtOrExpr::BlockStmt(body.clone());
                self.summaries.push(self.build_summary(&name, &params, &block));
            }
        }
        if let Stmt::Decl(Decl::Var(var)) = node {
            for decl in &var.decls {
                let Some(init) = &decl.init else { continue };
                let Pat::Ident(ident) = &decl.name else { continue };
                let name = ident.id.sym.to_string();
                match &**init {
                    swc_ecma_ast::Expr::Arrow(arrow) => {
                        let params: Vec<String> =
                            arrow.params.iter().flat_map(extract_binding_names).collect();
                        self.summaries.push(self.build_summary(&name, &params, &arrow.body));
                    }
                    swc_ecma_ast::Expr::Fn(fn_expr) => {
                        let params: Vec<String> = fn_expr
                            .function
                            .params
                            .iter()
                            .flat_map(|p| extract_binding_names(&p.pat))
                            .collect();
                        if let Some(body) = &fn_expr.function.body {
                            let block = swc_ecma_ast::BlockStmtOrExpr::BlockStmt(body.clone());
                            self.summaries.push(self.build_summary(&name, &params, &block));
                        }
                    }
                    _ => {}
                }
            }
        }
        node.visit_children_with(self);
    }
}

/// Extract one function summary per declared function / variable-bound
/// arrow or function expression in a file. `import_aliases` maps a local
/// import name to the name it was imported as (`import { foo as bar }` ⇒
/// `bar -> foo`), per §4.4's "aliases are rewritten to original names".
pub fn extract_function_summaries(
    module: &Module,
    file_path: &str,
    symbols: &ReactiveSymbols,
    import_aliases: &HashMap<String, String>,
) -> Vec<FunctionSummary> {
    let mut visitor = SummaryVisitor {
        file_path,
        symbols,
        alias_to_original: import_aliases,
        in_export: false,
        summaries: Vec::new(),
    };
    module.visit_with(&mut visitor);
    visitor.summaries
}

/// Build the `local -> imported` rewrite map from a file's import bindings
/// (used only for named imports; default/namespace imports have no
/// meaningful "original name" to rewrite to).
pub fn alias_rewrite_map(imports: &[ImportBinding]) -> HashMap<String, String> {
    imports
        .iter()
        .filter_map(|b| match &b.imported {
            ImportedName::Named(original) if *original != b.local_name => {
                Some((b.local_name.clone(), original.clone()))
            }
            _ => None,
        })
        .collect()
}

/// The run-wide cross-file call graph: every file's function summaries,
/// keyed by `path#name`.
#[derive(Debug, Clone, Default)]
pub struct CrossFileGraph {
    summaries: HashMap<String, FunctionSummary>,
    /// Resolves a bare call name seen inside `file_path` to the qualified
    /// key of the function it refers to, if resolvable (same file or a
    /// resolved import). Built alongside the summaries.
    call_targets: HashMap<String, HashMap<String, String>>,
}

impl CrossFileGraph {
    pub fn insert_file(&mut self, file_path: &str, summaries: Vec<FunctionSummary>, import_targets: HashMap<String, String>) {
        for summary in &summaries {
            self.summaries.insert(summary.key.clone(), summary.clone());
        }
        let mut targets = import_targets;
        for summary in &summaries {
            let local_name = summary.key.rsplit('#').next().unwrap_or(&summary.key);
            targets
                .entry(local_name.to_string())
                .or_insert_with(|| summary.key.clone());
        }
        self.call_targets.insert(file_path.to_string(), targets);
    }

    pub fn summary(&self, key: &str) -> Option<&FunctionSummary> {
        self.summaries.get(key)
    }

    /// DFS with a per-query visited set (§9): does `start_key` transitively
    /// invoke `setter`, directly or through any chain of calls to other
    /// locally-resolvable functions?
    pub fn reaches_setter(&self, start_key: &str, setter: &str) -> bool {
        let mut visited = HashSet::new();
        self.reaches_setter_inner(start_key, setter, &mut visited)
    }

    /// Does a bare call name seen inside `file_path` (e.g. a hook body that
    /// is not itself a named function in the graph) transitively reach
    /// `setter`? Resolves `call_name` to its qualified key via the file's
    /// recorded call targets before running the same DFS as `reaches_setter`.
    pub fn reaches_setter_from_call(&self, file_path: &str, call_name: &str, setter: &str) -> bool {
        let Some(targets) = self.call_targets.get(file_path) else {
            return false;
        };
        let Some(key) = targets.get(call_name) else {
            return false;
        };
        self.reaches_setter(key, setter)
    }

    /// Resolve a bare call name seen inside `file_path` to the function
    /// summary it refers to, if any (same-file declaration or resolved
    /// import). Used by the missing-dependency-list detector (§4.9) to check
    /// whether an indirectly called helper's own summary lists any setters.
    pub fn resolve_call(&self, file_path: &str, call_name: &str) -> Option<&FunctionSummary> {
        let key = self.call_targets.get(file_path)?.get(call_name)?;
        self.summaries.get(key)
    }

    fn reaches_setter_inner(&self, key: &str, setter: &str, visited: &mut HashSet<String>) -> bool {
        if !visited.insert(key.to_string()) {
            return false;
        }
        let Some(summary) = self.summaries.get(key) else {
            return false;
        };
        if summary.setters_invoked.iter().any(|s| s == setter) {
            return true;
        }
        let file_path = key.split('#').next().unwrap_or_default();
        let Some(targets) = self.call_targets.get(file_path) else {
            return false;
        };
        for callee_name in &summary.calls {
            let Some(callee_key) = targets.get(callee_name) else {
                continue;
            };
            if self.reaches_setter_inner(callee_key, setter, visited) {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bindings::extract_reactive_symbols;
    use crate::core::syntax::parse_file;
    use std::fs;
    use std::sync::Arc;
    use swc_common::SourceMap;
    use tempfile::tempdir;

    #[test]
    fn test_extract_named_import_with_alias() {
        let sm = Arc::new(SourceMap::default());
        let file = parse_file(
            "a.ts",
            "import { foo as bar } from './helpers';".to_string(),
            sm,
        )
        .unwrap();
        let imports = extract_imports(&file.module);
        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].local_name, "bar");
        assert_eq!(imports[0].imported, ImportedName::Named("foo".to_string()));
        assert_eq!(imports[0].source, "./helpers");
    }

    #[test]
    fn test_alias_rewrite_map() {
        let sm = Arc::new(SourceMap::default());
        let file = parse_file(
            "a.ts",
            "import { bumpCounter as bump } from './helpers';".to_string(),
            sm,
        )
        .unwrap();
        let imports = extract_imports(&file.module);
        let map = alias_rewrite_map(&imports);
        assert_eq!(map.get("bump"), Some(&"bumpCounter".to_string()));
    }

    #[test]
    fn test_resolve_relative_with_implicit_extension() {
        let exists = |p: &Path| p == Path::new("/proj/src/helpers.ts");
        let resolved = resolve_import_path(
            Path::new("/proj/src"),
            "./helpers",
            &HashMap::new(),
            &HashMap::new(),
            &exists,
        );
        assert_eq!(resolved, Some(PathBuf::from("/proj/src/helpers.ts")));
    }

    #[test]
    fn test_resolve_relative_index_file() {
        let exists = |p: &Path| p == Path::new("/proj/src/utils/index.ts");
        let resolved = resolve_import_path(
            Path::new("/proj/src"),
            "./utils",
            &HashMap::new(),
            &HashMap::new(),
            &exists,
        );
        assert_eq!(resolved, Some(PathBuf::from("/proj/src/utils/index.ts")));
    }

    #[test]
    fn test_resolve_alias_path() {
        let mut aliases = HashMap::new();
        aliases.insert("@app/*".to_string(), vec!["app/*".to_string()]);
        let exists = |p: &Path| p == Path::new("/proj/app/Button.tsx");
        let resolved = resolve_import_path(
            Path::new("/proj"),
            "@app/Button",
            &aliases,
            &HashMap::new(),
            &exists,
        );
        assert_eq!(resolved, Some(PathBuf::from("/proj/app/Button.tsx")));
    }

    #[test]
    fn test_load_tsconfig_aliases_absolutizes_against_base_url() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("tsconfig.json"),
            r#"{
                "compilerOptions": {
                    "baseUrl": "src",
                    "paths": { "@app/*": ["app/*"] }
                }
            }"#,
        )
        .unwrap();

        let aliases = load_tsconfig_aliases(&dir.path().join("tsconfig.json"));
        let targets = aliases.get("@app/*").expect("alias present");
        assert_eq!(
            targets,
            &vec![dir.path().join("src").join("app/*").to_string_lossy().into_owned()]
        );
    }

    #[test]
    fn test_load_tsconfig_aliases_missing_file_returns_empty() {
        let aliases = load_tsconfig_aliases(Path::new("/nonexistent/tsconfig.json"));
        assert!(aliases.is_empty());
    }

    #[test]
    fn test_external_package_unresolved() {
        let exists = |_: &Path| false;
        let resolved = resolve_import_path(
            Path::new("/proj/src"),
            "react",
            &HashMap::new(),
            &HashMap::new(),
            &exists,
        );
        assert_eq!(resolved, None);
    }

    #[test]
    fn test_function_summary_setters_and_calls() {
        let sm = Arc::new(SourceMap::default());
        let file = parse_file(
            "a.ts",
            "function Comp() { const [n, setN] = useState(0); helper(); }".to_string(),
            sm,
        )
        .unwrap();
        let symbols = extract_reactive_symbols(&file.module, &file.source_map);
        let summaries =
            extract_function_summaries(&file.module, "a.ts", &symbols, &HashMap::new());
        let comp = summaries.iter().find(|s| s.key == "a.ts#Comp").unwrap();
        assert!(comp.setters_invoked.contains("setN"));
        assert!(comp.calls.contains(&"helper".to_string()));
    }

    #[test]
    fn test_cross_file_reach() {
        let mut graph = CrossFileGraph::default();
        let a = FunctionSummary {
            key: "a.ts#useA".to_string(),
            params: vec![],
            setters_invoked: HashSet::new(),
            calls: vec!["helper".to_string()],
            is_exported: true,
        };
        graph.insert_file("a.ts", vec![a], HashMap::new());
        let mut targets = HashMap::new();
        targets.insert("helper".to_string(), "b.ts#helper".to_string());
        let b = FunctionSummary {
            key: "b.ts#helper".to_string(),
            params: vec![],
            setters_invoked: ["setN".to_string()].into_iter().collect(),
            calls: vec![],
            is_exported: true,
        };
        graph.insert_file("b.ts", vec![b], HashMap::new());
        // Re-insert a's file entry so its call_targets map includes the
        // cross-file "helper -> b.ts#helper" resolution discovered while
        // resolving a's imports.
        graph.call_targets.get_mut("a.ts").unwrap().extend(targets);
        assert!(graph.reaches_setter("a.ts#useA", "setN"));
        assert!(!graph.reaches_setter("a.ts#useA", "setOther"));
    }

    #[test]
    fn test_cycle_does_not_infinite_loop() {
        let mut graph = CrossFileGraph::default();
        let a = FunctionSummary {
            key: "a.ts#f".to_string(),
            params: vec![],
            setters_invoked: HashSet::new(),
            calls: vec!["g".to_string()],
            is_exported: false,
        };
        let g = FunctionSummary {
            key: "a.ts#g".to_string(),
            params: vec![],
            setters_invoked: HashSet::new(),
            calls: vec!["f".to_string()],
            is_exported: false,
        };
        graph.insert_file("a.ts", vec![a, g], HashMap::new());
        assert!(!graph.reaches_setter("a.ts#f", "setN"));
    }
}
