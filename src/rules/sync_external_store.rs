//! Unstable sync-external-store snapshot detector (RLD-407, §4.9).
//!
//! `useSyncExternalStore`'s second argument (`getSnapshot`) must return the
//! same reference across calls when nothing changed. A literal-returning
//! body allocates a new aggregate on every render; an identifier already
//! classified `unstable-function` is no better.

use swc_ecma_ast::{BlockStmt, BlockStmtOrExpr, Expr, Stmt};

use crate::core::hooks::{HookKind, HookSite};
use crate::core::stability::{Stability, StabilityTable, UnstableKind};
use crate::issues::{Confidence, Diagnostic, ErrorCode, Severity};

pub fn check(sites: &[HookSite], file: &str, stability: &StabilityTable) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for site in sites {
        if site.kind != HookKind::SyncExternalStore {
            continue;
        }
        let Some(snapshot_arg) = site.call.args.get(1) else {
            continue;
        };
        if let Some(diagnostic) = evaluate(site, &snapshot_arg.expr, file, stability) {
            out.push(diagnostic);
        }
    }
    out
}

fn evaluate(site: &HookSite, snapshot: &Expr, file: &str, stability: &StabilityTable) -> Option<Diagnostic> {
    if let Some(returned) = direct_return_expr(snapshot) {
        if is_new_aggregate_literal(returned) {
            return Some(Diagnostic::new(
                ErrorCode::SyncExternalStoreSnapshotUnstable,
                file,
                site.line,
                site.column,
                site.kind.as_str(),
                "getSnapshot",
                Severity::High,
                Confidence::High,
                "getSnapshot returns a freshly allocated object/array on every call, so the store never reports equal snapshots.",
            ));
        }
        return None;
    }

    if let Expr::Ident(ident) = snapshot {
        let name = ident.sym.to_string();
        if stability.stability_of(&name) == Stability::Unstable(UnstableKind::Function) {
            return Some(Diagnostic::new(
                ErrorCode::SyncExternalStoreSnapshotUnstable,
                file,
                site.line,
                site.column,
                site.kind.as_str(),
                name,
                Severity::Medium,
                Confidence::Medium,
                "getSnapshot is a locally defined function recreated every render, so its identity cannot be trusted.",
            ));
        }
    }

    None
}

fn direct_return_expr(expr: &Expr) -> Option<&Expr> {
    match expr {
        Expr::Paren(p) => direct_return_expr(&p.expr),
        Expr::Arrow(arrow) => match &*arrow.body {
            BlockStmtOrExpr::Expr(e) => Some(e),
            BlockStmtOrExpr::BlockStmt(block) => first_return_arg(block),
        },
        Expr::Fn(f) => f.function.body.as_ref().and_then(first_return_arg),
        _ => None,
    }
}

fn first_return_arg(block: &BlockStmt) -> Option<&Expr> {
    block.stmts.iter().find_map(|stmt| match stmt {
        Stmt::Return(r) => r.arg.as_deref(),
        _ => None,
    })
}

fn is_new_aggregate_literal(expr: &Expr) -> bool {
    matches!(expr, Expr::Object(_) | Expr::Array(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bindings::extract_reactive_symbols;
    use crate::core::hooks::find_hook_sites;
    use crate::core::stability::classify_stability;
    use crate::core::syntax::parse_file;
    use std::collections::HashSet;
    use std::sync::Arc;
    use swc_common::SourceMap;

    fn run(src: &str) -> Vec<Diagnostic> {
        let sm = Arc::new(SourceMap::default());
        let file = parse_file("Comp.tsx", src.to_string(), sm).unwrap();
        let symbols = extract_reactive_symbols(&file.module, &file.source_map);
        let stability = classify_stability(
            &file.module,
            &file.source_map,
            &symbols,
            &HashSet::new(),
            &HashSet::new(),
        );
        let sites = find_hook_sites(&file.module, &file.source_map);
        check(&sites, "Comp.tsx", &stability)
    }

    #[test]
    fn test_object_literal_snapshot_flagged() {
        let result = run("useSyncExternalStore(subscribe, () => ({ value: 1 }));");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].severity, Severity::High);
    }

    #[test]
    fn test_array_literal_snapshot_flagged() {
        let result = run("useSyncExternalStore(subscribe, () => [1, 2]);");
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_unstable_function_identifier_flagged() {
        let result = run(
            "function Comp() { const getSnapshot = () => store.get(); useSyncExternalStore(subscribe, getSnapshot); }",
        );
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].severity, Severity::Medium);
    }

    #[test]
    fn test_primitive_returning_snapshot_not_flagged() {
        let result = run("useSyncExternalStore(subscribe, () => store.getValue());");
        assert!(result.is_empty());
    }

    #[test]
    fn test_named_getsnapshot_function_not_flagged() {
        let result = run("useSyncExternalStore(subscribe, getSnapshot);");
        assert!(result.is_empty());
    }
}
