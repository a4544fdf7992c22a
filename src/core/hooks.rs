//! Hook Inspector (§4.5).
//!
//! Locates every call expression whose callee name is a known hook, extracts
//! its dependency list from the argument position appropriate to that hook
//! kind, and yields a `HookSite` pointing at the body argument.

use swc_common::spanned::Spanned;
use swc_ecma_ast::{CallExpr, Expr, ExprOrSpread, Module};
use swc_ecma_visit::{Visit, VisitWith};

use crate::core::bindings::call_callee_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    Effect,
    LayoutEffect,
    Memo,
    Callback,
    ImperativeHandle,
    SyncExternalStore,
}

impl HookKind {
    fn from_callee_name(name: &str) -> Option<Self> {
        match name {
            "useEffect" => Some(HookKind::Effect),
            "useLayoutEffect" => Some(HookKind::LayoutEffect),
            "useMemo" => Some(HookKind::Memo),
            "useCallback" => Some(HookKind::Callback),
            "useImperativeHandle" => Some(HookKind::ImperativeHandle),
            "useSyncExternalStore" => Some(HookKind::SyncExternalStore),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HookKind::Effect => "effect",
            HookKind::LayoutEffect => "layout-effect",
            HookKind::Memo => "memo",
            HookKind::Callback => "callback",
            HookKind::ImperativeHandle => "imperative-handle",
            HookKind::SyncExternalStore => "sync-external-store",
        }
    }

    /// Index of the dependency-list argument for this hook kind. `None` for
    /// `sync-external-store`, which has no dependency list (§4.9 handles it
    /// with a dedicated rule instead).
    fn deps_arg_index(self) -> Option<usize> {
        match self {
            HookKind::ImperativeHandle => Some(2),
            HookKind::SyncExternalStore => None,
            _ => Some(1),
        }
    }

    /// Index of the body/callback argument.
    fn body_arg_index(self) -> usize {
        match self {
            HookKind::ImperativeHandle => 1,
            _ => 0,
        }
    }
}

/// One dependency-list entry. Non-identifier elements (member expressions,
/// literals, spreads) are recorded as `None` so callers can count them
/// without attempting to extract a name (§4.5: "ignore non-identifier
/// elements; they are separately handled in §4.6").
#[derive(Debug, Clone)]
pub struct HookSite {
    pub kind: HookKind,
    pub line: usize,
    pub column: usize,
    pub dependencies: Vec<String>,
    /// Count of dependency-array entries that were not a bare identifier
    /// (member access, literal, etc.) - present but unnamed.
    pub non_identifier_dep_count: usize,
    pub body: Expr,
    pub call: CallExpr,
}

struct HookVisitor<'a> {
    source_map: &'a swc_common::SourceMap,
    sites: Vec<HookSite>,
}

impl Visit for HookVisitor<'_> {
    fn visit_call_expr(&mut self, node: &CallExpr) {
        if let Some(name) = call_callee_name(&Expr::Call(node.clone())) {
            if let Some(kind) = HookKind::from_callee_name(&name) {
                if let Some(body_arg) = node.args.get(kind.body_arg_index()) {
                    let loc = self.source_map.lookup_char_pos(node.span().lo);
                    let (deps, non_ident) = kind
                        .deps_arg_index()
                        .and_then(|i| node.args.get(i))
                        .map(extract_dependency_names)
                        .unwrap_or((Vec::new(), 0));
                    self.sites.push(HookSite {
                        kind,
                        line: loc.line,
                        column: loc.col.0 + 1,
                        dependencies: deps,
                        non_identifier_dep_count: non_ident,
                        body: (*body_arg.expr).clone(),
                        call: node.clone(),
                    });
                }
            }
        }
        node.visit_children_with(self);
    }
}

fn extract_dependency_names(arg: &ExprOrSpread) -> (Vec<String>, usize) {
    let Expr::Array(array) = &*arg.expr else {
        return (Vec::new(), 0);
    };
    let mut names = Vec::new();
    let mut non_identifier = 0;
    for elem in array.elems.iter().flatten() {
        match &*elem.expr {
            Expr::Ident(ident) => names.push(ident.sym.to_string()),
            _ => non_identifier += 1,
        }
    }
    (names, non_identifier)
}

/// Find every hook call site in a module.
pub fn find_hook_sites(module: &Module, source_map: &swc_common::SourceMap) -> Vec<HookSite> {
    let mut visitor = HookVisitor {
        source_map,
        sites: Vec::new(),
    };
    module.visit_with(&mut visitor);
    visitor.sites
}
