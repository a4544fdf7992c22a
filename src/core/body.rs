//! Body Interaction Analyzer (§4.6).
//!
//! Walks one hook's body node, maintaining an explicit ancestor stack (§9 -
//! no parent pointers), to classify every call to a known setter as
//! *direct*, *conditional*, *guarded-safe*, *guarded-risky*, *deferred*, or
//! *passed-by-reference*, and to record state reads and ref mutations.

use std::collections::HashSet;

use swc_common::{BytePos, spanned::Spanned};
use swc_ecma_ast::{
    AssignExpr, AssignTarget, BinExpr, BlockStmt, CallExpr, Expr, Function, Ident, IfStmt, Pat,
    SimpleAssignTarget, Stmt,
};
use swc_ecma_visit::{Visit, VisitWith};

use crate::core::bindings::{ReactiveSymbols, call_callee_name};
use crate::core::guard::{self, Branch, Guard, GuardKind, expr_references_ident};

/// Call receivers whose function-expression arguments run outside the
/// current hook execution (§4.6's "async-callback discovery" pre-pass).
const DEFERRED_DISPATCH_NAMES: &[&str] = &[
    "setInterval",
    "setTimeout",
    "requestAnimationFrame",
    "requestIdleCallback",
    "then",
    "catch",
    "finally",
    "subscribe",
    "onSnapshot",
    "addEventListener",
    "removeEventListener",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferencePassTag {
    EventListener,
    CallbackArg,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionReferencePass {
    pub name: String,
    pub tag: ReferencePassTag,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardedModification {
    pub setter: String,
    pub guard: Guard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefMutation {
    pub ref_name: String,
    pub uses_state_value: bool,
    pub line: usize,
}

#[derive(Debug, Clone, Default)]
pub struct StateInteraction {
    pub reads: Vec<String>,
    pub direct_modifications: Vec<String>,
    pub conditional_modifications: Vec<String>,
    pub functional_updater_setters: Vec<String>,
    pub deferred_modifications: Vec<String>,
    pub guarded_modifications: Vec<GuardedModification>,
    pub function_reference_passes: Vec<FunctionReferencePass>,
    pub ref_mutations: Vec<RefMutation>,
    /// Every function name called anywhere in the body, local or imported,
    /// used by the verdict engine's cross-file reach check (§4.8 step 7).
    pub calls: Vec<String>,
}

impl StateInteraction {
    fn dedup(&mut self) {
        dedup_strings(&mut self.reads);
        dedup_strings(&mut self.direct_modifications);
        dedup_strings(&mut self.conditional_modifications);
        dedup_strings(&mut self.functional_updater_setters);
        dedup_strings(&mut self.deferred_modifications);
        dedup_strings(&mut self.calls);
        self.guarded_modifications.dedup_by(|a, b| a == b);
        self.function_reference_passes.dedup_by(|a, b| a == b);
        self.ref_mutations.dedup_by(|a, b| a.ref_name == b.ref_name && a.line == b.line);
    }

    pub fn is_guarded_safe(&self, setter: &str) -> bool {
        self.guarded_modifications
            .iter()
            .any(|g| g.setter == setter && g.guard.is_safe)
    }

    pub fn spread_risk_guard(&self, setter: &str) -> bool {
        self.guarded_modifications
            .iter()
            .any(|g| g.setter == setter && g.guard.kind == GuardKind::ObjectSpreadRisk)
    }
}

fn dedup_strings(v: &mut Vec<String>) {
    let mut seen = HashSet::new();
    v.retain(|s| seen.insert(s.clone()));
}

/// Pre-pass output: spans of function expressions that run deferred, and
/// every identifier passed by reference to a deferred-dispatch receiver.
struct Prepass {
    async_callback_spans: HashSet<BytePos>,
    reference_passes: Vec<FunctionReferencePass>,
}

struct PrepassVisitor<'a> {
    extra_deferred: &'a HashSet<String>,
    result: Prepass,
}

impl PrepassVisitor<'_> {
    fn is_deferred_dispatch(&self, name: &str) -> bool {
        DEFERRED_DISPATCH_NAMES.contains(&name) || self.extra_deferred.contains(name)
    }
}

impl Visit for PrepassVisitor<'_> {
    fn visit_call_expr(&mut self, node: &CallExpr) {
        if let Some(name) = call_callee_name(&Expr::Call(node.clone())) {
            if self.is_deferred_dispatch(&name) {
                let tag = if name == "addEventListener" || name == "removeEventListener" {
                    ReferencePassTag::EventListener
                } else {
                    ReferencePassTag::CallbackArg
                };
                for arg in &node.args {
                    match &*arg.expr {
                        Expr::Arrow(_) | Expr::Fn(_) => {
                            self.result.async_callback_spans.insert(arg.expr.span().lo);
                        }
                        Expr::Ident(ident) => {
                            self.result.reference_passes.push(FunctionReferencePass {
                                name: ident.sym.to_string(),
                                tag,
                            });
                        }
                        _ => {}
                    }
                }
            }
        }
        node.visit_children_with(self);
    }
}

fn run_prepass(body: &Expr, extra_deferred: &HashSet<String>) -> Prepass {
    let mut visitor = PrepassVisitor {
        extra_deferred,
        result: Prepass {
            async_callback_spans: HashSet::new(),
            reference_passes: Vec::new(),
        },
    };
    body.visit_with(&mut visitor);
    visitor.result
}

#[derive(Clone, Copy)]
enum CondBranch {
    Truthy,
    Falsy,
}

impl From<CondBranch> for Branch {
    fn from(b: CondBranch) -> Branch {
        match b {
            CondBranch::Truthy => Branch::Truthy,
            CondBranch::Falsy => Branch::Falsy,
        }
    }
}

struct MainWalker<'a> {
    symbols: &'a ReactiveSymbols,
    source_map: &'a swc_common::SourceMap,
    async_callback_spans: HashSet<BytePos>,
    conditions: Vec<(Expr, CondBranch)>,
    async_depth: usize,
    block_preceding: Vec<Vec<Stmt>>,
    interaction: StateInteraction,
}

impl MainWalker<'_> {
    fn line_of(&self, pos: BytePos) -> usize {
        self.source_map.lookup_char_pos(pos).line
    }

    fn innermost_condition(&self) -> Option<(&Expr, Branch)> {
        self.conditions.last().map(|(e, b)| (e, (*b).into()))
    }

    fn preceding_stmts(&self) -> &[Stmt] {
        self.block_preceding.last().map(Vec::as_slice).unwrap_or(&[])
    }

    fn handle_setter_call(&mut self, call: &CallExpr, setter: &str) {
        let is_functional_updater = matches!(
            call.args.first().map(|a| &*a.expr),
            Some(Expr::Arrow(_)) | Some(Expr::Fn(_))
        );
        if is_functional_updater {
            self.interaction
                .functional_updater_setters
                .push(setter.to_string());
        }

        if self.async_depth > 0 {
            self.interaction.deferred_modifications.push(setter.to_string());
            return;
        }

        let state_name = self.symbols.state_for_setter(setter).map(str::to_string);
        let argument = call.args.first().map(|a| &*a.expr);
        let guard_result = guard::analyze_guard(
            state_name.as_deref(),
            self.innermost_condition(),
            argument,
            self.preceding_stmts(),
        );

        match guard_result {
            Some(g) if g.is_safe => {
                self.interaction.guarded_modifications.push(GuardedModification {
                    setter: setter.to_string(),
                    guard: g,
                });
            }
            Some(g) if g.kind == GuardKind::ObjectSpreadRisk => {
                self.interaction.guarded_modifications.push(GuardedModification {
                    setter: setter.to_string(),
                    guard: g,
                });
            }
            _ => {
                if self.conditions.is_empty() {
                    self.interaction.direct_modifications.push(setter.to_string());
                } else {
                    self.interaction
                        .conditional_modifications
                        .push(setter.to_string());
                }
            }
        }
    }

    fn record_ref_mutation(&mut self, node: &AssignExpr) {
        let AssignTarget::Simple(SimpleAssignTarget::Member(member)) = &node.left else {
            return;
        };
        let Expr::Ident(obj_ident) = &*member.obj else {
            return;
        };
        let ref_name = obj_ident.sym.to_string();
        if !self.symbols.is_ref(&ref_name) {
            return;
        }
        let is_current = matches!(&member.prop, swc_ecma_ast::MemberProp::Ident(p) if p.sym.as_ref() == "current");
        if !is_current {
            return;
        }
        let uses_state_value = self
            .symbols
            .state
            .iter()
            .any(|b| expr_references_ident(&node.right, &b.state));
        self.interaction.ref_mutations.push(RefMutation {
            ref_name,
            uses_state_value,
            line: self.line_of(node.span().lo),
        });
    }
}

impl Visit for MainWalker<'_> {
    fn visit_block_stmt(&mut self, node: &BlockStmt) {
        self.block_preceding.push(Vec::new());
        for stmt in &node.stmts {
            stmt.visit_with(self);
            self.block_preceding.last_mut().unwrap().push(stmt.clone());
        }
        self.block_preceding.pop();
    }

    fn visit_if_stmt(&mut self, node: &IfStmt) {
        node.test.visit_with(self);
        self.conditions.push(((*node.test).clone(), CondBranch::Truthy));
        node.cons.visit_with(self);
        self.conditions.pop();
        if let Some(alt) = &node.alt {
            self.conditions.push(((*node.test).clone(), CondBranch::Falsy));
            alt.visit_with(self);
            self.conditions.pop();
        }
    }

    fn visit_cond_expr(&mut self, node: &swc_ecma_ast::CondExpr) {
        node.test.visit_with(self);
        self.conditions.push(((*node.test).clone(), CondBranch::Truthy));
        node.cons.visit_with(self);
        self.conditions.pop();
        self.conditions.push(((*node.test).clone(), CondBranch::Falsy));
        node.alt.visit_with(self);
        self.conditions.pop();
    }

    fn visit_bin_expr(&mut self, node: &BinExpr) {
        if node.op == swc_ecma_ast::BinaryOp::LogicalAnd {
            node.left.visit_with(self);
            self.conditions.push(((*node.left).clone(), CondBranch::Truthy));
            node.right.visit_with(self);
            self.conditions.pop();
        } else {
            node.visit_children_with(self);
        }
    }

    fn visit_assign_expr(&mut self, node: &AssignExpr) {
        self.record_ref_mutation(node);
        node.right.visit_with(self);
    }

    fn visit_call_expr(&mut self, node: &CallExpr) {
        if let Some(name) = call_callee_name(&Expr::Call(node.clone())) {
            if self.symbols.is_setter(&name) {
                self.handle_setter_call(node, &name);
            } else {
                self.interaction.calls.push(name);
            }
        }
        node.visit_children_with(self);
    }

    fn visit_arrow_expr(&mut self, node: &swc_ecma_ast::ArrowExpr) {
        let is_async_node = self.async_callback_spans.contains(&node.span().lo);
        if is_async_node {
            self.async_depth += 1;
        }
        node.visit_children_with(self);
        if is_async_node {
            self.async_depth -= 1;
        }
    }

    fn visit_function(&mut self, node: &Function) {
        let is_async_node = self.async_callback_spans.contains(&node.span().lo);
        if is_async_node {
            self.async_depth += 1;
        }
        node.visit_children_with(self);
        if is_async_node {
            self.async_depth -= 1;
        }
    }

    fn visit_pat(&mut self, node: &Pat) {
        // Binding identifiers are declarations, not reads; only descend into
        // sub-expressions a pattern can contain (default values, computed
        // keys via the object props' values).
        match node {
            Pat::Assign(a) => a.right.visit_with(self),
            Pat::Array(arr) => {
                for elem in arr.elems.iter().flatten() {
                    self.visit_pat(elem);
                }
            }
            Pat::Object(obj) => {
                for prop in &obj.props {
                    match prop {
                        swc_ecma_ast::ObjectPatProp::KeyValue(kv) => self.visit_pat(&kv.value),
                        swc_ecma_ast::ObjectPatProp::Rest(r) => self.visit_pat(&r.arg),
                        swc_ecma_ast::ObjectPatProp::Assign(_) => {}
                    }
                }
            }
            Pat::Rest(r) => self.visit_pat(&r.arg),
            Pat::Expr(e) => e.visit_with(self),
            Pat::Ident(_) | Pat::Invalid(_) => {}
        }
    }

    fn visit_ident(&mut self, node: &Ident) {
        let name = node.sym.to_string();
        if self.symbols.is_state(&name) {
            self.interaction.reads.push(name);
        }
    }
}

/// Walk a hook's body, producing its full `StateInteraction` record.
/// `extra_deferred` augments the built-in deferred-dispatch receiver list
/// with names configured via `customFunctions.{name}.deferred` (§4.6).
pub fn analyze_body(
    body: &Expr,
    symbols: &ReactiveSymbols,
    source_map: &swc_common::SourceMap,
    extra_deferred: &HashSet<String>,
) -> StateInteraction {
    let prepass = run_prepass(body, extra_deferred);
    let mut walker = MainWalker {
        symbols,
        source_map,
        async_callback_spans: prepass.async_callback_spans,
        conditions: Vec::new(),
        async_depth: 0,
        block_preceding: Vec::new(),
        interaction: StateInteraction {
            function_reference_passes: prepass.reference_passes,
            ..Default::default()
        },
    };
    body.visit_with(&mut walker);
    walker.interaction.dedup();
    walker.interaction
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bindings::extract_reactive_symbols;
    use crate::core::syntax::parse_file;
    use std::sync::Arc;
    use swc_common::SourceMap;

    fn analyze(component_src: &str) -> (ReactiveSymbols, StateInteraction) {
        let sm = Arc::new(SourceMap::default());
        let file = parse_file("Comp.tsx", component_src.to_string(), sm).unwrap();
        let symbols = extract_reactive_symbols(&file.module, &file.source_map);
        let hooks = crate::core::hooks::find_hook_sites(&file.module, &file.source_map);
        let site = hooks.first().expect("expected one hook site");
        let interaction = analyze_body(&site.body, &symbols, &file.source_map, &HashSet::new());
        (symbols, interaction)
    }

    #[test]
    fn test_direct_modification() {
        let (_, i) = analyze(
            "function Comp() { const [n, setN] = useState(0); useEffect(() => { setN(n + 1); }, [n]); }",
        );
        assert_eq!(i.direct_modifications, vec!["setN".to_string()]);
        assert!(i.reads.contains(&"n".to_string()));
    }

    #[test]
    fn test_functional_updater() {
        let (_, i) = analyze(
            "function Comp() { const [n, setN] = useState(0); useEffect(() => { setN(c => c + 1); }, [n]); }",
        );
        assert_eq!(i.functional_updater_setters, vec!["setN".to_string()]);
    }

    #[test]
    fn test_conditional_modification() {
        let (_, i) = analyze(
            "function Comp() { const [n, setN] = useState(0); useEffect(() => { if (n < 10) setN(n + 1); }, [n]); }",
        );
        assert_eq!(i.conditional_modifications, vec!["setN".to_string()]);
    }

    #[test]
    fn test_equality_guard_detected_as_safe() {
        let (_, i) = analyze(
            "function Comp() { const [x, setX] = useState(0); useEffect(() => { if (x !== 5) setX(5); }, [x]); }",
        );
        assert!(i.is_guarded_safe("setX"));
    }

    #[test]
    fn test_object_spread_risk_detected() {
        let (_, i) = analyze(
            "function Comp() { const [u, setU] = useState({id:0}); useEffect(() => { if (u.id !== 5) setU({...u, id: 5}); }, [u]); }",
        );
        assert!(i.spread_risk_guard("setU"));
    }

    #[test]
    fn test_deferred_modification_via_set_interval() {
        let (_, i) = analyze(
            "function Comp() { const [n, setN] = useState(0); useEffect(() => { setInterval(() => { setN(n + 1); }, 1000); }, []); }",
        );
        assert_eq!(i.deferred_modifications, vec!["setN".to_string()]);
        assert!(i.direct_modifications.is_empty());
    }

    #[test]
    fn test_ref_mutation_using_state_value() {
        let (_, i) = analyze(
            "function Comp() { const [n, setN] = useState(0); const r = useRef(0); useEffect(() => { r.current = n; }, [n, r]); }",
        );
        assert_eq!(i.ref_mutations.len(), 1);
        assert!(i.ref_mutations[0].uses_state_value);
    }

    #[test]
    fn test_event_listener_reference_pass() {
        let (_, i) = analyze(
            "function Comp() { useEffect(() => { addEventListener('resize', onR); }, [onR]); }",
        );
        assert!(i
            .function_reference_passes
            .iter()
            .any(|p| p.name == "onR" && p.tag == ReferencePassTag::EventListener));
    }

    #[test]
    fn test_configured_deferred_dispatch_name() {
        let sm = Arc::new(SourceMap::default());
        let file = parse_file(
            "Comp.tsx",
            "function Comp() { const [n, setN] = useState(0); useEffect(() => { scheduleLater(() => { setN(n + 1); }); }, []); }".to_string(),
            sm,
        )
        .unwrap();
        let symbols = extract_reactive_symbols(&file.module, &file.source_map);
        let hooks = crate::core::hooks::find_hook_sites(&file.module, &file.source_map);
        let site = hooks.first().expect("expected one hook site");

        let without_override = analyze_body(&site.body, &symbols, &file.source_map, &HashSet::new());
        assert_eq!(without_override.direct_modifications, vec!["setN".to_string()]);

        let mut extra = HashSet::new();
        extra.insert("scheduleLater".to_string());
        let with_override = analyze_body(&site.body, &symbols, &file.source_map, &extra);
        assert!(with_override.direct_modifications.is_empty());
        assert_eq!(with_override.deferred_modifications, vec!["setN".to_string()]);
    }

    #[test]
    fn test_setter_name_not_recorded_as_state_read() {
        let (_, i) = analyze(
            "function Comp() { const [n, setN] = useState(0); useEffect(() => { setN(1); }, [n]); }",
        );
        assert!(!i.reads.contains(&"setN".to_string()));
    }
}
