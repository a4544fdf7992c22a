//! Stability Classifier (§4.3).
//!
//! Tags every locally declared binding inside a component as `stable` or
//! `unstable-<kind>` using the fixed rule table in §4.3. Stability is a pure
//! function of a declaration's shape, augmented by two configuration lists
//! (explicit stable/unstable function names); it never depends on how the
//! binding is later used, per §3's invariant.

use std::collections::{HashMap, HashSet};

use swc_common::spanned::Spanned;
use swc_ecma_ast::{ArrowExpr, Expr, Function, Lit, Module, Pat, VarDeclarator};
use swc_ecma_visit::{Visit, VisitWith};

use crate::core::bindings::{ReactiveSymbols, call_callee_name, extract_binding_names};
use crate::utils::{is_component_name, is_hook_name};

/// Kind classification from the data model (§3): every binding is classified
/// into exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Object,
    Array,
    Function,
    CallResult,
    Primitive,
    State,
    Ref,
    Memo,
    Module,
    Prop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnstableKind {
    Object,
    Array,
    Function,
    CallResult,
}

impl UnstableKind {
    pub fn label(self) -> &'static str {
        match self {
            UnstableKind::Object => "object",
            UnstableKind::Array => "array",
            UnstableKind::Function => "function",
            UnstableKind::CallResult => "call-result",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stability {
    Stable,
    Unstable(UnstableKind),
}

impl Stability {
    pub fn is_stable(self) -> bool {
        matches!(self, Stability::Stable)
    }
}

/// Hard-coded known-stable call names (§4.3). Calls are matched by their
/// collapsed callee name (the last segment of a member expression), so
/// `Math.round(...)`, `JSON.stringify(...)`, and `store.getState()` are all
/// recognized by `round`, `stringify`, `getState` respectively.
const KNOWN_STABLE_CALLS: &[&str] = &[
    // numeric/string/boolean coercion constructors
    "Number", "String", "Boolean",
    // integer/float parsing
    "parseInt", "parseFloat",
    // reflective identity predicates
    "is", "isNaN", "isFinite",
    // namespaced pure functions: rounding, trig, min/max, date-now, JSON
    "round", "floor", "ceil", "trunc", "abs", "sign",
    "sin", "cos", "tan", "min", "max", "now", "stringify",
    // string/array methods returning primitives
    "join", "slice", "trim", "trimStart", "trimEnd",
    "toUpperCase", "toLowerCase", "indexOf", "lastIndexOf",
    "padStart", "padEnd", "repeat", "replace", "replaceAll",
    "includes", "startsWith", "endsWith",
    // store pattern convention
    "getState",
];

/// A classified local binding (§3's `Local binding classification`).
#[derive(Debug, Clone)]
pub struct LocalBinding {
    pub name: String,
    pub kind: BindingKind,
    pub stability: Stability,
    pub line: usize,
    /// Identifies the enclosing component, if any (index into the order
    /// components were entered); `None` at module level.
    pub component_id: Option<usize>,
}

/// The classification of every binding seen in one file, queryable by name.
///
/// Lookup is by name only (not full lexical scoping) - bindings observed
/// later in the same file shadow earlier ones with the same name, which
/// matches how the engine's other passes already resolve identifiers (by
/// name, within one file's reactive-symbol tables).
#[derive(Debug, Clone, Default)]
pub struct StabilityTable {
    pub bindings: Vec<LocalBinding>,
    by_name: HashMap<String, Stability>,
}

impl StabilityTable {
    fn record(&mut self, binding: LocalBinding) {
        self.by_name.insert(binding.name.clone(), binding.stability);
        self.bindings.push(binding);
    }

    /// Stability of a name. Unknown names (not declared in this file - e.g.
    /// an imported binding or a global) default to `stable`, since the
    /// classifier only has evidence to call something unstable, never the
    /// reverse (§4.3's "never depends on usage" rule extends to "absence of
    /// a recognized unstable shape is not itself evidence of instability").
    pub fn stability_of(&self, name: &str) -> Stability {
        self.by_name.get(name).copied().unwrap_or(Stability::Stable)
    }
}

struct ClassifierVisitor<'a> {
    source_map: &'a swc_common::SourceMap,
    symbols: &'a ReactiveSymbols,
    stable_overrides: &'a HashSet<String>,
    unstable_overrides: &'a HashSet<String>,
    component_depth: usize,
    current_component_id: Option<usize>,
    next_component_id: usize,
    table: StabilityTable,
    /// Name of the binding a `const X = () => {...}` arrow is being assigned
    /// to, captured by `visit_var_declarator` just before it descends into
    /// the initializer, so `visit_arrow_expr` can tell whether the arrow is
    /// a component (`X` matches the PascalCase convention).
    pending_arrow_name: Option<String>,
}

impl ClassifierVisitor<'_> {
    fn line_of(&self, span: swc_common::Span) -> usize {
        self.source_map.lookup_char_pos(span.lo).line
    }

    fn classify_call(&self, callee: &str) -> Stability {
        if self.unstable_overrides.contains(callee) {
            return Stability::Unstable(UnstableKind::CallResult);
        }
        if self.stable_overrides.contains(callee) || KNOWN_STABLE_CALLS.contains(&callee) {
            return Stability::Stable;
        }
        if is_hook_name(callee) {
            return Stability::Stable;
        }
        Stability::Unstable(UnstableKind::CallResult)
    }

    /// §4.3's fixed rule table for one initializer expression.
    fn classify_initializer(&self, init: &Expr) -> (BindingKind, Stability) {
        match init {
            Expr::Object(_) => (BindingKind::Object, Stability::Unstable(UnstableKind::Object)),
            Expr::Array(_) => (BindingKind::Array, Stability::Unstable(UnstableKind::Array)),
            Expr::Arrow(_) | Expr::Fn(_) => (
                BindingKind::Function,
                Stability::Unstable(UnstableKind::Function),
            ),
            Expr::Call(_) => {
                let stability = call_callee_name(init)
                    .map(|name| self.classify_call(&name))
                    .unwrap_or(Stability::Unstable(UnstableKind::CallResult));
                (BindingKind::CallResult, stability)
            }
            Expr::Ident(ident) => {
                let name = ident.sym.to_string();
                let stability = self.table.stability_of(&name);
                (BindingKind::CallResult, stability)
            }
            Expr::Lit(Lit::Regex(_)) => {
                (BindingKind::Object, Stability::Unstable(UnstableKind::Object))
            }
            Expr::Lit(_) => (BindingKind::Primitive, Stability::Stable),
            Expr::Paren(p) => self.classify_initializer(&p.expr),
            Expr::Tpl(_) => (BindingKind::Primitive, Stability::Stable),
            // Anything else (new expressions, ternaries, etc.) is treated
            // like an opaque call result: conservatively unstable, since we
            // cannot prove its identity is preserved across renders.
            _ => (
                BindingKind::CallResult,
                Stability::Unstable(UnstableKind::CallResult),
            ),
        }
    }

    fn classify_declarator(&mut self, decl: &VarDeclarator) {
        let Some(init) = &decl.init else { return };
        let line = self.line_of(decl.span());
        let names = extract_binding_names(&decl.name);
        if names.len() == 1 {
            self.record_binding(&names[0], init, line);
        } else {
            // A destructuring declarator's leaves don't each have their own
            // initializer expression; conservatively treat every leaf as an
            // unstable call-result unless it is a recognized reactive
            // symbol (state/setter/ref/memo), matching the "any other call"
            // fallback of §4.3's table.
            for name in names {
                if self.is_reactive_symbol(&name) {
                    continue;
                }
                self.table.record(LocalBinding {
                    name,
                    kind: BindingKind::CallResult,
                    stability: Stability::Unstable(UnstableKind::CallResult),
                    line,
                    component_id: self.current_component_id,
                });
            }
        }
    }

    fn is_reactive_symbol(&self, name: &str) -> bool {
        self.symbols.is_state(name)
            || self.symbols.is_setter(name)
            || self.symbols.is_ref(name)
            || self.symbols.is_memo(name)
    }

    fn record_binding(&mut self, name: &str, init: &Expr, line: usize) {
        if self.symbols.is_state(name) || self.symbols.is_setter(name) {
            self.table.record(LocalBinding {
                name: name.to_string(),
                kind: BindingKind::State,
                stability: Stability::Stable,
                line,
                component_id: self.current_component_id,
            });
            return;
        }
        if self.symbols.is_ref(name) {
            self.table.record(LocalBinding {
                name: name.to_string(),
                kind: BindingKind::Ref,
                stability: Stability::Stable,
                line,
                component_id: self.current_component_id,
            });
            return;
        }
        if self.symbols.is_memo(name) {
            self.table.record(LocalBinding {
                name: name.to_string(),
                kind: BindingKind::Memo,
                stability: Stability::Stable,
                line,
                component_id: self.current_component_id,
            });
            return;
        }
        if self.component_depth == 0 {
            self.table.record(LocalBinding {
                name: name.to_string(),
                kind: BindingKind::Module,
                stability: Stability::Stable,
                line,
                component_id: None,
            });
            return;
        }
        let (kind, stability) = self.classify_initializer(init);
        self.table.record(LocalBinding {
            name: name.to_string(),
            kind,
            stability,
            line,
            component_id: self.current_component_id,
        });
    }

    fn enter_function(&mut self, name: Option<&str>, params: &[String]) -> bool {
        let is_component = name.is_some_and(is_component_name);
        self.component_depth += 1;
        if is_component {
            let id = self.next_component_id;
            self.next_component_id += 1;
            self.current_component_id = Some(id);
            for p in params {
                self.table.record(LocalBinding {
                    name: p.clone(),
                    kind: BindingKind::Prop,
                    stability: Stability::Stable,
                    line: 0,
                    component_id: Some(id),
                });
            }
        }
        is_component
    }

    fn exit_function(&mut self, entered_component: bool) {
        self.component_depth -= 1;
        if entered_component {
            self.current_component_id = None;
        }
    }
}

impl Visit for ClassifierVisitor<'_> {
    fn visit_var_declarator(&mut self, node: &VarDeclarator) {
        self.classify_declarator(node);
        let candidate_name = extract_binding_names(&node.name).into_iter().next();
        let saved = self.pending_arrow_name.take();
        self.pending_arrow_name = candidate_name;
        node.visit_children_with(self);
        self.pending_arrow_name = saved;
    }

    fn visit_function(&mut self, node: &Function) {
        // A bare `Function` reaches us either via `const X = function() {}`
        // (name comes from the pending var declarator) or via `visit_fn_decl`
        // below, which already consumes `pending_arrow_name` itself.
        let params: Vec<String> = node
            .params
            .iter()
            .flat_map(|p| extract_binding_names(&p.pat))
            .collect();
        let name = self.pending_arrow_name.take();
        let entered = self.enter_function(name.as_deref(), &params);
        node.visit_children_with(self);
        self.exit_function(entered);
    }

    fn visit_fn_decl(&mut self, node: &swc_ecma_ast::FnDecl) {
        let name = node.ident.sym.to_string();
        let params: Vec<String> = node
            .function
            .params
            .iter()
            .flat_map(|p| extract_binding_names(&p.pat))
            .collect();
        let entered = self.enter_function(Some(&name), &params);
        node.function.visit_children_with(self);
        self.exit_function(entered);
    }

    fn visit_arrow_expr(&mut self, node: &ArrowExpr) {
        let params: Vec<String> = node
            .params
            .iter()
            .flat_map(extract_binding_names)
            .collect();
        let name = self.pending_arrow_name.take();
        let entered = self.enter_function(name.as_deref(), &params);
        node.visit_children_with(self);
        self.exit_function(entered);
    }
}

pub fn classify_stability(
    module: &Module,
    source_map: &swc_common::SourceMap,
    symbols: &ReactiveSymbols,
    stable_overrides: &HashSet<String>,
    unstable_overrides: &HashSet<String>,
) -> StabilityTable {
    let mut visitor = ClassifierVisitor {
        source_map,
        symbols,
        stable_overrides,
        unstable_overrides,
        component_depth: 0,
        current_component_id: None,
        next_component_id: 0,
        table: StabilityTable::default(),
        pending_arrow_name: None,
    };
    module.visit_with(&mut visitor);
    visitor.table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bindings::extract_reactive_symbols;
    use crate::core::syntax::parse_file;
    use std::sync::Arc;
    use swc_common::SourceMap;

    fn classify(src: &str) -> StabilityTable {
        let sm = Arc::new(SourceMap::default());
        let file = parse_file("Comp.tsx", src.to_string(), sm).unwrap();
        let symbols = extract_reactive_symbols(&file.module, &file.source_map);
        classify_stability(
            &file.module,
            &file.source_map,
            &symbols,
            &HashSet::new(),
            &HashSet::new(),
        )
    }

    #[test]
    fn test_object_literal_unstable() {
        let table = classify("function Comp() { const cfg = {k: 1}; }");
        assert_eq!(
            table.stability_of("cfg"),
            Stability::Unstable(UnstableKind::Object)
        );
    }

    #[test]
    fn test_array_literal_unstable() {
        let table = classify("function Comp() { const xs = [1,2]; }");
        assert_eq!(
            table.stability_of("xs"),
            Stability::Unstable(UnstableKind::Array)
        );
    }

    #[test]
    fn test_arrow_unstable() {
        let table = classify("function Comp() { const onClick = () => {}; }");
        assert_eq!(
            table.stability_of("onClick"),
            Stability::Unstable(UnstableKind::Function)
        );
    }

    #[test]
    fn test_use_hook_convention_stable() {
        let table = classify("function Comp() { const v = useSomething(); }");
        assert_eq!(table.stability_of("v"), Stability::Stable);
    }

    #[test]
    fn test_known_stable_call() {
        let table = classify("function Comp() { const r = Math.round(1.5); }");
        assert_eq!(table.stability_of("r"), Stability::Stable);
    }

    #[test]
    fn test_other_call_unstable() {
        let table = classify("function Comp() { const r = computeThing(); }");
        assert_eq!(
            table.stability_of("r"),
            Stability::Unstable(UnstableKind::CallResult)
        );
    }

    #[test]
    fn test_module_level_stable() {
        let table = classify("const CONFIG = { a: 1 };");
        assert_eq!(table.stability_of("CONFIG"), Stability::Stable);
    }

    #[test]
    fn test_literal_stable() {
        let table = classify("function Comp() { const n = 5; }");
        assert_eq!(table.stability_of("n"), Stability::Stable);
    }

    #[test]
    fn test_identifier_reference_inherits_stability() {
        let table = classify("function Comp() { const a = {x:1}; const b = a; }");
        assert_eq!(
            table.stability_of("b"),
            Stability::Unstable(UnstableKind::Object)
        );
    }

    #[test]
    fn test_explicit_unstable_override() {
        let sm = Arc::new(SourceMap::default());
        let file = parse_file(
            "Comp.tsx",
            "function Comp() { const v = useMyHook(); }".to_string(),
            sm,
        )
        .unwrap();
        let symbols = extract_reactive_symbols(&file.module, &file.source_map);
        let mut unstable = HashSet::new();
        unstable.insert("useMyHook".to_string());
        let table = classify_stability(
            &file.module,
            &file.source_map,
            &symbols,
            &HashSet::new(),
            &unstable,
        );
        assert_eq!(
            table.stability_of("v"),
            Stability::Unstable(UnstableKind::CallResult)
        );
    }
}
