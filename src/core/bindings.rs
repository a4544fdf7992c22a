//! Reactive Symbol Extractor (§4.2).
//!
//! Scans one file's tree for state bindings (paired value/setter), ref
//! bindings, and memoized bindings, recognizing the hook-destructuring
//! shapes named in §4.2. Every destructuring pattern is traversed
//! recursively so nested array/object/rest/default patterns all yield their
//! leaf identifiers.

use swc_common::spanned::Spanned;
use swc_ecma_ast::{ArrayPat, AssignPat, Callee, Expr, Module, ObjectPatProp, Pat, VarDeclarator};
use swc_ecma_visit::{Visit, VisitWith};

use crate::utils::is_setter_name;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateBinding {
    pub state: String,
    pub setter: String,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefBinding {
    pub name: String,
    pub line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoKind {
    Value,
    Callback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoBinding {
    pub name: String,
    pub kind: MemoKind,
    pub line: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ReactiveSymbols {
    pub state: Vec<StateBinding>,
    pub refs: Vec<RefBinding>,
    pub memos: Vec<MemoBinding>,
}

impl ReactiveSymbols {
    pub fn setter_for_state(&self, state: &str) -> Option<&str> {
        self.state
            .iter()
            .find(|b| b.state == state)
            .map(|b| b.setter.as_str())
    }

    pub fn state_for_setter(&self, setter: &str) -> Option<&str> {
        self.state
            .iter()
            .find(|b| b.setter == setter)
            .map(|b| b.state.as_str())
    }

    pub fn is_state(&self, name: &str) -> bool {
        self.state.iter().any(|b| b.state == name)
    }

    pub fn is_setter(&self, name: &str) -> bool {
        self.state.iter().any(|b| b.setter == name)
    }

    pub fn is_ref(&self, name: &str) -> bool {
        self.refs.iter().any(|r| r.name == name)
    }

    pub fn is_memo(&self, name: &str) -> bool {
        self.memos.iter().any(|m| m.name == name)
    }
}

/// Recursively collect every leaf identifier bound by a destructuring
/// pattern, in left-to-right order (identifier, array pattern, object
/// pattern, rest, default all handled).
pub fn extract_binding_names(pat: &Pat) -> Vec<String> {
    let mut out = Vec::new();
    collect_pat_names(pat, &mut out);
    out
}

fn collect_pat_names(pat: &Pat, out: &mut Vec<String>) {
    match pat {
        Pat::Ident(ident) => out.push(ident.id.sym.to_string()),
        Pat::Array(ArrayPat { elems, .. }) => {
            for elem in elems.iter().flatten() {
                collect_pat_names(elem, out);
            }
        }
        Pat::Object(obj) => {
            for prop in &obj.props {
                match prop {
                    ObjectPatProp::KeyValue(kv) => collect_pat_names(&kv.value, out),
                    ObjectPatProp::Assign(a) => out.push(a.key.id.sym.to_string()),
                    ObjectPatProp::Rest(r) => collect_pat_names(&r.arg, out),
                }
            }
        }
        Pat::Rest(rest) => collect_pat_names(&rest.arg, out),
        Pat::Assign(AssignPat { left, .. }) => collect_pat_names(left, out),
        Pat::Invalid(_) | Pat::Expr(_) => {}
    }
}

/// Callee name of a call expression, following member expressions so
/// `Ns.useMemo(...)` resolves to `useMemo` (§4.2's "including namespaced
/// member form" rule).
pub fn call_callee_name(expr: &Expr) -> Option<String> {
    let Expr::Call(call) = expr else { return None };
    let Callee::Expr(callee_expr) = &call.callee else {
        return None;
    };
    match &**callee_expr {
        Expr::Ident(ident) => Some(ident.sym.to_string()),
        Expr::Member(member) => match &member.prop {
            swc_ecma_ast::MemberProp::Ident(name) => Some(name.sym.to_string()),
            _ => None,
        },
        _ => None,
    }
}

struct SymbolVisitor<'a> {
    source_map: &'a swc_common::SourceMap,
    symbols: ReactiveSymbols,
}

impl Visit for SymbolVisitor<'_> {
    fn visit_var_declarator(&mut self, node: &VarDeclarator) {
        if let Some(init) = &node.init {
            self.check_declarator(&node.name, init);
        }
        node.visit_children_with(self);
    }
}

impl SymbolVisitor<'_> {
    fn line_of(&self, span: swc_common::Span) -> usize {
        self.source_map.lookup_char_pos(span.lo).line
    }

    fn check_declarator(&mut self, pat: &Pat, init: &Expr) {
        let Some(callee) = call_callee_name(init) else {
            return;
        };
        let line = self.line_of(init.span());

        match callee.as_str() {
            "useState" | "useReducer" => {
                if let Pat::Array(ArrayPat { elems, .. }) = pat {
                    let names: Vec<Option<String>> = elems
                        .iter()
                        .map(|e| e.as_ref().and_then(as_leaf_ident))
                        .collect();
                    if let (Some(Some(state)), Some(Some(setter))) =
                        (names.first(), names.get(1))
                    {
                        self.symbols.state.push(StateBinding {
                            state: state.clone(),
                            setter: setter.clone(),
                            line,
                        });
                    } else if let Some(Some(setter)) = names.get(1) {
                        // Custom-hook-setter convention: `[a, setSomething]`
                        // even when `a` itself is a nested pattern.
                        if is_setter_name(setter) {
                            if let Some(state_name) = names.first().cloned().flatten() {
                                self.symbols.state.push(StateBinding {
                                    state: state_name,
                                    setter: setter.clone(),
                                    line,
                                });
                            }
                        }
                    }
                }
            }
            "useRef" => {
                if let Some(name) = as_leaf_ident(pat) {
                    self.symbols.refs.push(RefBinding { name, line });
                }
            }
            "useMemo" => {
                if let Some(name) = as_leaf_ident(pat) {
                    self.symbols.memos.push(MemoBinding {
                        name,
                        kind: MemoKind::Value,
                        line,
                    });
                }
            }
            "useCallback" => {
                if let Some(name) = as_leaf_ident(pat) {
                    self.symbols.memos.push(MemoBinding {
                        name,
                        kind: MemoKind::Callback,
                        line,
                    });
                }
            }
            "useContext" => {
                if let Pat::Object(_) = pat {
                    let names = extract_binding_names(pat);
                    // Pair each `setX` with its derived `X` if both present.
                    for name in &names {
                        if is_setter_name(name) {
                            if let Some(state) = crate::utils::setter_to_state_name(name) {
                                if names.contains(&state) {
                                    self.symbols.state.push(StateBinding {
                                        state,
                                        setter: name.clone(),
                                        line,
                                    });
                                }
                            }
                        }
                    }
                }
            }
            other if crate::utils::is_hook_name(other) && other != "useState" => {
                // Generic custom-hook-setter convention, beyond useState
                // itself: `const [value, setValue] = useToggle(...)`.
                if let Pat::Array(ArrayPat { elems, .. }) = pat {
                    if let (Some(Some(state)), Some(Some(setter))) = (
                        elems.first().and_then(|e| e.as_ref().and_then(as_leaf_ident)),
                        elems.get(1).and_then(|e| e.as_ref().and_then(as_leaf_ident)),
                    ) {
                        if is_setter_name(&setter) {
                            self.symbols.state.push(StateBinding {
                                state,
                                setter,
                                line,
                            });
                        }
                    }
                }
            }
            _ => {}
        }
    }
}

fn as_leaf_ident(pat: &Pat) -> Option<String> {
    match pat {
        Pat::Ident(i) => Some(i.id.sym.to_string()),
        Pat::Assign(a) => as_leaf_ident(&a.left),
        _ => None,
    }
}

pub fn extract_reactive_symbols(module: &Module, source_map: &swc_common::SourceMap) -> ReactiveSymbols {
    let mut visitor = SymbolVisitor {
        source_map,
        symbols: ReactiveSymbols::default(),
    };
    module.visit_with(&mut visitor);
    visitor.symbols
}
