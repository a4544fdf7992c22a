//! Render-phase setter detector (RLD-100, §4.9).
//!
//! Within every component-convention-named function, a setter call reached
//! without crossing into a nested function expression/declaration or a
//! hook's callback argument runs on every render and is a guaranteed loop.

use swc_common::spanned::Spanned;
use swc_ecma_ast::{ArrowExpr, BlockStmt, BlockStmtOrExpr, FnDecl, Function, Module, VarDeclarator};
use swc_ecma_visit::{Visit, VisitWith};

use crate::core::bindings::{ReactiveSymbols, call_callee_name, extract_binding_names};
use crate::issues::{Confidence, Diagnostic, ErrorCode, Severity};
use crate::utils::is_component_name;

struct ComponentFinder<'a> {
    symbols: &'a ReactiveSymbols,
    source_map: &'a swc_common::SourceMap,
    file: &'a str,
    pending_name: Option<String>,
    diagnostics: Vec<Diagnostic>,
}

impl ComponentFinder<'_> {
    fn scan_body(&mut self, component_name: &str, body: &BlockStmt) {
        let mut walker = BodyWalker {
            symbols: self.symbols,
            source_map: self.source_map,
            nested_fn_depth: 0,
            hits: Vec::new(),
        };
        body.visit_with(&mut walker);
        for (line, column, setter) in walker.hits {
            let explanation = format!(
                "'{setter}' is called directly in the render body of '{component_name}', which re-invokes render on every call."
            );
            self.diagnostics.push(
                Diagnostic::new(
                    ErrorCode::RenderPhaseSetter,
                    self.file,
                    line,
                    column,
                    "render",
                    setter.clone(),
                    Severity::High,
                    Confidence::High,
                    explanation,
                )
                .with_setter(setter),
            );
        }
    }
}

impl Visit for ComponentFinder<'_> {
    fn visit_var_declarator(&mut self, node: &VarDeclarator) {
        let candidate = extract_binding_names(&node.name).into_iter().next();
        let saved = self.pending_name.take();
        self.pending_name = candidate;
        node.visit_children_with(self);
        self.pending_name = saved;
    }

    fn visit_fn_decl(&mut self, node: &FnDecl) {
        let name = node.ident.sym.to_string();
        if is_component_name(&name) {
            if let Some(body) = &node.function.body {
                self.scan_body(&name, body);
            }
        }
        node.function.visit_children_with(self);
    }

    fn visit_function(&mut self, node: &Function) {
        let name = self.pending_name.take();
        if let Some(name) = name.as_deref() {
            if is_component_name(name) {
                if let Some(body) = &node.body {
                    self.scan_body(name, body);
                }
            }
        }
        node.visit_children_with(self);
    }

    fn visit_arrow_expr(&mut self, node: &ArrowExpr) {
        let name = self.pending_name.take();
        if let Some(name) = name.as_deref() {
            if is_component_name(name) {
                if let BlockStmtOrExpr::BlockStmt(body) = &*node.body {
                    self.scan_body(name, body);
                }
            }
        }
        node.visit_children_with(self);
    }
}

/// Walks one component body, stopping at nested function boundaries (an
/// arrow passed to a hook is itself such a boundary - it never runs during
/// the render pass proper).
struct BodyWalker<'a> {
    symbols: &'a ReactiveSymbols,
    source_map: &'a swc_common::SourceMap,
    nested_fn_depth: usize,
    hits: Vec<(usize, usize, String)>,
}

impl Visit for BodyWalker<'_> {
    fn visit_function(&mut self, node: &Function) {
        self.nested_fn_depth += 1;
        node.visit_children_with(self);
        self.nested_fn_depth -= 1;
    }

    fn visit_arrow_expr(&mut self, node: &ArrowExpr) {
        self.nested_fn_depth += 1;
        node.visit_children_with(self);
        self.nested_fn_depth -= 1;
    }

    fn visit_call_expr(&mut self, node: &swc_ecma_ast::CallExpr) {
        if self.nested_fn_depth == 0 {
            if let Some(name) = call_callee_name(&swc_ecma_ast::Expr::Call(node.clone())) {
                if self.symbols.is_setter(&name) {
                    let loc = self.source_map.lookup_char_pos(node.span().lo);
                    self.hits.push((loc.line, loc.col.0 + 1, name));
                }
            }
        }
        node.visit_children_with(self);
    }
}

pub fn check(
    module: &Module,
    source_map: &swc_common::SourceMap,
    symbols: &ReactiveSymbols,
    file: &str,
) -> Vec<Diagnostic> {
    let mut finder = ComponentFinder {
        symbols,
        source_map,
        file,
        pending_name: None,
        diagnostics: Vec::new(),
    };
    module.visit_with(&mut finder);
    finder.diagnostics
}
