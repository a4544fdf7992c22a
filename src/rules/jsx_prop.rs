//! JSX-prop instability detector (RLD-404/RLD-405, §4.9).
//!
//! Two independent checks over every JSX opening element: a context
//! provider's `value` attribute receiving a fresh object/array/function each
//! render defeats every consumer's memoization (RLD-404); a prop passed to
//! a component known to be wrapped in a memoization combinator does the
//! same for that component's own memo boundary (RLD-405).

use swc_common::spanned::Spanned;
use swc_ecma_ast::{
    Expr, JSXAttrName, JSXAttrOrSpread, JSXAttrValue, JSXElement, JSXElementName, JSXExpr,
    JSXObject, VarDeclarator,
};
use swc_ecma_visit::{Visit, VisitWith};

use crate::core::bindings::call_callee_name;
use crate::core::stability::{Stability, StabilityTable};
use crate::issues::{Confidence, Diagnostic, ErrorCode, Severity};

const IGNORED_PROPS: &[&str] = &["key", "ref", "children"];

struct MemoCollector {
    names: Vec<String>,
}

impl Visit for MemoCollector {
    fn visit_var_declarator(&mut self, node: &VarDeclarator) {
        if let (swc_ecma_ast::Pat::Ident(ident), Some(init)) = (&node.name, &node.init) {
            if wraps_in_memo(init) {
                self.names.push(ident.id.sym.to_string());
            }
        }
        node.visit_children_with(self);
    }
}

fn wraps_in_memo(expr: &Expr) -> bool {
    let Expr::Call(call) = expr else { return false };
    call_callee_name(&Expr::Call(call.clone())).as_deref() == Some("memo")
}

fn memoized_component_names(module: &swc_ecma_ast::Module) -> Vec<String> {
    let mut collector = MemoCollector { names: Vec::new() };
    module.visit_with(&mut collector);
    collector.names
}

struct JsxVisitor<'a> {
    source_map: &'a swc_common::SourceMap,
    stability: &'a StabilityTable,
    memoized: &'a [String],
    file: &'a str,
    diagnostics: Vec<Diagnostic>,
}

impl JsxVisitor<'_> {
    fn line_col(&self, span: swc_common::Span) -> (usize, usize) {
        let loc = self.source_map.lookup_char_pos(span.lo);
        (loc.line, loc.col.0 + 1)
    }
}

impl Visit for JsxVisitor<'_> {
    fn visit_jsx_element(&mut self, node: &JSXElement) {
        let element_name = jsx_element_name(&node.opening.name);
        let (line, column) = self.line_col(node.opening.span());

        if let Some(name) = &element_name {
            if name.ends_with(".Provider") {
                if let Some(value_expr) = find_attr_expr(&node.opening.attrs, "value") {
                    if is_unstable_expr(value_expr, self.stability) {
                        self.diagnostics.push(Diagnostic::new(
                            ErrorCode::ProviderValueUnstable,
                            self.file,
                            line,
                            column,
                            "jsx-provider",
                            "value",
                            Severity::High,
                            Confidence::High,
                            format!("{name}'s value prop is a freshly allocated expression each render, invalidating every consumer."),
                        ));
                    }
                }
            } else if starts_uppercase(name) && self.memoized.iter().any(|m| m == name) {
                for attr in &node.opening.attrs {
                    let JSXAttrOrSpread::JSXAttr(attr) = attr else { continue };
                    let JSXAttrName::Ident(prop_ident) = &attr.name else { continue };
                    let prop_name = prop_ident.sym.to_string();
                    if IGNORED_PROPS.contains(&prop_name.as_str()) {
                        continue;
                    }
                    let Some(JSXAttrValue::JSXExprContainer(container)) = &attr.value else {
                        continue;
                    };
                    let JSXExpr::Expr(expr) = &container.expr else { continue };
                    if is_unstable_expr(expr, self.stability) {
                        self.diagnostics.push(Diagnostic::new(
                            ErrorCode::MemoizedElementPropUnstable,
                            self.file,
                            line,
                            column,
                            "jsx-prop",
                            prop_name.clone(),
                            Severity::Medium,
                            Confidence::Medium,
                            format!("Prop '{prop_name}' on memoized component '{name}' receives a freshly allocated expression each render."),
                        ));
                    }
                }
            }
        }

        node.visit_children_with(self);
    }
}

fn jsx_element_name(name: &JSXElementName) -> Option<String> {
    match name {
        JSXElementName::Ident(ident) => Some(ident.sym.to_string()),
        JSXElementName::JSXMemberExpr(member) => Some(extract_member_name(member)),
        JSXElementName::JSXNamespacedName(_) => None,
    }
}

fn extract_member_name(member: &swc_ecma_ast::JSXMemberExpr) -> String {
    let object_name = match &member.obj {
        JSXObject::Ident(ident) => ident.sym.to_string(),
        JSXObject::JSXMemberExpr(nested) => extract_member_name(nested),
    };
    format!("{}.{}", object_name, member.prop.sym)
}

fn starts_uppercase(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_uppercase())
}

fn find_attr_expr<'a>(attrs: &'a [JSXAttrOrSpread], attr_name: &str) -> Option<&'a Expr> {
    attrs.iter().find_map(|attr| {
        let JSXAttrOrSpread::JSXAttr(attr) = attr else { return None };
        let JSXAttrName::Ident(ident) = &attr.name else { return None };
        if ident.sym.as_ref() != attr_name {
            return None;
        }
        let JSXAttrValue::JSXExprContainer(container) = attr.value.as_ref()? else { return None };
        let JSXExpr::Expr(expr) = &container.expr else { return None };
        Some(&**expr)
    })
}

fn is_unstable_expr(expr: &Expr, stability: &StabilityTable) -> bool {
    match expr {
        Expr::Object(_) | Expr::Array(_) | Expr::Arrow(_) | Expr::Fn(_) => true,
        Expr::Paren(p) => is_unstable_expr(&p.expr, stability),
        Expr::Ident(ident) => !matches!(stability.stability_of(&ident.sym), Stability::Stable),
        _ => false,
    }
}

pub fn check(
    module: &swc_ecma_ast::Module,
    source_map: &swc_common::SourceMap,
    stability: &StabilityTable,
    file: &str,
) -> Vec<Diagnostic> {
    let memoized = memoized_component_names(module);
    let mut visitor = JsxVisitor {
        source_map,
        stability,
        memoized: &memoized,
        file,
        diagnostics: Vec::new(),
    };
    module.visit_with(&mut visitor);
    visitor.diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bindings::extract_reactive_symbols;
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
        check(&file.module, &file.source_map, &stability, "Comp.tsx")
    }

    #[test]
    fn test_provider_value_object_literal_flagged() {
        let result = run("function Comp() { return <Ctx.Provider value={{a: 1}}>{children}</Ctx.Provider>; }");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].error_code, ErrorCode::ProviderValueUnstable);
    }

    #[test]
    fn test_provider_value_stable_identifier_not_flagged() {
        let result = run(
            "function Comp() { const value = 5; return <Ctx.Provider value={value}>{children}</Ctx.Provider>; }",
        );
        assert!(result.is_empty());
    }

    #[test]
    fn test_memoized_component_prop_flagged() {
        let result = run(
            "const Item = memo(function Item() { return null; }); function Comp() { return <Item config={{a: 1}} />; }",
        );
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].error_code, ErrorCode::MemoizedElementPropUnstable);
    }

    #[test]
    fn test_non_memoized_component_prop_not_flagged() {
        let result = run("function Comp() { return <Item config={{a: 1}} />; }");
        assert!(result.is_empty());
    }

    #[test]
    fn test_ignored_prop_not_flagged() {
        let result = run(
            "const Item = memo(function Item() { return null; }); function Comp() { return <Item key={{a: 1}} />; }",
        );
        assert!(result.is_empty());
    }
}
