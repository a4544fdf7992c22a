//! Guard Analyzer (§4.7).
//!
//! Given a setter call's immediate enclosing condition (if any), the branch
//! it sits in, and the statements preceding it in the same block, decides
//! whether the guard provably breaks a re-render loop. Returns `None` for
//! unrecognized conditions, leaving the call merely *conditional* (§4.6).

use swc_ecma_ast::{BinaryOp, Expr, ExprOrSpread, Lit, Stmt, UnaryOp};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardKind {
    ToggleGuard,
    EqualityGuard,
    EarlyReturn,
    ObjectSpreadRisk,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Guard {
    pub kind: GuardKind,
    pub is_safe: bool,
}

/// Which branch of the enclosing conditional the setter call sits in. For
/// `a && b`, the right operand is the "truthy" branch of `a`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    Truthy,
    Falsy,
}

/// Analyze one setter call's guard. `condition` is the nearest enclosing
/// if-test, ternary-test, or logical-AND left operand (`None` if the call
/// has no conditional ancestor at all). `preceding_stmts` are the statements
/// before the setter's statement in its immediate enclosing block, used for
/// early-return detection.
pub fn analyze_guard(
    state_name: Option<&str>,
    condition: Option<(&Expr, Branch)>,
    argument: Option<&Expr>,
    preceding_stmts: &[Stmt],
) -> Option<Guard> {
    let state_name = state_name?;

    if let Some((cond, branch)) = condition {
        if let Some(guard) = match_condition(cond, branch, state_name, argument) {
            return Some(guard);
        }
    }

    match_early_return(preceding_stmts, state_name)
}

fn match_condition(cond: &Expr, branch: Branch, state: &str, argument: Option<&Expr>) -> Option<Guard> {
    match cond {
        Expr::Paren(p) => match_condition(&p.expr, branch, state, argument),
        Expr::Bin(bin) if bin.op == BinaryOp::LogicalAnd => {
            // "each side is analyzed; a safe side makes the whole safe" (§4.7).
            match_condition(&bin.left, branch, state, argument)
                .or_else(|| match_condition(&bin.right, branch, state, argument))
        }
        Expr::Unary(unary) if unary.op == UnaryOp::Bang && branch == Branch::Truthy => {
            if is_ident_named(&unary.arg, state) {
                toggle_guard_if_argument_ok(state, argument)
            } else {
                None
            }
        }
        Expr::Ident(ident) if branch == Branch::Truthy && ident.sym.as_ref() == state => {
            // Mirror toggle form: `if (stateVar) setter(falsy-literal)`.
            if argument.is_some_and(is_falsy_literal) {
                Some(Guard {
                    kind: GuardKind::ToggleGuard,
                    is_safe: true,
                })
            } else {
                None
            }
        }
        Expr::Bin(bin) if is_strict_or_loose_neq(bin.op) && branch == Branch::Truthy => {
            match_inequality(bin, state, argument)
        }
        _ => None,
    }
}

fn is_strict_or_loose_neq(op: BinaryOp) -> bool {
    matches!(op, BinaryOp::NotEq | BinaryOp::NotEqEq)
}

fn toggle_guard_if_argument_ok(state: &str, argument: Option<&Expr>) -> Option<Guard> {
    let circular = argument.is_some_and(|a| is_ident_named(a, state));
    if circular {
        None
    } else {
        Some(Guard {
            kind: GuardKind::ToggleGuard,
            is_safe: true,
        })
    }
}

/// `if (stateVar !== rhs)` (equality guard) vs. `if (stateVar.k !== v)`
/// (object-spread risk, only when the setter argument rebuilds a new
/// aggregate from `stateVar`).
fn match_inequality(bin: &swc_ecma_ast::BinExpr, state: &str, argument: Option<&Expr>) -> Option<Guard> {
    let state_is_bare_ident = is_ident_named(&bin.left, state) || is_ident_named(&bin.right, state);
    if state_is_bare_ident {
        return Some(Guard {
            kind: GuardKind::EqualityGuard,
            is_safe: true,
        });
    }

    let compares_property_of_state =
        is_member_of_ident(&bin.left, state) || is_member_of_ident(&bin.right, state);
    if compares_property_of_state && argument.is_some_and(|a| rebuilds_aggregate_from(a, state)) {
        return Some(Guard {
            kind: GuardKind::ObjectSpreadRisk,
            is_safe: false,
        });
    }

    None
}

fn is_ident_named(expr: &Expr, name: &str) -> bool {
    matches!(expr, Expr::Ident(i) if i.sym.as_ref() == name)
}

fn is_member_of_ident(expr: &Expr, name: &str) -> bool {
    matches!(expr, Expr::Member(m) if is_ident_named(&m.obj, name))
}

fn is_falsy_literal(expr: &Expr) -> bool {
    match expr {
        Expr::Lit(Lit::Bool(b)) => !b.value,
        Expr::Lit(Lit::Num(n)) => n.value == 0.0,
        Expr::Lit(Lit::Str(s)) => s.value.is_empty(),
        Expr::Lit(Lit::Null(_)) => true,
        Expr::Ident(i) => matches!(i.sym.as_ref(), "undefined" | "NaN"),
        _ => false,
    }
}

/// Does `expr` syntactically construct a new aggregate that carries
/// `state`'s contents forward (`{...state, k: v}`, `Object.assign({}, state,
/// …)`, `[...state, …]`)?
fn rebuilds_aggregate_from(expr: &Expr, state: &str) -> bool {
    match expr {
        Expr::Object(obj) => obj.props.iter().any(|p| match p {
            swc_ecma_ast::PropOrSpread::Spread(s) => is_ident_named(&s.expr, state),
            _ => false,
        }),
        Expr::Array(arr) => arr.elems.iter().flatten().any(|e: &ExprOrSpread| {
            e.spread.is_some() && is_ident_named(&e.expr, state)
        }),
        Expr::Call(call) => {
            let is_object_assign = matches!(
                &call.callee,
                swc_ecma_ast::Callee::Expr(callee) if matches!(&**callee, Expr::Member(m)
                    if is_ident_named(&m.obj, "Object")
                        && matches!(&m.prop, swc_ecma_ast::MemberProp::Ident(p) if p.sym.as_ref() == "assign"))
            );
            is_object_assign && call.args.iter().any(|a| is_ident_named(&a.expr, state))
        }
        _ => false,
    }
}

/// `if (cond) return;` among the statements preceding the setter call in its
/// block, where `cond` references `state` via identifier, comparison,
/// logical, unary, or member access.
fn match_early_return(preceding_stmts: &[Stmt], state: &str) -> Option<Guard> {
    let found = preceding_stmts.iter().any(|stmt| match stmt {
        Stmt::If(if_stmt) if matches!(&*if_stmt.cons, Stmt::Return(_)) => {
            expr_references_ident(&if_stmt.test, state)
        }
        _ => false,
    });
    found.then_some(Guard {
        kind: GuardKind::EarlyReturn,
        is_safe: true,
    })
}

/// Does `expr` reference `name` anywhere, through identifier, comparison,
/// logical, unary, or member-access positions?
pub fn expr_references_ident(expr: &Expr, name: &str) -> bool {
    match expr {
        Expr::Ident(i) => i.sym.as_ref() == name,
        Expr::Paren(p) => expr_references_ident(&p.expr, name),
        Expr::Unary(u) => expr_references_ident(&u.arg, name),
        Expr::Bin(b) => expr_references_ident(&b.left, name) || expr_references_ident(&b.right, name),
        Expr::Member(m) => is_ident_named(&m.obj, name) || expr_references_ident(&m.obj, name),
        Expr::Cond(c) => {
            expr_references_ident(&c.test, name)
                || expr_references_ident(&c.cons, name)
                || expr_references_ident(&c.alt, name)
        }
        _ => false,
    }
}
