//! Effect-without-dependency-list detector (RLD-201, §4.9).
//!
//! An effect-kind call with exactly one argument runs after every render.
//! If its body invokes a setter directly, or calls a locally declared
//! helper whose own summary lists setters, that is an unbounded loop.

use std::collections::HashSet;

use crate::core::bindings::ReactiveSymbols;
use crate::core::body::{self, StateInteraction};
use crate::core::hooks::{HookKind, HookSite};
use crate::core::imports::CrossFileGraph;
use crate::issues::{Confidence, Diagnostic, ErrorCode, Severity};

fn is_effect_kind(kind: HookKind) -> bool {
    matches!(kind, HookKind::Effect | HookKind::LayoutEffect)
}

pub fn check(
    sites: &[HookSite],
    file: &str,
    symbols: &ReactiveSymbols,
    source_map: &swc_common::SourceMap,
    cross_file: &CrossFileGraph,
    deferred_overrides: &HashSet<String>,
) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for site in sites {
        if !is_effect_kind(site.kind) || site.call.args.len() != 1 {
            continue;
        }
        let interaction = body::analyze_body(&site.body, symbols, source_map, deferred_overrides);
        if let Some(diagnostic) = evaluate(site, &interaction, file, cross_file) {
            out.push(diagnostic);
        }
    }
    out
}

fn evaluate(
    site: &HookSite,
    interaction: &StateInteraction,
    file: &str,
    cross_file: &CrossFileGraph,
) -> Option<Diagnostic> {
    let direct = !interaction.direct_modifications.is_empty();
    let indirect = interaction
        .calls
        .iter()
        .any(|call| cross_file.resolve_call(file, call).is_some_and(|s| !s.setters_invoked.is_empty()));

    if !direct && !indirect {
        return None;
    }
    let confidence = if direct { Confidence::High } else { Confidence::Medium };
    let setter = interaction
        .direct_modifications
        .first()
        .cloned()
        .unwrap_or_default();
    let explanation = format!(
        "{} has no dependency list and {} state, so it runs after every render.",
        site.kind.as_str(),
        if direct { "modifies" } else { "indirectly modifies" }
    );
    Some(
        Diagnostic::new(
            ErrorCode::EffectMissingDeps,
            file,
            site.line,
            site.column,
            site.kind.as_str(),
            setter.clone(),
            Severity::High,
            confidence,
            explanation,
        )
        .with_setter(setter)
        .with_modifications(interaction.direct_modifications.clone()),
    )
}
