//! Verdict Engine (§4.8).
//!
//! Combines one hook site's dependency list, its body's `StateInteraction`,
//! the file's stability table, and the run's cross-file graph into at most
//! one diagnostic for the site, plus at most one `RLD-600` ref-mutation
//! diagnostic. The decision table is exact and ordered - see the module
//! doc on each branch below for the corresponding spec step.

use crate::core::bindings::ReactiveSymbols;
use crate::core::body::StateInteraction;
use crate::core::hooks::{HookKind, HookSite};
use crate::core::imports::CrossFileGraph;
use crate::core::stability::{Stability, StabilityTable, UnstableKind};
use crate::issues::{Confidence, Diagnostic, ErrorCode, Severity};

fn can_loop(kind: HookKind) -> bool {
    matches!(kind, HookKind::Effect | HookKind::LayoutEffect)
}

fn direct_loop_code(kind: HookKind) -> ErrorCode {
    if kind == HookKind::LayoutEffect {
        ErrorCode::LayoutEffectDirectLoop
    } else {
        ErrorCode::EffectDirectLoop
    }
}

fn unstable_dep_code(kind: UnstableKind) -> ErrorCode {
    match kind {
        UnstableKind::Object => ErrorCode::UnstableObjectDep,
        UnstableKind::Array => ErrorCode::UnstableArrayDep,
        UnstableKind::Function => ErrorCode::UnstableFunctionDep,
        UnstableKind::CallResult => ErrorCode::UnstableCallResultDep,
    }
}

/// Evaluate one hook site, returning every diagnostic it produces (0-2: the
/// main-table verdict plus an independent ref-mutation warning).
pub fn evaluate_site(
    site: &HookSite,
    interaction: &StateInteraction,
    file: &str,
    symbols: &ReactiveSymbols,
    stability: &StabilityTable,
    cross_file: &CrossFileGraph,
    strict_mode: bool,
) -> Vec<Diagnostic> {
    let loopable = can_loop(site.kind);

    if let Some(pre_check) =
        unstable_reference_pre_check(site, interaction, file, symbols, stability, loopable, strict_mode)
    {
        return vec![pre_check];
    }

    let mut out = Vec::new();
    if let Some(verdict) = run_decision_table(site, interaction, file, symbols, cross_file, loopable) {
        out.push(verdict);
    }
    if let Some(ref_warning) = ref_mutation_side_channel(site, interaction, file) {
        out.push(ref_warning);
    }
    out
}

/// Before the per-dependency table runs, check every dependency that is
/// *not* a state name for an unstable stability classification (§4.8's
/// unstable-reference pre-check). The first match short-circuits the whole
/// site.
fn unstable_reference_pre_check(
    site: &HookSite,
    interaction: &StateInteraction,
    file: &str,
    symbols: &ReactiveSymbols,
    stability: &StabilityTable,
    loopable: bool,
    strict_mode: bool,
) -> Option<Diagnostic> {
    for dep in &site.dependencies {
        if symbols.is_state(dep) {
            continue;
        }
        let Stability::Unstable(kind) = stability.stability_of(dep) else {
            continue;
        };

        if loopable && !interaction.direct_modifications.is_empty() {
            return Some(
                Diagnostic::new(
                    ErrorCode::EffectDirectLoop,
                    file,
                    site.line,
                    site.column,
                    site.kind.as_str(),
                    dep.clone(),
                    Severity::High,
                    Confidence::High,
                    format!(
                        "`{dep}` is recreated on every render and the effect unconditionally calls a setter, so it never stabilizes"
                    ),
                )
                .with_reads(interaction.reads.clone())
                .with_modifications(interaction.direct_modifications.clone()),
            );
        }

        let severity = if loopable || strict_mode { Severity::Medium } else { Severity::Low };
        return Some(
            Diagnostic::new(
                unstable_dep_code(kind),
                file,
                site.line,
                site.column,
                site.kind.as_str(),
                dep.clone(),
                severity,
                Confidence::Medium,
                format!("`{dep}` has a new identity on every render ({})", kind.label()),
            )
            .with_reads(interaction.reads.clone()),
        );
    }
    None
}

/// The ordered per-dependency decision table. Stops at the first
/// dependency that yields a verdict (§4.8's "every site emits at most one
/// diagnostic").
fn run_decision_table(
    site: &HookSite,
    interaction: &StateInteraction,
    file: &str,
    symbols: &ReactiveSymbols,
    cross_file: &CrossFileGraph,
    loopable: bool,
) -> Option<Diagnostic> {
    for dep in &site.dependencies {
        // Step 1.
        let Some(setter) = symbols.setter_for_state(dep) else {
            continue;
        };

        // Step 2.
        if interaction.is_guarded_safe(setter) {
            return Some(safe_pattern(site, file, dep, interaction));
        }

        // Step 3.
        if interaction.spread_risk_guard(setter) {
            return Some(
                Diagnostic::new(
                    ErrorCode::ObjectSpreadGuardRisk,
                    file,
                    site.line,
                    site.column,
                    site.kind.as_str(),
                    dep.clone(),
                    Severity::Medium,
                    Confidence::Medium,
                    format!("the guard for `{setter}` compares a property of `{dep}`, but the update rebuilds the whole object, so an unrelated field left unequal still loops"),
                )
                .with_state(dep.clone())
                .with_setter(setter.to_string())
                .with_reads(interaction.reads.clone()),
            );
        }

        // Step 4.
        if interaction
            .function_reference_passes
            .iter()
            .any(|p| &p.name == dep)
        {
            return Some(safe_pattern(site, file, dep, interaction));
        }

        // Step 5.
        if interaction.deferred_modifications.iter().any(|s| s == setter) {
            return Some(safe_pattern(site, file, dep, interaction));
        }

        // Step 6.
        if interaction.direct_modifications.iter().any(|s| s == setter) {
            if loopable {
                return Some(
                    Diagnostic::new(
                        direct_loop_code(site.kind),
                        file,
                        site.line,
                        site.column,
                        site.kind.as_str(),
                        dep.clone(),
                        Severity::High,
                        Confidence::High,
                        format!("`{setter}` unconditionally updates `{dep}`, which is itself a dependency of this {}", site.kind.as_str()),
                    )
                    .with_state(dep.clone())
                    .with_setter(setter.to_string())
                    .with_modifications(interaction.direct_modifications.clone())
                    .with_reads(interaction.reads.clone()),
                );
            }
            if interaction.functional_updater_setters.iter().any(|s| s == setter) {
                continue;
            }
            return Some(
                Diagnostic::new(
                    ErrorCode::MemoOrCallbackModifiesDependency,
                    file,
                    site.line,
                    site.column,
                    site.kind.as_str(),
                    dep.clone(),
                    Severity::Low,
                    Confidence::Medium,
                    format!("`{setter}` updates `{dep}` inside a {}, recomputing it every time the memoized value changes", site.kind.as_str()),
                )
                .with_state(dep.clone())
                .with_setter(setter.to_string())
                .with_modifications(interaction.direct_modifications.clone()),
            );
        }

        // Step 7.
        let reaches = interaction
            .calls
            .iter()
            .any(|call| cross_file.reaches_setter_from_call(file, call, setter));
        if reaches {
            let (code, severity, confidence) = if loopable {
                (ErrorCode::CrossFileLoop, Severity::High, Confidence::Medium)
            } else {
                (ErrorCode::CrossFileReview, Severity::Low, Confidence::Low)
            };
            return Some(
                Diagnostic::new(
                    code,
                    file,
                    site.line,
                    site.column,
                    site.kind.as_str(),
                    dep.clone(),
                    severity,
                    confidence,
                    format!("a function called in this {} transitively invokes `{setter}`", site.kind.as_str()),
                )
                .with_state(dep.clone())
                .with_setter(setter.to_string()),
            );
        }

        // Step 8.
        if loopable && interaction.conditional_modifications.iter().any(|s| s == setter) {
            return Some(
                Diagnostic::new(
                    ErrorCode::ConditionalModificationReview,
                    file,
                    site.line,
                    site.column,
                    site.kind.as_str(),
                    dep.clone(),
                    Severity::Medium,
                    Confidence::Medium,
                    format!("`{setter}` conditionally updates `{dep}` under a condition this analyzer could not prove breaks the loop"),
                )
                .with_state(dep.clone())
                .with_setter(setter.to_string())
                .with_modifications(interaction.conditional_modifications.clone()),
            );
        }

        // Step 9: only reads, no diagnostic for this dependency.
    }
    None
}

fn safe_pattern(site: &HookSite, file: &str, dep: &str, interaction: &StateInteraction) -> Diagnostic {
    Diagnostic::new(
        ErrorCode::SafePattern,
        file,
        site.line,
        site.column,
        site.kind.as_str(),
        dep.to_string(),
        Severity::Low,
        Confidence::High,
        format!("`{dep}` is updated through a pattern that demonstrably breaks the loop"),
    )
    .with_state(dep.to_string())
    .with_reads(interaction.reads.clone())
}

/// §4.8's ref-mutation side-channel: independent of the main table, fires
/// when a ref is written using a state value and that ref also appears in
/// the dependency list (a common source of stale-closure workarounds that
/// themselves re-render).
fn ref_mutation_side_channel(site: &HookSite, interaction: &StateInteraction, file: &str) -> Option<Diagnostic> {
    let hit = interaction
        .ref_mutations
        .iter()
        .find(|m| m.uses_state_value && site.dependencies.contains(&m.ref_name))?;
    Some(
        Diagnostic::new(
            ErrorCode::RefMutationWithStateValue,
            file,
            hit.line,
            site.column,
            site.kind.as_str(),
            hit.ref_name.clone(),
            Severity::Low,
            Confidence::Low,
            format!("`{}.current` is written from a state value and `{}` is also a dependency of this {}", hit.ref_name, hit.ref_name, site.kind.as_str()),
        )
        .with_reads(interaction.reads.clone()),
    )
}
