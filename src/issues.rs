//! Diagnostic record and the closed error-code taxonomy.
//!
//! This module defines the single output shape emitted by the verdict engine
//! and the auxiliary detectors. Every error code is bijective with a
//! (kind, severity) combination, so downstream filters (min-severity,
//! min-confidence) have a stable surface to reason about.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Closed set of error codes. New anti-patterns require a new variant here
/// plus an entry in `Category::for_code` - the two are kept in lockstep on
/// purpose so a code can never silently end up uncategorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorCode {
    #[serde(rename = "RLD-100")]
    RenderPhaseSetter,
    #[serde(rename = "RLD-200")]
    EffectDirectLoop,
    #[serde(rename = "RLD-201")]
    EffectMissingDeps,
    #[serde(rename = "RLD-202")]
    LayoutEffectDirectLoop,
    #[serde(rename = "RLD-300")]
    CrossFileLoop,
    #[serde(rename = "RLD-301")]
    CrossFileReview,
    #[serde(rename = "RLD-400")]
    UnstableObjectDep,
    #[serde(rename = "RLD-401")]
    UnstableArrayDep,
    #[serde(rename = "RLD-402")]
    UnstableFunctionDep,
    #[serde(rename = "RLD-403")]
    UnstableCallResultDep,
    #[serde(rename = "RLD-404")]
    ProviderValueUnstable,
    #[serde(rename = "RLD-405")]
    MemoizedElementPropUnstable,
    #[serde(rename = "RLD-407")]
    SyncExternalStoreSnapshotUnstable,
    #[serde(rename = "RLD-410")]
    ObjectSpreadGuardRisk,
    #[serde(rename = "RLD-420")]
    MemoOrCallbackModifiesDependency,
    #[serde(rename = "RLD-501")]
    ConditionalModificationReview,
    #[serde(rename = "RLD-600")]
    RefMutationWithStateValue,
    /// Not a defect: the dependency is demonstrably safe (a functional
    /// updater, a reference-only pass, a deferred dispatch, or a guard that
    /// provably breaks the loop). spec.md's closed error-code table never
    /// names a code for the `safe` category explicitly; this crate reserves
    /// RLD-000 for it so every emitted diagnostic still carries a code.
    #[serde(rename = "RLD-000")]
    SafePattern,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::RenderPhaseSetter => "RLD-100",
            ErrorCode::EffectDirectLoop => "RLD-200",
            ErrorCode::EffectMissingDeps => "RLD-201",
            ErrorCode::LayoutEffectDirectLoop => "RLD-202",
            ErrorCode::CrossFileLoop => "RLD-300",
            ErrorCode::CrossFileReview => "RLD-301",
            ErrorCode::UnstableObjectDep => "RLD-400",
            ErrorCode::UnstableArrayDep => "RLD-401",
            ErrorCode::UnstableFunctionDep => "RLD-402",
            ErrorCode::UnstableCallResultDep => "RLD-403",
            ErrorCode::ProviderValueUnstable => "RLD-404",
            ErrorCode::MemoizedElementPropUnstable => "RLD-405",
            ErrorCode::SyncExternalStoreSnapshotUnstable => "RLD-407",
            ErrorCode::ObjectSpreadGuardRisk => "RLD-410",
            ErrorCode::MemoOrCallbackModifiesDependency => "RLD-420",
            ErrorCode::ConditionalModificationReview => "RLD-501",
            ErrorCode::RefMutationWithStateValue => "RLD-600",
            ErrorCode::SafePattern => "RLD-000",
        }
    }

    /// The category this code always carries. (errorCode, category) pairs
    /// are bijective per spec.md's §3 invariant.
    pub fn category(self) -> Category {
        match self {
            ErrorCode::RenderPhaseSetter
            | ErrorCode::EffectDirectLoop
            | ErrorCode::LayoutEffectDirectLoop => Category::Critical,
            ErrorCode::EffectMissingDeps
            | ErrorCode::CrossFileLoop
            | ErrorCode::CrossFileReview
            | ErrorCode::ObjectSpreadGuardRisk
            | ErrorCode::MemoOrCallbackModifiesDependency
            | ErrorCode::ConditionalModificationReview
            | ErrorCode::RefMutationWithStateValue => Category::Warning,
            ErrorCode::UnstableObjectDep
            | ErrorCode::UnstableArrayDep
            | ErrorCode::UnstableFunctionDep
            | ErrorCode::UnstableCallResultDep
            | ErrorCode::SyncExternalStoreSnapshotUnstable => Category::Performance,
            ErrorCode::ProviderValueUnstable | ErrorCode::MemoizedElementPropUnstable => {
                Category::Critical
            }
            ErrorCode::SafePattern => Category::Safe,
        }
    }
}

/// Diagnostic category, bijective with a set of error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Critical,
    Warning,
    Performance,
    Safe,
}

impl Category {
    /// The `type` discriminant this category renders to in the JSON record.
    pub fn diagnostic_type(self) -> DiagnosticType {
        match self {
            Category::Critical => DiagnosticType::ConfirmedInfiniteLoop,
            Category::Warning | Category::Performance => DiagnosticType::PotentialIssue,
            Category::Safe => DiagnosticType::SafePattern,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticType {
    ConfirmedInfiniteLoop,
    PotentialIssue,
    SafePattern,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// Debug evidence attached to a diagnostic, surfaced only when the caller
/// asks for it (`--verbose` / a `debugInfo` consumer); cheap to always
/// compute since it is just references into strings already held.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DebugInfo {
    pub reason: String,
    pub state_tracking: Vec<String>,
    pub dependency_analysis: Vec<String>,
    pub guard_info: Option<String>,
    pub deferred_info: Option<String>,
    pub cross_file_info: Option<String>,
}

/// A single analysis result, the only thing the engine ever emits (besides
/// the parse-error/internal-warning side channels - see `core::context`).
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    #[serde(rename = "type")]
    pub diagnostic_type: DiagnosticType,
    pub error_code: ErrorCode,
    pub category: Category,
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub hook_type: String,
    pub problematic_dependency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_variable: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub setter_function: Option<String>,
    pub severity: Severity,
    pub confidence: Confidence,
    pub explanation: String,
    pub actual_state_modifications: Vec<String>,
    pub state_reads: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_info: Option<DebugInfo>,
}

impl Diagnostic {
    pub fn new(
        error_code: ErrorCode,
        file: impl Into<String>,
        line: usize,
        column: usize,
        hook_type: impl Into<String>,
        problematic_dependency: impl Into<String>,
        severity: Severity,
        confidence: Confidence,
        explanation: impl Into<String>,
    ) -> Self {
        let category = error_code.category();
        Self {
            diagnostic_type: category.diagnostic_type(),
            error_code,
            category,
            file: file.into(),
            line,
            column,
            hook_type: hook_type.into(),
            problematic_dependency: problematic_dependency.into(),
            state_variable: None,
            setter_function: None,
            severity,
            confidence,
            explanation: explanation.into(),
            actual_state_modifications: Vec::new(),
            state_reads: Vec::new(),
            debug_info: None,
        }
    }

    pub fn with_state(mut self, state_variable: impl Into<String>) -> Self {
        self.state_variable = Some(state_variable.into());
        self
    }

    pub fn with_setter(mut self, setter_function: impl Into<String>) -> Self {
        self.setter_function = Some(setter_function.into());
        self
    }

    pub fn with_modifications(mut self, modifications: Vec<String>) -> Self {
        self.actual_state_modifications = modifications;
        self
    }

    pub fn with_reads(mut self, reads: Vec<String>) -> Self {
        self.state_reads = reads;
        self
    }

    pub fn with_debug_info(mut self, debug_info: DebugInfo) -> Self {
        self.debug_info = Some(debug_info);
        self
    }

    /// Whether this diagnostic meets or exceeds both thresholds - the
    /// exit-code and `--min-severity`/`--min-confidence` filter (§6).
    pub fn meets_threshold(&self, min_severity: Severity, min_confidence: Confidence) -> bool {
        self.severity >= min_severity && self.confidence >= min_confidence
    }
}

/// Deterministic (path, line, column) ordering, per §5's "collected and then
/// sorted by (path, line, column) for deterministic presentation" rule.
impl Ord for Diagnostic {
    fn cmp(&self, other: &Self) -> Ordering {
        self.file
            .cmp(&other.file)
            .then_with(|| self.line.cmp(&other.line))
            .then_with(|| self.column.cmp(&other.column))
            .then_with(|| self.error_code.as_str().cmp(other.error_code.as_str()))
    }
}

impl PartialOrd for Diagnostic {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Diagnostic {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Diagnostic {}

/// A file that failed to parse (§7: "parse failure of an analyzed file").
/// Not a `Diagnostic` - it carries no hook/dependency context - but sorted
/// alongside diagnostics in the final report.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub file: String,
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_category_bijective() {
        assert_eq!(ErrorCode::EffectDirectLoop.category(), Category::Critical);
        assert_eq!(ErrorCode::EffectMissingDeps.category(), Category::Warning);
        assert_eq!(ErrorCode::UnstableObjectDep.category(), Category::Performance);
        assert_eq!(ErrorCode::SafePattern.category(), Category::Safe);
    }

    #[test]
    fn test_diagnostic_type_mapping() {
        assert_eq!(
            Category::Critical.diagnostic_type(),
            DiagnosticType::ConfirmedInfiniteLoop
        );
        assert_eq!(
            Category::Warning.diagnostic_type(),
            DiagnosticType::PotentialIssue
        );
        assert_eq!(
            Category::Performance.diagnostic_type(),
            DiagnosticType::PotentialIssue
        );
        assert_eq!(
            Category::Safe.diagnostic_type(),
            DiagnosticType::SafePattern
        );
    }

    #[test]
    fn test_meets_threshold() {
        let d = Diagnostic::new(
            ErrorCode::EffectDirectLoop,
            "a.tsx",
            1,
            1,
            "effect",
            "n",
            Severity::High,
            Confidence::High,
            "loops",
        );
        assert!(d.meets_threshold(Severity::Medium, Confidence::Medium));
        assert!(d.meets_threshold(Severity::High, Confidence::High));
        let low = Diagnostic::new(
            ErrorCode::RefMutationWithStateValue,
            "a.tsx",
            1,
            1,
            "effect",
            "n",
            Severity::Low,
            Confidence::Low,
            "ref",
        );
        assert!(!low.meets_threshold(Severity::High, Confidence::High));
    }

    #[test]
    fn test_sort_order() {
        let mut diags = vec![
            Diagnostic::new(
                ErrorCode::EffectDirectLoop,
                "b.tsx",
                1,
                1,
                "effect",
                "n",
                Severity::High,
                Confidence::High,
                "x",
            ),
            Diagnostic::new(
                ErrorCode::EffectDirectLoop,
                "a.tsx",
                5,
                1,
                "effect",
                "n",
                Severity::High,
                Confidence::High,
                "x",
            ),
            Diagnostic::new(
                ErrorCode::EffectDirectLoop,
                "a.tsx",
                2,
                1,
                "effect",
                "n",
                Severity::High,
                Confidence::High,
                "x",
            ),
        ];
        diags.sort();
        assert_eq!(diags[0].file, "a.tsx");
        assert_eq!(diags[0].line, 2);
        assert_eq!(diags[1].line, 5);
        assert_eq!(diags[2].file, "b.tsx");
    }

    #[test]
    fn test_error_code_as_str() {
        assert_eq!(ErrorCode::RenderPhaseSetter.as_str(), "RLD-100");
        assert_eq!(ErrorCode::ConditionalModificationReview.as_str(), "RLD-501");
    }
}
