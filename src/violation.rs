// SPDX-License-Identifier: PMPL-1.0-or-later
//! Violation, patch and result types shared by the auditors, the fixer and
//! the validator.
//!
//! All of these are plain values: created per validation call, serialisable
//! for reports, and never held by the engine afterwards.

use serde::{Deserialize, Serialize};

/// Severity of a detected defect
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Fails validation
    Error,
    /// Reported and scored, but does not fail validation
    Warning,
}

impl Severity {
    /// Whether this severity fails validation
    pub fn fails_validation(&self) -> bool {
        matches!(self, Severity::Error)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Warning => write!(f, "WARNING"),
        }
    }
}

/// WCAG conformance level used for contrast thresholds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WcagLevel {
    /// Level AA - standard conformance
    #[default]
    AA,
    /// Level AAA - enhanced conformance
    AAA,
}

impl WcagLevel {
    /// Minimum contrast ratio for text at this level
    pub fn text_threshold(&self, large_text: bool) -> f64 {
        match (self, large_text) {
            (WcagLevel::AA, false) => 4.5,
            (WcagLevel::AA, true) => 3.0,
            (WcagLevel::AAA, false) => 7.0,
            (WcagLevel::AAA, true) => 4.5,
        }
    }
}

impl std::fmt::Display for WcagLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WcagLevel::AA => write!(f, "AA"),
            WcagLevel::AAA => write!(f, "AAA"),
        }
    }
}

/// Category of a violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    ContrastRatio,
    Visibility,
    FontSize,
    ProtectedElement,
}

impl ViolationKind {
    /// Stable identifier used as the rule id in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::ContrastRatio => "contrast_ratio",
            ViolationKind::Visibility => "visibility",
            ViolationKind::FontSize => "font_size",
            ViolationKind::ProtectedElement => "protected_element",
        }
    }
}

impl std::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The declaration pattern behind a visibility violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityCause {
    DisplayNone,
    VisibilityHidden,
    ZeroOpacity,
    NegativeZIndex,
    OffScreen,
    MissingCtaStyling,
}

/// A detected accessibility or visibility defect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    #[serde(rename = "type")]
    pub kind: ViolationKind,
    pub severity: Severity,
    /// Selector of the offending element or rule
    pub element: String,
    pub message: String,
    pub auto_fixable: bool,
    /// Set by the visibility auditor; absent on violations built elsewhere
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<VisibilityCause>,
}

impl Violation {
    pub fn new(kind: ViolationKind, severity: Severity, element: &str, message: &str) -> Self {
        Self {
            kind,
            severity,
            element: element.to_string(),
            message: message.to_string(),
            auto_fixable: false,
            cause: None,
        }
    }

    /// Mark as mechanically fixable
    pub fn as_fixable(mut self) -> Self {
        self.auto_fixable = true;
        self
    }

    /// Attach the visibility cause
    pub fn with_cause(mut self, cause: VisibilityCause) -> Self {
        self.cause = Some(cause);
        self
    }
}

/// Category of a corrective patch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchKind {
    RaiseContrast,
    ForceVisible,
    EnlargeFont,
    ReinforceProtected,
}

impl std::fmt::Display for PatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PatchKind::RaiseContrast => write!(f, "raise_contrast"),
            PatchKind::ForceVisible => write!(f, "force_visible"),
            PatchKind::EnlargeFont => write!(f, "enlarge_font"),
            PatchKind::ReinforceProtected => write!(f, "reinforce_protected"),
        }
    }
}

/// Literal CSS appended to a stylesheet to neutralise one violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectivePatch {
    #[serde(rename = "type")]
    pub kind: PatchKind,
    pub target: String,
    pub css: String,
}

/// Outcome of validating one stylesheet against one markup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub passed: bool,
    /// 0..=100
    pub score: u32,
    pub issues: Vec<Violation>,
    pub auto_fixes: Vec<CorrectivePatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_css: Option<String>,
}

impl ValidationResult {
    /// Get violations by severity
    pub fn by_severity(&self, severity: Severity) -> Vec<&Violation> {
        self.issues.iter().filter(|v| v.severity == severity).collect()
    }

    /// Get all errors
    pub fn errors(&self) -> Vec<&Violation> {
        self.by_severity(Severity::Error)
    }

    /// Get all warnings
    pub fn warnings(&self) -> Vec<&Violation> {
        self.by_severity(Severity::Warning)
    }

    /// Get violations of a given kind
    pub fn by_kind(&self, kind: ViolationKind) -> Vec<&Violation> {
        self.issues.iter().filter(|v| v.kind == kind).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds() {
        assert_eq!(WcagLevel::AA.text_threshold(false), 4.5);
        assert_eq!(WcagLevel::AA.text_threshold(true), 3.0);
        assert_eq!(WcagLevel::AAA.text_threshold(false), 7.0);
        assert_eq!(WcagLevel::AAA.text_threshold(true), 4.5);
    }

    #[test]
    fn test_violation_serializes_with_wire_names() {
        let v = Violation::new(
            ViolationKind::ContrastRatio,
            Severity::Error,
            "h1",
            "too low",
        )
        .as_fixable();
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["type"], "contrast_ratio");
        assert_eq!(json["severity"], "error");
        assert_eq!(json["autoFixable"], true);
        assert!(json.get("cause").is_none());
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let result = ValidationResult {
            passed: true,
            score: 100,
            ..Default::default()
        };
        let json = serde_json::to_value(&result).unwrap();
        assert!(json["autoFixes"].is_array());
        assert!(json.get("fixedCss").is_none());
    }

    #[test]
    fn test_only_errors_fail() {
        assert!(Severity::Error.fails_validation());
        assert!(!Severity::Warning.fails_validation());
    }
}
