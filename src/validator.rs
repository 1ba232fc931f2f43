// SPDX-License-Identifier: PMPL-1.0-or-later
//! Accessibility validator
//!
//! Runs the auditors over a markup/stylesheet pair, scores the result and
//! optionally produces a corrected stylesheet. Output of sources on the
//! aggressive roster always gets the safeguard block.

use crate::analyzers::contrast::ContrastAuditor;
use crate::analyzers::visibility::VisibilityAuditor;
use crate::analyzers::{run_auditors, Auditor};
use crate::config::ValidatorConfig;
use crate::fixer::{apply_fixes, generate_auto_fixes, safeguard_patch};
use crate::markup::AnnotatedMarkup;
use crate::stylesheet::StyleSheet;
use crate::violation::{Severity, ValidationResult, Violation};
use tracing::debug;

/// Points deducted per error
pub const ERROR_PENALTY: u32 = 15;
/// Points deducted per warning
pub const WARNING_PENALTY: u32 = 5;

/// Score in `[0, 100]` from a list of violations
pub fn calculate_score(issues: &[Violation]) -> u32 {
    issues.iter().fold(100u32, |score, issue| {
        let penalty = match issue.severity {
            Severity::Error => ERROR_PENALTY,
            Severity::Warning => WARNING_PENALTY,
        };
        score.saturating_sub(penalty)
    })
}

/// Validator holding its configuration and auditors
pub struct Validator {
    config: ValidatorConfig,
    auditors: Vec<Box<dyn Auditor>>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidatorConfig::default())
    }
}

impl Validator {
    pub fn new(config: ValidatorConfig) -> Self {
        let auditors: Vec<Box<dyn Auditor>> = vec![
            Box::new(ContrastAuditor::new(config.wcag_level, config.large_text)),
            Box::new(VisibilityAuditor::new(config.cta_elements.clone())),
        ];
        Self { config, auditors }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub fn auditors(&self) -> &[Box<dyn Auditor>] {
        &self.auditors
    }

    /// Whether `source_id` is on the aggressive roster
    pub fn is_aggressive(&self, source_id: &str) -> bool {
        self.config.aggressive_sources.iter().any(|s| s == source_id)
    }

    /// Audit `css` against `markup`. Patches are always computed; the fixed
    /// stylesheet is left unset.
    pub fn validate(&self, markup: &str, css: &str, source_id: Option<&str>) -> ValidationResult {
        let document = AnnotatedMarkup::parse(markup);
        let sheet = StyleSheet::parse(css);

        let issues = run_auditors(&self.auditors, &document, &sheet);
        let mut auto_fixes = generate_auto_fixes(&issues);
        if let Some(id) = source_id.filter(|id| self.is_aggressive(id)) {
            debug!(source = id, "Aggressive source, adding safeguards");
            auto_fixes.push(safeguard_patch());
        }

        let passed = !issues.iter().any(|i| i.severity.fails_validation());
        let score = calculate_score(&issues);
        debug!(issues = issues.len(), score, passed, "Validation complete");

        ValidationResult {
            passed,
            score,
            issues,
            auto_fixes,
            fixed_css: None,
        }
    }

    /// `validate`, then append every patch to the stylesheet
    pub fn validate_and_fix(
        &self,
        markup: &str,
        css: &str,
        source_id: Option<&str>,
    ) -> ValidationResult {
        let mut result = self.validate(markup, css, source_id);
        result.fixed_css = Some(apply_fixes(css, &result.auto_fixes));
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::violation::{PatchKind, ViolationKind};

    const PRICE: &str = r#"<p data-element="price" data-protected="true">$10</p>"#;

    fn issue(severity: Severity) -> Violation {
        Violation::new(ViolationKind::Visibility, severity, "x", "y")
    }

    #[test]
    fn test_score() {
        assert_eq!(calculate_score(&[]), 100);
        assert_eq!(calculate_score(&[issue(Severity::Error)]), 85);
        assert_eq!(
            calculate_score(&[issue(Severity::Error), issue(Severity::Warning)]),
            80
        );
        let many: Vec<_> = (0..8).map(|_| issue(Severity::Error)).collect();
        assert_eq!(calculate_score(&many), 0);
    }

    #[test]
    fn test_clean_input_passes() {
        let result = Validator::default().validate(PRICE, "p { color: #000; background: #fff; }", None);
        assert!(result.passed);
        assert_eq!(result.score, 100);
        assert!(result.issues.is_empty());
        assert!(result.auto_fixes.is_empty());
        assert!(result.fixed_css.is_none());
    }

    #[test]
    fn test_warnings_do_not_fail() {
        let css = r#"[data-element="price"] { z-index: -1; }"#;
        let result = Validator::default().validate(PRICE, css, None);
        assert!(result.passed);
        assert_eq!(result.score, 95);
        assert_eq!(result.warnings().len(), 1);
    }

    #[test]
    fn test_end_to_end_contrast_failure() {
        let css = "h1 { color: #000000; background: #000000; }";
        let result = Validator::default().validate_and_fix(PRICE, css, None);
        assert!(!result.passed);
        assert_eq!(result.score, 85);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.auto_fixes.len(), 1);
        assert_eq!(result.auto_fixes[0].kind, PatchKind::RaiseContrast);
        assert!(result.fixed_css.unwrap().starts_with(css));
    }

    #[test]
    fn test_aggressive_source_gets_safeguards() {
        let validator = Validator::default();
        assert!(validator.is_aggressive("agent_18"));
        assert!(!validator.is_aggressive("agent_1"));

        let result = validator.validate_and_fix(PRICE, "", Some("agent_18"));
        assert!(result.passed);
        assert_eq!(result.score, 100);
        assert_eq!(result.auto_fixes.len(), 1);
        assert_eq!(result.auto_fixes[0].kind, PatchKind::ReinforceProtected);
        assert!(result.fixed_css.unwrap().contains(r#"[data-protected="true"]"#));

        let plain = validator.validate_and_fix(PRICE, "", Some("agent_1"));
        assert_eq!(plain.fixed_css.as_deref(), Some(""));
    }

    #[test]
    fn test_fixed_stylesheet_rescans_without_new_issues() {
        let validator = Validator::default();
        let css = ".cta { color: #777; background: #888; }";
        let first = validator.validate_and_fix(PRICE, css, None);
        assert_eq!(first.issues.len(), 1);

        let fixed = first.fixed_css.clone().unwrap();
        assert!(fixed.contains(".cta::before"));
        let second = validator.validate(PRICE, &fixed, None);
        assert_eq!(second.issues, first.issues);
    }

    #[test]
    fn test_aaa_config() {
        let validator = Validator::new(ValidatorConfig {
            wcag_level: crate::violation::WcagLevel::AAA,
            ..ValidatorConfig::default()
        });
        let result = validator.validate(PRICE, "p { color: #6a6a6a; background: #fff; }", None);
        assert_eq!(result.issues.len(), 1);
        assert!(result.passed);
    }
}
