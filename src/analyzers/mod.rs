// SPDX-License-Identifier: PMPL-1.0-or-later
//! Static auditors run against a (markup, stylesheet) pair.
//!
//! Each auditor inspects the tokenized stylesheet, optionally consulting the
//! annotated markup, and reports violations. Auditors never fail: anything
//! they cannot analyze is skipped.

pub mod contrast;
pub mod visibility;

use crate::markup::AnnotatedMarkup;
use crate::stylesheet::StyleSheet;
use crate::violation::Violation;

/// Trait implemented by all auditors
pub trait Auditor: Send + Sync {
    /// Human-readable name of this auditor
    fn name(&self) -> &str;

    /// Short description of what this auditor checks
    fn description(&self) -> &str;

    /// Audit one markup/stylesheet pair
    fn audit(&self, markup: &AnnotatedMarkup, sheet: &StyleSheet) -> Vec<Violation>;
}

/// Run every auditor in order and concatenate their violations
pub fn run_auditors(
    auditors: &[Box<dyn Auditor>],
    markup: &AnnotatedMarkup,
    sheet: &StyleSheet,
) -> Vec<Violation> {
    let mut violations = Vec::new();
    for auditor in auditors {
        let found = auditor.audit(markup, sheet);
        tracing::debug!(auditor = auditor.name(), violations = found.len(), "Audit finished");
        violations.extend(found);
    }
    violations
}
