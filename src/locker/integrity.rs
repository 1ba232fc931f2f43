// SPDX-License-Identifier: PMPL-1.0-or-later
//! Integrity validation of candidate markup against locked markup
//!
//! Protected elements are compared by identifier. Locked-text elements are
//! compared by position so that reordering is caught as well as editing.
//! Breaches are reported, never repaired.

use crate::locker::LockedMarkup;
use crate::markup::AnnotatedMarkup;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// A divergence between locked and candidate markup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntegrityViolation {
    /// Text of a protected element differs
    ProtectedModified { element: String },
    /// A protected element is gone from the candidate
    ProtectedMissing { element: String },
    /// A protected element lost its `data-protected` flag
    ProtectedUnflagged { element: String },
    /// Locked-text elements were added or removed
    LockedTextCountChanged { expected: usize, found: usize },
    /// Locked text at `position` (document order, from 0) differs
    LockedTextModified { position: usize },
}

impl fmt::Display for IntegrityViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityViolation::ProtectedModified { element } => {
                write!(f, "Protected element \"{}\" content was modified", element)
            }
            IntegrityViolation::ProtectedMissing { element } => {
                write!(f, "Protected element \"{}\" was removed", element)
            }
            IntegrityViolation::ProtectedUnflagged { element } => {
                write!(f, "Protected element \"{}\" lost its protection flag", element)
            }
            IntegrityViolation::LockedTextCountChanged { expected, found } => write!(
                f,
                "Number of locked text elements changed ({} -> {})",
                expected, found
            ),
            IntegrityViolation::LockedTextModified { position } => {
                write!(f, "Locked text at position {} was modified", position)
            }
        }
    }
}

/// Outcome of an integrity check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityReport {
    pub valid: bool,
    pub violations: Vec<IntegrityViolation>,
}

impl IntegrityReport {
    fn from_violations(violations: Vec<IntegrityViolation>) -> Self {
        Self {
            valid: violations.is_empty(),
            violations,
        }
    }
}

/// Check `candidate` against the locked markup
pub fn validate_integrity(original: &LockedMarkup, candidate: &str) -> IntegrityReport {
    if original.matches_fingerprint(candidate) {
        return IntegrityReport::from_violations(Vec::new());
    }

    let before = AnnotatedMarkup::parse(original.markup());
    let after = AnnotatedMarkup::parse(candidate);
    let still_protected = after.protected_ids();
    let expected_texts = before.locked_texts();
    let found_texts = after.locked_texts();
    let count_changed = expected_texts.len() != found_texts.len();
    // a deleted locked-text element is reported once, as the count change
    let locked_ids = before.locked_text_ids();

    let mut violations = Vec::new();
    for element in original.protected_elements() {
        let Some(expected) = before.element_text(element) else {
            continue;
        };
        match after.element_text(element) {
            None if count_changed && locked_ids.contains(element) => {}
            None => violations.push(IntegrityViolation::ProtectedMissing {
                element: element.clone(),
            }),
            Some(found) => {
                if found != expected {
                    violations.push(IntegrityViolation::ProtectedModified {
                        element: element.clone(),
                    });
                }
                if !still_protected.contains(element) {
                    violations.push(IntegrityViolation::ProtectedUnflagged {
                        element: element.clone(),
                    });
                }
            }
        }
    }

    if count_changed {
        violations.push(IntegrityViolation::LockedTextCountChanged {
            expected: expected_texts.len(),
            found: found_texts.len(),
        });
    } else {
        violations.extend(
            expected_texts
                .iter()
                .zip(&found_texts)
                .enumerate()
                .filter(|(_, (a, b))| a != b)
                .map(|(position, _)| IntegrityViolation::LockedTextModified { position }),
        );
    }

    if !violations.is_empty() {
        warn!(
            locked = %original.id(),
            violations = violations.len(),
            "Integrity breach in candidate markup"
        );
    }
    IntegrityReport::from_violations(violations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locker::{ContentLocker, ContentRequirements, MediaKind};
    use std::collections::BTreeMap;

    fn landing_page() -> LockedMarkup {
        let values: BTreeMap<String, String> = [
            ("headline", "Fresh Coffee"),
            ("subheadline", "Roasted daily"),
            ("description", "Single origin beans"),
            ("price", "$12"),
            ("cta_text", "Order now"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        ContentLocker::default().lock(&ContentRequirements::default(), MediaKind::Lp, &values)
    }

    #[test]
    fn test_unmodified_copy_is_valid() {
        let locked = landing_page();
        let copy = locked.markup().to_string();
        assert_eq!(
            validate_integrity(&locked, &copy),
            IntegrityReport {
                valid: true,
                violations: vec![]
            }
        );
    }

    #[test]
    fn test_restyled_attributes_are_fine() {
        let locked = landing_page();
        let candidate = locked
            .markup()
            .replace("class=\"lp\"", "class=\"lp neon\" style=\"color: red\"");
        assert!(validate_integrity(&locked, &candidate).valid);
    }

    #[test]
    fn test_edited_locked_text_is_positional() {
        let locked = landing_page();
        let candidate = locked.markup().replace("Roasted daily", "Roasted weekly");
        let report = validate_integrity(&locked, &candidate);
        assert!(!report.valid);
        assert_eq!(
            report.violations,
            vec![IntegrityViolation::LockedTextModified { position: 1 }]
        );
    }

    #[test]
    fn test_deleted_locked_text_changes_count() {
        let locked = landing_page();
        let start = locked.markup().find("<p data-element=\"subheadline\"").unwrap();
        let end = start + locked.markup()[start..].find("</p>").unwrap() + "</p>".len();
        let candidate = format!("{}{}", &locked.markup()[..start], &locked.markup()[end..]);

        let report = validate_integrity(&locked, &candidate);
        assert_eq!(
            report.violations,
            vec![IntegrityViolation::LockedTextCountChanged {
                expected: 4,
                found: 3
            }]
        );
        assert_eq!(
            report.violations[0].to_string(),
            "Number of locked text elements changed (4 -> 3)"
        );
    }

    #[test]
    fn test_deleted_protected_locked_text_is_one_count_change() {
        let locked = landing_page();
        let start = locked.markup().find("<p data-element=\"price\"").unwrap();
        let end = start + locked.markup()[start..].find("</p>").unwrap() + "</p>".len();
        let candidate = format!("{}{}", &locked.markup()[..start], &locked.markup()[end..]);

        let report = validate_integrity(&locked, &candidate);
        assert_eq!(
            report.violations,
            vec![IntegrityViolation::LockedTextCountChanged {
                expected: 4,
                found: 3
            }]
        );
    }

    #[test]
    fn test_text_injected_into_child_is_caught() {
        let locked = landing_page();
        let candidate = locked
            .markup()
            .replace(">$12</p>", ">$12<span> was $5, now FREE</span></p>");
        let report = validate_integrity(&locked, &candidate);
        assert_eq!(
            report.violations,
            vec![IntegrityViolation::LockedTextModified { position: 3 }]
        );
    }

    #[test]
    fn test_reordered_locked_text_is_caught() {
        let locked = landing_page();
        let candidate = locked
            .markup()
            .replace("Fresh Coffee", "@@")
            .replace("Roasted daily", "Fresh Coffee")
            .replace("@@", "Roasted daily");
        let report = validate_integrity(&locked, &candidate);
        assert_eq!(
            report.violations,
            vec![
                IntegrityViolation::LockedTextModified { position: 0 },
                IntegrityViolation::LockedTextModified { position: 1 },
            ]
        );
    }

    #[test]
    fn test_protected_edit_is_reported_by_name() {
        let locked = landing_page();
        let candidate = locked.markup().replace("Order now", "Maybe later");
        let report = validate_integrity(&locked, &candidate);
        assert_eq!(
            report.violations,
            vec![IntegrityViolation::ProtectedModified {
                element: "cta".into()
            }]
        );
    }

    #[test]
    fn test_removed_protected_element() {
        let locked = landing_page();
        let start = locked.markup().find("<button").unwrap();
        let end = locked.markup().find("</button>").unwrap() + "</button>".len();
        let candidate = format!("{}{}", &locked.markup()[..start], &locked.markup()[end..]);
        let report = validate_integrity(&locked, &candidate);
        assert_eq!(
            report.violations,
            vec![IntegrityViolation::ProtectedMissing {
                element: "cta".into()
            }]
        );
    }

    #[test]
    fn test_stripped_protection_flag() {
        let locked = landing_page();
        let candidate = locked.markup().replace(
            "<button data-element=\"cta\" data-protected=\"true\">",
            "<button data-element=\"cta\">",
        );
        let report = validate_integrity(&locked, &candidate);
        assert_eq!(
            report.violations,
            vec![IntegrityViolation::ProtectedUnflagged {
                element: "cta".into()
            }]
        );
    }
}
