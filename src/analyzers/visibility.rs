// SPDX-License-Identifier: PMPL-1.0-or-later
//! Visibility auditor for protected elements
//!
//! For every `data-protected` element in the markup, the declarations of all
//! rules that plausibly apply to it are checked for ways of hiding or
//! shrinking it. Pseudo-element rules style generated boxes, not the element,
//! and are left out. The call-to-action check additionally asks whether any
//! rule styles the CTA at all.

use crate::analyzers::Auditor;
use crate::markup::{element_selector, AnnotatedMarkup};
use crate::stylesheet::{Declaration, StyleSheet};
use crate::violation::{Severity, Violation, ViolationKind, VisibilityCause};
use regex::Regex;
use std::sync::LazyLock;

static LENGTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(\d+(?:\.\d+)?)(px|em|rem)\b").expect("valid regex"));

static NEGATIVE_PX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-(\d+(?:\.\d+)?)px\b").expect("valid regex"));

static Z_INDEX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(-?\d+)\b").expect("valid regex"));

/// Smallest font size, in px, a protected element may declare
pub const MIN_FONT_SIZE_PX: f64 = 12.0;

/// Offsets beyond this many px in the negative direction count as off-screen
pub const OFF_SCREEN_PX: f64 = 999.0;

const ROOT_FONT_SIZE_PX: f64 = 16.0;

/// Element reference used for the missing CTA styling warning
pub const CTA_ELEMENT: &str = "[data-element='cta']";

/// Identifiers treated as call-to-action elements by default
pub fn default_cta_elements() -> Vec<String> {
    ["cta", "primary_cta", "purchase-button"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Visibility auditor for protected and call-to-action elements
#[derive(Debug, Clone)]
pub struct VisibilityAuditor {
    pub cta_elements: Vec<String>,
}

impl Default for VisibilityAuditor {
    fn default() -> Self {
        Self {
            cta_elements: default_cta_elements(),
        }
    }
}

impl VisibilityAuditor {
    pub fn new(cta_elements: Vec<String>) -> Self {
        Self { cta_elements }
    }

    /// Check each protected element against the rules relevant to it
    pub fn check_protected(&self, markup: &AnnotatedMarkup, sheet: &StyleSheet) -> Vec<Violation> {
        let mut violations = Vec::new();
        let mut seen: Vec<String> = Vec::new();

        for id in markup.protected_ids() {
            if seen.contains(&id) {
                continue;
            }
            let declarations: Vec<&Declaration> = sheet
                .relevant_rules(&id)
                .filter(|rule| !rule.styles_pseudo_element())
                .flat_map(|rule| rule.declarations.iter())
                .collect();
            violations.extend(check_element(&id, &declarations));
            seen.push(id);
        }

        violations
    }

    /// Warn when the markup has a call-to-action but no rule styles one
    pub fn check_cta(&self, markup: &AnnotatedMarkup, sheet: &StyleSheet) -> Vec<Violation> {
        if !markup.contains_any(&self.cta_elements) || sheet.has_cta_rules() {
            return Vec::new();
        }
        vec![Violation::new(
            ViolationKind::Visibility,
            Severity::Warning,
            CTA_ELEMENT,
            "CTA button may not have sufficient styling defined",
        )
        .as_fixable()
        .with_cause(VisibilityCause::MissingCtaStyling)]
    }
}

impl Auditor for VisibilityAuditor {
    fn name(&self) -> &str {
        "Protected Visibility Auditor"
    }

    fn description(&self) -> &str {
        "Checks that protected elements are not hidden, shrunk or pushed off-screen"
    }

    fn audit(&self, markup: &AnnotatedMarkup, sheet: &StyleSheet) -> Vec<Violation> {
        let mut violations = self.check_protected(markup, sheet);
        violations.extend(self.check_cta(markup, sheet));
        violations
    }
}

/// Check the protected elements of `markup` against `css`
pub fn check_visibility_issues(markup: &str, css: &str) -> Vec<Violation> {
    VisibilityAuditor::default()
        .check_protected(&AnnotatedMarkup::parse(markup), &StyleSheet::parse(css))
}

/// Check that a call-to-action present in `markup` is styled by `css`
pub fn check_cta_visibility(markup: &str, css: &str, cta_elements: &[String]) -> Vec<Violation> {
    VisibilityAuditor::new(cta_elements.to_vec())
        .check_cta(&AnnotatedMarkup::parse(markup), &StyleSheet::parse(css))
}

fn check_element(id: &str, declarations: &[&Declaration]) -> Vec<Violation> {
    let selector = element_selector(id);
    let mut violations = Vec::new();
    let hidden = |cause: VisibilityCause, what: &str| {
        Violation::new(
            ViolationKind::Visibility,
            Severity::Error,
            &selector,
            &format!("Protected element \"{}\" has {}", id, what),
        )
        .as_fixable()
        .with_cause(cause)
    };

    if has_value(declarations, "display", "none") {
        violations.push(hidden(VisibilityCause::DisplayNone, "display: none"));
    }
    if has_value(declarations, "visibility", "hidden") {
        violations.push(hidden(VisibilityCause::VisibilityHidden, "visibility: hidden"));
    }
    if declarations
        .iter()
        .any(|d| d.property == "opacity" && is_zero(&d.value))
    {
        violations.push(hidden(VisibilityCause::ZeroOpacity, "opacity: 0"));
    }

    let font_px = declarations
        .iter()
        .filter(|d| d.property == "font-size")
        .find_map(|d| font_size_px(&d.value));
    if let Some(px) = font_px.filter(|px| *px < MIN_FONT_SIZE_PX) {
        violations.push(
            Violation::new(
                ViolationKind::FontSize,
                Severity::Warning,
                &selector,
                &format!("Protected element \"{}\" has very small font size ({}px)", id, px),
            )
            .as_fixable(),
        );
    }

    let z_index = declarations
        .iter()
        .filter(|d| d.property == "z-index")
        .find_map(|d| Z_INDEX_RE.captures(&d.value)?[1].parse::<i64>().ok());
    if z_index.is_some_and(|z| z < 0) {
        violations.push(
            Violation::new(
                ViolationKind::Visibility,
                Severity::Warning,
                &selector,
                &format!("Protected element \"{}\" has negative z-index", id),
            )
            .as_fixable()
            .with_cause(VisibilityCause::NegativeZIndex),
        );
    }

    let off_screen = declarations.iter().any(|d| {
        matches!(d.property.as_str(), "left" | "right" | "top" | "bottom")
            && negative_px(&d.value).is_some_and(|px| px > OFF_SCREEN_PX)
    });
    if off_screen {
        violations.push(
            Violation::new(
                ViolationKind::Visibility,
                Severity::Error,
                &selector,
                &format!("Protected element \"{}\" appears to be positioned off-screen", id),
            )
            .as_fixable()
            .with_cause(VisibilityCause::OffScreen),
        );
    }

    violations
}

fn has_value(declarations: &[&Declaration], property: &str, keyword: &str) -> bool {
    declarations.iter().any(|d| {
        d.property == property
            && d.value
                .split_whitespace()
                .next()
                .is_some_and(|v| v.eq_ignore_ascii_case(keyword))
    })
}

/// `0`, `0%` or `0.0` but not `0.5`
fn is_zero(value: &str) -> bool {
    value
        .trim()
        .trim_end_matches('%')
        .parse::<f64>()
        .is_ok_and(|v| v == 0.0)
}

fn font_size_px(value: &str) -> Option<f64> {
    let caps = LENGTH_RE.captures(value.trim())?;
    let size: f64 = caps[1].parse().ok()?;
    if caps[2].eq_ignore_ascii_case("px") {
        Some(size)
    } else {
        Some(size * ROOT_FONT_SIZE_PX)
    }
}

/// Magnitude of a negative px length
fn negative_px(value: &str) -> Option<f64> {
    NEGATIVE_PX_RE.captures(value.trim())?[1].parse().ok()
}
