// SPDX-License-Identifier: PMPL-1.0-or-later
//! Corrective CSS generation
//!
//! Maps violations to override blocks and appends them to a stylesheet.
//! The original stylesheet is never edited in place, so later rules in the
//! appended block win by source order and `!important`.

use crate::violation::{CorrectivePatch, PatchKind, Violation, ViolationKind, VisibilityCause};

const FIX_BANNER: &str = "\
/* ================================================== */
/* Accessibility corrections (generated)              */
/* Appended overrides for protected content.          */
/* ================================================== */";

const SAFEGUARD_CSS: &str = "\
/* Protected content safeguards */
[data-protected=\"true\"] {
  display: block !important;
  visibility: visible !important;
  opacity: 1 !important;
  position: relative !important;
  z-index: 9999 !important;
}

[data-protected=\"true\"]::before {
  content: '' !important;
  position: absolute !important;
  inset: -8px !important;
  background: rgba(255, 255, 255, 0.95) !important;
  z-index: -1 !important;
  border-radius: 4px !important;
}

/* Call-to-action safeguards */
[data-element=\"cta\"],
[data-element=\"primary_cta\"],
[data-element=\"purchase-button\"] {
  min-width: 120px !important;
  min-height: 44px !important;
  padding: 12px 24px !important;
  font-size: 16px !important;
  font-weight: 600 !important;
  cursor: pointer !important;
  background: #0066cc !important;
  color: #ffffff !important;
  border: none !important;
  border-radius: 4px !important;
}

/* Price safeguards */
[data-element=\"price\"] {
  font-size: 18px !important;
  font-weight: 700 !important;
  color: #000000 !important;
  background: rgba(255, 255, 255, 0.95) !important;
  padding: 4px 8px !important;
}

/* Locked text legibility */
[data-locked-text=\"true\"] {
  text-shadow: 0 1px 2px rgba(0, 0, 0, 0.1) !important;
}";

/// Element reference targeted by the safeguard patch
pub const SAFEGUARD_TARGET: &str = "[data-protected]";

/// Corrective patch for one violation; `None` when it is not auto-fixable
pub fn generate_fix(violation: &Violation) -> Option<CorrectivePatch> {
    if !violation.auto_fixable {
        return None;
    }
    let target = violation.element.as_str();
    let (kind, css) = match violation.kind {
        ViolationKind::ContrastRatio => (PatchKind::RaiseContrast, contrast_fix(target)),
        ViolationKind::Visibility => (PatchKind::ForceVisible, visibility_fix(violation)),
        ViolationKind::FontSize => (PatchKind::EnlargeFont, font_size_fix(target)),
        ViolationKind::ProtectedElement => (PatchKind::ReinforceProtected, protected_fix(target)),
    };
    Some(CorrectivePatch {
        kind,
        target: target.to_string(),
        css,
    })
}

/// Patches for every fixable violation, in order
pub fn generate_auto_fixes(violations: &[Violation]) -> Vec<CorrectivePatch> {
    violations.iter().filter_map(generate_fix).collect()
}

/// Append `patches` to `css` under a banner. With no patches the input is
/// returned unchanged.
pub fn apply_fixes(css: &str, patches: &[CorrectivePatch]) -> String {
    if patches.is_empty() {
        return css.to_string();
    }
    let body = patches
        .iter()
        .map(|p| p.css.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("{}\n\n{}\n\n{}\n", css, FIX_BANNER, body)
}

/// Fixed stylesheet fragment that keeps every protected element visible
pub fn generate_destructive_safeguards() -> &'static str {
    SAFEGUARD_CSS
}

/// The safeguard fragment as a patch
pub fn safeguard_patch() -> CorrectivePatch {
    CorrectivePatch {
        kind: PatchKind::ReinforceProtected,
        target: SAFEGUARD_TARGET.to_string(),
        css: SAFEGUARD_CSS.to_string(),
    }
}

/// `::before` selector for every component of a selector list
fn before_selector(target: &str) -> String {
    split_selector_list(target)
        .into_iter()
        .map(|s| format!("{}::before", s))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Split a selector list on commas outside brackets, parentheses and quotes
fn split_selector_list(list: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in list.char_indices() {
        match (quote, c) {
            (Some(q), _) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(' | '[') => depth += 1,
            (None, ')' | ']') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(list[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(list[start..].trim());
    parts.retain(|p| !p.is_empty());
    parts
}

fn contrast_fix(target: &str) -> String {
    format!(
        "{target} {{
  position: relative;
}}

{before} {{
  content: '';
  position: absolute;
  inset: -4px;
  background: rgba(255, 255, 255, 0.9);
  z-index: -1;
  border-radius: 4px;
}}",
        target = target,
        before = before_selector(target)
    )
}

fn font_size_fix(target: &str) -> String {
    format!(
        "{} {{
  font-size: 14px !important;
  line-height: 1.4 !important;
}}",
        target
    )
}

fn protected_fix(target: &str) -> String {
    format!(
        "{target} {{
  display: block !important;
  visibility: visible !important;
  opacity: 1 !important;
  position: relative !important;
  z-index: 9999 !important;
}}

{before} {{
  content: '' !important;
  position: absolute !important;
  inset: -8px !important;
  background: rgba(255, 255, 255, 0.95) !important;
  z-index: -1 !important;
  border-radius: 4px !important;
  box-shadow: 0 2px 8px rgba(0, 0, 0, 0.1) !important;
}}",
        target = target,
        before = before_selector(target)
    )
}

/// Cause of a visibility violation, from its typed cause or its message
fn visibility_cause(violation: &Violation) -> Option<VisibilityCause> {
    if violation.cause.is_some() {
        return violation.cause;
    }
    let message = violation.message.as_str();
    if message.contains("display: none") {
        Some(VisibilityCause::DisplayNone)
    } else if message.contains("visibility: hidden") {
        Some(VisibilityCause::VisibilityHidden)
    } else if message.contains("opacity: 0") {
        Some(VisibilityCause::ZeroOpacity)
    } else if message.contains("z-index") {
        Some(VisibilityCause::NegativeZIndex)
    } else if message.contains("off-screen") {
        Some(VisibilityCause::OffScreen)
    } else {
        None
    }
}

fn visibility_fix(violation: &Violation) -> String {
    let target = violation.element.as_str();
    let body = match visibility_cause(violation) {
        Some(VisibilityCause::DisplayNone) => "  display: block !important;",
        Some(VisibilityCause::VisibilityHidden) => "  visibility: visible !important;",
        Some(VisibilityCause::ZeroOpacity) => "  opacity: 1 !important;",
        Some(VisibilityCause::NegativeZIndex) => {
            "  z-index: 9999 !important;\n  position: relative !important;"
        }
        Some(VisibilityCause::OffScreen) => {
            "  left: auto !important;\n  right: auto !important;\n  top: auto !important;\n  bottom: auto !important;"
        }
        Some(VisibilityCause::MissingCtaStyling) | None => {
            "  display: block !important;\n  visibility: visible !important;\n  opacity: 1 !important;\n  position: relative !important;\n  z-index: 100 !important;"
        }
    };
    format!("{} {{\n{}\n}}", target, body)
}
