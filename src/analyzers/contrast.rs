// SPDX-License-Identifier: PMPL-1.0-or-later
//! Contrast auditor - WCAG 1.4.3 Contrast (Minimum)
//!
//! Flags rules whose declared foreground and background fail the configured
//! text threshold (AA normal text by default):
//! - below 3:1 is an error, unreadable even as large text
//! - between 3:1 and the threshold is a warning
//!
//! Rules missing either color, or using a value the color model cannot
//! parse, are skipped.

use crate::analyzers::Auditor;
use crate::color::{contrast_ratio, meets_wcag, parse_color};
use crate::markup::AnnotatedMarkup;
use crate::stylesheet::StyleSheet;
use crate::violation::{Severity, Violation, ViolationKind, WcagLevel};
use tracing::debug;

/// Ratios below this are errors regardless of level
const UNREADABLE_RATIO: f64 = 3.0;

/// Contrast auditor for declared color pairs
#[derive(Debug, Clone, Copy, Default)]
pub struct ContrastAuditor {
    pub level: WcagLevel,
    /// Judge text as large (>= 18pt, or >= 14pt bold)
    pub large_text: bool,
}

impl ContrastAuditor {
    pub fn new(level: WcagLevel, large_text: bool) -> Self {
        Self { level, large_text }
    }

    /// Audit every color pair declared in `sheet`
    pub fn check_sheet(&self, sheet: &StyleSheet) -> Vec<Violation> {
        let threshold = self.level.text_threshold(self.large_text);
        let mut violations = Vec::new();

        for pair in sheet.color_pairs() {
            let (Some(color), Some(background)) = (&pair.color, &pair.background_color) else {
                continue;
            };

            let fg = sheet.resolve_value(color).and_then(|v| parse_color(&v));
            let bg = sheet.resolve_value(background).and_then(|v| parse_color(&v));
            let (Some(fg), Some(bg)) = (fg, bg) else {
                debug!(selector = %pair.selector, color = %color, background = %background, "Skipping unparseable color pair");
                continue;
            };

            let ratio = contrast_ratio(fg, bg);
            if meets_wcag(ratio, self.level, self.large_text) {
                continue;
            }

            let severity = if ratio < UNREADABLE_RATIO {
                Severity::Error
            } else {
                Severity::Warning
            };
            violations.push(
                Violation::new(
                    ViolationKind::ContrastRatio,
                    severity,
                    &pair.selector,
                    &format!(
                        "Contrast ratio {:.2}:1 does not meet WCAG {} (requires {}:1). Color: {}, Background: {}",
                        ratio, self.level, threshold, color, background
                    ),
                )
                .as_fixable(),
            );
        }

        violations
    }
}

impl Auditor for ContrastAuditor {
    fn name(&self) -> &str {
        "Color Contrast Auditor"
    }

    fn description(&self) -> &str {
        "Checks declared color/background pairs against WCAG contrast thresholds (1.4.3)"
    }

    fn audit(&self, _markup: &AnnotatedMarkup, sheet: &StyleSheet) -> Vec<Violation> {
        self.check_sheet(sheet)
    }
}

/// Audit raw stylesheet text at WCAG AA for normal text
pub fn check_contrast(css: &str) -> Vec<Violation> {
    ContrastAuditor::default().check_sheet(&StyleSheet::parse(css))
}
