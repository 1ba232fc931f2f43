// SPDX-License-Identifier: PMPL-1.0-or-later
//! Color model - CSS color literal parsing and WCAG 2.x contrast math
//!
//! - Relative luminance: <https://www.w3.org/TR/WCAG21/#dfn-relative-luminance>
//! - Contrast ratio: <https://www.w3.org/TR/WCAG21/#dfn-contrast-ratio>
//!
//! Unparseable literals yield `None`; callers skip the pair instead of failing.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static RGB_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^rgba?\s*\(\s*(\d+)\s*,\s*(\d+)\s*,\s*(\d+)").expect("valid regex")
});

/// An sRGB color with 8-bit channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Parse a hex color (#rgb, #rrggbb, #rrggbbaa). Alpha is ignored.
pub fn parse_hex_color(hex: &str) -> Option<Rgb> {
    let hex = hex.strip_prefix('#')?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 => {
            let r = u8::from_str_radix(&hex[0..1].repeat(2), 16).ok()?;
            let g = u8::from_str_radix(&hex[1..2].repeat(2), 16).ok()?;
            let b = u8::from_str_radix(&hex[2..3].repeat(2), 16).ok()?;
            Some(Rgb::new(r, g, b))
        }
        6..=8 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Rgb::new(r, g, b))
        }
        _ => None,
    }
}

/// Parse an rgb() or rgba() color. Channels above 255 are clamped.
pub fn parse_rgb_color(value: &str) -> Option<Rgb> {
    let caps = RGB_RE.captures(value)?;
    let channel = |i: usize| -> Option<u8> {
        let v: u32 = caps[i].parse().ok()?;
        Some(v.min(255) as u8)
    };
    Some(Rgb::new(channel(1)?, channel(2)?, channel(3)?))
}

/// Parse a named color from the small fixed table.
///
/// `transparent` is treated as opaque white; the true composited background
/// is not known to a static scan.
pub fn parse_named_color(name: &str) -> Option<Rgb> {
    match name {
        "white" | "transparent" => Some(Rgb::WHITE),
        "black" => Some(Rgb::BLACK),
        "red" => Some(Rgb::new(255, 0, 0)),
        "green" => Some(Rgb::new(0, 128, 0)),
        "blue" => Some(Rgb::new(0, 0, 255)),
        "yellow" => Some(Rgb::new(255, 255, 0)),
        _ => None,
    }
}

/// Parse any supported CSS color literal
pub fn parse_color(value: &str) -> Option<Rgb> {
    let trimmed = value.trim().to_lowercase();
    if trimmed.starts_with('#') {
        parse_hex_color(&trimmed)
    } else if trimmed.starts_with("rgb") {
        parse_rgb_color(&trimmed)
    } else {
        parse_named_color(&trimmed)
    }
}

/// Relative luminance per WCAG 2.x, in `[0, 1]`
pub fn relative_luminance(color: Rgb) -> f64 {
    let linear = [color.r, color.g, color.b].map(|c| {
        let v = c as f64 / 255.0;
        if v <= 0.03928 {
            v / 12.92
        } else {
            ((v + 0.055) / 1.055).powf(2.4)
        }
    });
    0.2126 * linear[0] + 0.7152 * linear[1] + 0.0722 * linear[2]
}

/// Contrast ratio between two colors, symmetric and always >= 1.0
pub fn contrast_ratio(a: Rgb, b: Rgb) -> f64 {
    let l1 = relative_luminance(a);
    let l2 = relative_luminance(b);
    let (lighter, darker) = if l1 >= l2 { (l1, l2) } else { (l2, l1) };
    (lighter + 0.05) / (darker + 0.05)
}

/// Whether `ratio` meets the text threshold for `level`
pub fn meets_wcag(ratio: f64, level: crate::violation::WcagLevel, large_text: bool) -> bool {
    ratio >= level.text_threshold(large_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::violation::WcagLevel;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#fff"), Some(Rgb::WHITE));
        assert_eq!(parse_hex_color("#000"), Some(Rgb::BLACK));
        assert_eq!(parse_hex_color("#ff0000"), Some(Rgb::new(255, 0, 0)));
        assert_eq!(parse_hex_color("#00ff0080"), Some(Rgb::new(0, 255, 0)));
        assert_eq!(parse_hex_color("#ffff"), None);
        assert_eq!(parse_hex_color("#ggg"), None);
    }

    #[test]
    fn test_parse_rgb_color() {
        assert_eq!(parse_rgb_color("rgb(255, 0, 0)"), Some(Rgb::new(255, 0, 0)));
        assert_eq!(parse_rgb_color("rgba(0, 128, 0, 0.5)"), Some(Rgb::new(0, 128, 0)));
        assert_eq!(parse_rgb_color("rgb(300, 0, 0)"), Some(Rgb::new(255, 0, 0)));
        assert_eq!(parse_rgb_color("rgb(10%, 0, 0)"), None);
    }

    #[test]
    fn test_parse_color_dispatch() {
        assert_eq!(parse_color("  WHITE "), Some(Rgb::WHITE));
        assert_eq!(parse_color("transparent"), Some(Rgb::WHITE));
        assert_eq!(parse_color("#ABC"), Some(Rgb::new(0xaa, 0xbb, 0xcc)));
        assert_eq!(parse_color("hsl(0, 0%, 0%)"), None);
        assert_eq!(parse_color("var(--ink)"), None);
        assert_eq!(parse_color("orange"), None);
    }

    #[test]
    fn test_contrast_ratio_black_white() {
        let ratio = contrast_ratio(Rgb::BLACK, Rgb::WHITE);
        assert!((ratio - 21.0).abs() < 1e-9, "Black on white should be 21:1, got {}", ratio);
    }

    #[test]
    fn test_contrast_ratio_is_symmetric() {
        let samples = [
            Rgb::new(12, 200, 99),
            Rgb::new(255, 128, 0),
            Rgb::new(3, 3, 3),
            Rgb::WHITE,
        ];
        for a in samples {
            for b in samples {
                assert_eq!(contrast_ratio(a, b), contrast_ratio(b, a));
            }
            assert!((contrast_ratio(a, a) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_relative_luminance_bounds() {
        assert!((relative_luminance(Rgb::WHITE) - 1.0).abs() < 1e-9);
        assert_eq!(relative_luminance(Rgb::BLACK), 0.0);
    }

    #[test]
    fn test_meets_wcag() {
        // #767676 on white is the classic 4.54:1 pass
        let ratio = contrast_ratio(Rgb::new(0x76, 0x76, 0x76), Rgb::WHITE);
        assert!(meets_wcag(ratio, WcagLevel::AA, false));
        assert!(!meets_wcag(ratio, WcagLevel::AAA, false));
        assert!(meets_wcag(ratio, WcagLevel::AAA, true));
    }
}
