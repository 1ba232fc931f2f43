// SPDX-License-Identifier: PMPL-1.0-or-later
//! Style scanner - rule-block extraction from generated stylesheets
//!
//! Stylesheets come from an external style generator and are treated as
//! opaque text made of `selector { declarations }` blocks. A single linear
//! pass splits them into rules:
//!
//! - `/* ... */` comments are dropped before tokenizing
//! - braces inside quoted strings do not open or close blocks
//! - rules nested in at-rules (`@media`, `@supports`) are flattened and the
//!   at-rule prelude is dropped
//!
//! No cascade, specificity or inheritance is computed.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::debug;

static CTA_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\[data-element[^\]]*cta").expect("valid regex"));

static VAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^var\(\s*(--[A-Za-z0-9_-]+)\s*(?:,\s*(.+?))?\s*\)$").expect("valid regex")
});

/// Nesting depth for `var()` chains before giving up
const MAX_VAR_DEPTH: usize = 4;

/// A single `property: value` declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    /// Lowercased, except custom properties which keep their case
    pub property: String,
    pub value: String,
    pub important: bool,
}

/// A `selector { body }` block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleRule {
    pub selector: String,
    /// Raw declaration text between the braces
    pub body: String,
    pub declarations: Vec<Declaration>,
}

impl StyleRule {
    fn new(selector: String, body: String) -> Self {
        let declarations = parse_declarations(&body);
        Self {
            selector,
            body,
            declarations,
        }
    }

    /// Last declaration of `property` in this block
    pub fn last(&self, property: &str) -> Option<&Declaration> {
        self.declarations.iter().rev().find(|d| d.property == property)
    }

    /// Whether this rule plausibly applies to the element `element_id`.
    ///
    /// Over-inclusive: generic protected, interactive and universal
    /// selectors count as relevant to every protected element.
    pub fn is_relevant_to(&self, element_id: &str) -> bool {
        let selector = self.selector.as_str();
        targets_element(selector, element_id)
            || selector.contains("[data-protected")
            || selector.contains("button")
            || selector.contains(".cta")
            || selector.trim() == "*"
    }

    /// Whether every selector in the list styles a pseudo-element
    /// (`::before`, `:after`, ...) rather than the element itself
    pub fn styles_pseudo_element(&self) -> bool {
        split_top_level(&self.selector, ',').iter().all(|component| {
            let lower = component.to_lowercase();
            lower.contains("::")
                || [":before", ":after", ":first-line", ":first-letter"]
                    .iter()
                    .any(|legacy| lower.contains(legacy))
        })
    }

    /// Whether this rule targets call-to-action elements
    pub fn targets_cta(&self) -> bool {
        let lower = self.selector.to_lowercase();
        lower.contains(".cta") || lower.contains("button") || CTA_ATTR_RE.is_match(&lower)
    }
}

/// Foreground and background declared by one rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorPair {
    pub selector: String,
    pub color: Option<String>,
    pub background_color: Option<String>,
}

/// A tokenized stylesheet
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    rules: Vec<StyleRule>,
    custom_properties: HashMap<String, String>,
}

impl StyleSheet {
    /// Tokenize `css` into flat rule blocks. Never fails; text that does not
    /// form a block is ignored.
    pub fn parse(css: &str) -> Self {
        let rules = tokenize_rules(&strip_comments(css));

        let mut custom_properties = HashMap::new();
        for rule in &rules {
            for decl in &rule.declarations {
                if decl.property.starts_with("--") {
                    custom_properties.insert(decl.property.clone(), decl.value.clone());
                }
            }
        }

        Self {
            rules,
            custom_properties,
        }
    }

    pub fn rules(&self) -> &[StyleRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules whose selector plausibly applies to `element_id`, in order
    pub fn relevant_rules<'a>(&'a self, element_id: &'a str) -> impl Iterator<Item = &'a StyleRule> {
        self.rules.iter().filter(move |r| r.is_relevant_to(element_id))
    }

    /// Whether any rule targets call-to-action elements
    pub fn has_cta_rules(&self) -> bool {
        self.rules.iter().any(StyleRule::targets_cta)
    }

    /// `color` / `background(-color)` per rule, for rules declaring either
    pub fn color_pairs(&self) -> Vec<ColorPair> {
        self.rules
            .iter()
            .filter_map(|rule| {
                let color = rule.last("color").map(|d| d.value.clone());
                let background_color = rule
                    .declarations
                    .iter()
                    .rev()
                    .find(|d| d.property == "background-color" || d.property == "background")
                    .map(|d| d.value.clone());

                if color.is_none() && background_color.is_none() {
                    return None;
                }
                Some(ColorPair {
                    selector: rule.selector.clone(),
                    color,
                    background_color,
                })
            })
            .collect()
    }

    /// Resolve `var(--name, fallback)` against custom properties declared
    /// anywhere in the sheet. Plain values are returned unchanged.
    pub fn resolve_value(&self, value: &str) -> Option<String> {
        let mut current = value.trim().to_string();
        for _ in 0..MAX_VAR_DEPTH {
            let next = match VAR_RE.captures(&current) {
                None => None,
                Some(caps) => {
                    let name = &caps[1];
                    match (self.custom_properties.get(name), caps.get(2)) {
                        (Some(v), _) => Some(v.trim().to_string()),
                        (None, Some(fallback)) => Some(fallback.as_str().trim().to_string()),
                        (None, None) => {
                            debug!(property = name, "Unresolvable custom property");
                            return None;
                        }
                    }
                }
            };
            match next {
                Some(resolved) => current = resolved,
                None => return Some(current),
            }
        }
        debug!(value, "Custom property chain too deep");
        None
    }
}

/// Extract color pairs from raw stylesheet text
pub fn extract_color_pairs(css: &str) -> Vec<ColorPair> {
    StyleSheet::parse(css).color_pairs()
}

/// Declaration bodies of every rule relevant to `element_id`, newline-joined
pub fn find_relevant_declarations(css: &str, element_id: &str) -> String {
    StyleSheet::parse(css)
        .relevant_rules(element_id)
        .map(|r| r.body.trim())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Whether `selector` names the element through its `data-element` attribute
fn targets_element(selector: &str, element_id: &str) -> bool {
    [
        format!("[data-element=\"{}\"]", element_id),
        format!("[data-element='{}']", element_id),
        format!("[data-element={}]", element_id),
    ]
    .iter()
    .any(|needle| selector.contains(needle.as_str()))
}

/// Remove `/* ... */` comments. An unterminated comment runs to the end.
pub fn strip_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => return out,
        }
    }
    out.push_str(rest);
    out
}

fn tokenize_rules(css: &str) -> Vec<StyleRule> {
    let mut rules = Vec::new();
    let mut open: Vec<String> = Vec::new();
    let mut buf = String::new();
    let mut quote: Option<char> = None;

    for c in css.chars() {
        if let Some(q) = quote {
            buf.push(c);
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => {
                quote = Some(c);
                buf.push(c);
            }
            '{' => {
                // `@import ...; body {` keeps only the text after the last `;`
                let selector = buf.rsplit(';').next().unwrap_or("").trim().to_string();
                open.push(selector);
                buf.clear();
            }
            '}' => {
                let body = std::mem::take(&mut buf);
                if let Some(selector) = open.pop() {
                    if !selector.is_empty() && !selector.starts_with('@') && !body.trim().is_empty()
                    {
                        rules.push(StyleRule::new(selector, body));
                    }
                }
            }
            _ => buf.push(c),
        }
    }

    if !open.is_empty() {
        debug!(unclosed = open.len(), "Stylesheet ends inside an open block");
    }
    rules
}

fn parse_declarations(body: &str) -> Vec<Declaration> {
    split_top_level(body, ';')
        .into_iter()
        .filter_map(|raw| {
            let (property, value) = raw.split_once(':')?;
            let property = property.trim();
            if property.is_empty() {
                return None;
            }
            let property = if property.starts_with("--") {
                property.to_string()
            } else {
                property.to_lowercase()
            };

            let mut value = value.trim();
            let mut important = false;
            if let Some(idx) = value.to_lowercase().rfind("!important") {
                let (head, tail) = value.split_at(idx);
                if tail.trim().eq_ignore_ascii_case("!important") {
                    value = head.trim_end();
                    important = true;
                }
            }

            Some(Declaration {
                property,
                value: value.to_string(),
                important,
            })
        })
        .collect()
}

/// Split on `sep` outside parentheses and quotes
fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        match (quote, c) {
            (Some(q), _) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, _) if c == sep && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts.into_iter().filter(|p| !p.trim().is_empty()).collect()
}
