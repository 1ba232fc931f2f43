// SPDX-License-Identifier: PMPL-1.0-or-later
//! Annotated markup scanning
//!
//! Locked markup tags every content element with machine-readable
//! attributes:
//!
//! - `data-element="<id>"` names the element
//! - `data-protected="true"` must stay present, visible and legible
//! - `data-locked-text="true"` text must stay byte-identical and in order
//! - `data-style-allowed="true"` visual treatment may vary freely
//!
//! Both the content locker and the visibility auditor read markup through
//! this module so that they agree on what counts as an annotated element.

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static ANNOTATED: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[data-element]").expect("valid selector"));

static LOCKED_TEXT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"[data-locked-text="true"]"#).expect("valid selector"));

/// Kind of a content element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Hero,
    Headline,
    Subheadline,
    Cta,
    Price,
    Image,
    Text,
    Navigation,
    Testimonial,
    Feature,
    /// Structural wrapper with no content role of its own
    Container,
}

impl ElementKind {
    /// Classify an element from its identifier and tag name
    pub fn classify(id: &str, tag: &str) -> Self {
        let id = id.to_lowercase();
        if id.contains("cta") || tag == "button" {
            ElementKind::Cta
        } else if id.contains("price") {
            ElementKind::Price
        } else if tag == "nav" || id.contains("navigation") {
            ElementKind::Navigation
        } else if id.contains("image") || id.contains("visual") || id.contains("symbol") {
            ElementKind::Image
        } else if id.contains("subheadline") {
            ElementKind::Subheadline
        } else if matches!(tag, "h1" | "h2" | "h3" | "h4" | "h5" | "h6") {
            ElementKind::Headline
        } else if id == "hero" {
            ElementKind::Hero
        } else if id.contains("testimonial") {
            ElementKind::Testimonial
        } else if id.contains("feature") {
            ElementKind::Feature
        } else if tag == "p" {
            ElementKind::Text
        } else {
            ElementKind::Container
        }
    }
}

/// One `data-element` node and its locking flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedElement {
    pub id: String,
    pub kind: ElementKind,
    pub tag: String,
    pub protected: bool,
    pub locked_text: bool,
    pub style_allowed: bool,
}

impl AnnotatedElement {
    /// Attribute selector that targets this element in a stylesheet
    pub fn selector(&self) -> String {
        element_selector(&self.id)
    }
}

/// Attribute selector for the element `id`
pub fn element_selector(id: &str) -> String {
    format!("[data-element=\"{}\"]", id)
}

/// Parsed markup, queried for annotated elements
pub struct AnnotatedMarkup {
    document: Html,
}

impl AnnotatedMarkup {
    /// Parse a markup fragment. Malformed input is repaired by the HTML
    /// parser; empty input yields no elements.
    pub fn parse(markup: &str) -> Self {
        Self {
            document: Html::parse_fragment(markup),
        }
    }

    /// Every annotated element in document order
    pub fn elements(&self) -> Vec<AnnotatedElement> {
        self.document
            .select(&ANNOTATED)
            .filter_map(|el| {
                let id = el.value().attr("data-element")?.to_string();
                let tag = el.value().name().to_string();
                Some(AnnotatedElement {
                    kind: ElementKind::classify(&id, &tag),
                    protected: flag(&el, "data-protected"),
                    locked_text: flag(&el, "data-locked-text"),
                    style_allowed: flag(&el, "data-style-allowed"),
                    id,
                    tag,
                })
            })
            .collect()
    }

    /// Identifiers of protected elements in document order
    pub fn protected_ids(&self) -> Vec<String> {
        self.ids_where(|el| flag(el, "data-protected"))
    }

    /// Identifiers of style-allowed elements in document order
    pub fn style_allowed_ids(&self) -> Vec<String> {
        self.ids_where(|el| flag(el, "data-style-allowed"))
    }

    /// Own text of the first element named `id`, trimmed
    pub fn element_text(&self, id: &str) -> Option<String> {
        self.document
            .select(&ANNOTATED)
            .find(|el| el.value().attr("data-element") == Some(id))
            .map(|el| own_text(&el))
    }

    /// Full text of every locked-text element, children included, in
    /// document order
    pub fn locked_texts(&self) -> Vec<String> {
        self.document
            .select(&LOCKED_TEXT)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .collect()
    }

    /// Identifiers of locked-text elements in document order
    pub fn locked_text_ids(&self) -> Vec<String> {
        self.ids_where(|el| flag(el, "data-locked-text"))
    }

    /// Whether any element is named by one of `ids`
    pub fn contains_any(&self, ids: &[String]) -> bool {
        self.document.select(&ANNOTATED).any(|el| {
            el.value()
                .attr("data-element")
                .is_some_and(|id| ids.iter().any(|want| want == id))
        })
    }

    fn ids_where(&self, pred: impl Fn(&ElementRef<'_>) -> bool) -> Vec<String> {
        self.document
            .select(&ANNOTATED)
            .filter(|el| pred(el))
            .filter_map(|el| el.value().attr("data-element").map(str::to_string))
            .collect()
    }
}

fn flag(el: &ElementRef<'_>, attr: &str) -> bool {
    el.value().attr(attr) == Some("true")
}

/// Text held directly by `el`, excluding text of child elements
fn own_text(el: &ElementRef<'_>) -> String {
    el.children()
        .filter_map(|child| child.value().as_text())
        .map(|text| &**text)
        .collect::<String>()
        .trim()
        .to_string()
}
