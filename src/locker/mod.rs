// SPDX-License-Identifier: PMPL-1.0-or-later
//! Content locker
//!
//! Stamps content values into the annotated template for a media kind and
//! records which elements came out protected or style-allowed. The result is
//! later compared against candidate markup to detect tampering.

pub mod integrity;
pub mod templates;

pub use integrity::{validate_integrity, IntegrityReport, IntegrityViolation};
pub use templates::{MediaKind, TemplateCatalog};

use crate::config::LockerConfig;
use crate::markup::{AnnotatedElement, AnnotatedMarkup, ElementKind};
use chrono::{DateTime, Utc};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::debug;
use uuid::Uuid;

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^{}]+)\}\}").expect("valid regex"));

/// Priority of elements that no rank names
pub const UNRANKED_PRIORITY: u32 = 99;

/// An element the content must provide
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredElement {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protected: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Required elements and their ranking, as produced by intent analysis
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRequirements {
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub required_elements: Vec<RequiredElement>,
    /// Rank (1 = most important) to element id
    #[serde(default)]
    pub priority: BTreeMap<u32, String>,
}

impl ContentRequirements {
    /// Best rank naming `id`, or [`UNRANKED_PRIORITY`]
    pub fn priority_of(&self, id: &str) -> u32 {
        self.priority
            .iter()
            .find(|(_, element)| element.as_str() == id)
            .map(|(rank, _)| *rank)
            .unwrap_or(UNRANKED_PRIORITY)
    }
}

/// One node of the content hierarchy built at lock time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentNode {
    pub id: String,
    pub element: ElementKind,
    pub priority: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub locked_text: bool,
    pub style_allowed: bool,
    pub protected: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ContentNode>,
}

/// Finalized markup and the index sets derived from it.
///
/// Only the markup is covered by the fingerprint, so the index sets are
/// read back from it when a record is deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "LockRecord")]
pub struct LockedMarkup {
    id: Uuid,
    #[serde(default)]
    request_id: Option<String>,
    media_kind: MediaKind,
    markup: String,
    fingerprint: String,
    protected_elements: Vec<String>,
    style_allowed_elements: Vec<String>,
    content_hierarchy: Vec<ContentNode>,
    locked_at: DateTime<Utc>,
}

impl LockedMarkup {
    /// Lock already-rendered markup, deriving the index sets from it
    pub fn from_markup(
        markup: String,
        media_kind: MediaKind,
        request_id: Option<String>,
        content_hierarchy: Vec<ContentNode>,
    ) -> Self {
        let document = AnnotatedMarkup::parse(&markup);
        Self {
            id: Uuid::new_v4(),
            request_id,
            media_kind,
            fingerprint: fingerprint_of(&markup),
            protected_elements: document.protected_ids(),
            style_allowed_elements: document.style_allowed_ids(),
            markup,
            content_hierarchy,
            locked_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    pub fn media_kind(&self) -> MediaKind {
        self.media_kind
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// SHA-256 of the markup, hex encoded
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn protected_elements(&self) -> &[String] {
        &self.protected_elements
    }

    pub fn style_allowed_elements(&self) -> &[String] {
        &self.style_allowed_elements
    }

    pub fn content_hierarchy(&self) -> &[ContentNode] {
        &self.content_hierarchy
    }

    pub fn locked_at(&self) -> DateTime<Utc> {
        self.locked_at
    }

    pub fn is_protected(&self, element_id: &str) -> bool {
        self.protected_elements.iter().any(|id| id == element_id)
    }

    /// Every `data-element` node of the markup with its flags
    pub fn annotated_elements(&self) -> Vec<AnnotatedElement> {
        AnnotatedMarkup::parse(&self.markup).elements()
    }

    /// Whether `candidate` is byte-identical to the locked markup
    pub fn matches_fingerprint(&self, candidate: &str) -> bool {
        fingerprint_of(candidate) == self.fingerprint
    }

    /// Whether the stored fingerprint still describes the stored markup.
    /// False for records edited after locking.
    pub fn is_consistent(&self) -> bool {
        self.matches_fingerprint(&self.markup)
    }
}

/// Stored form of a [`LockedMarkup`]; stored index sets are ignored
#[derive(Deserialize)]
struct LockRecord {
    id: Uuid,
    #[serde(default)]
    request_id: Option<String>,
    media_kind: MediaKind,
    markup: String,
    fingerprint: String,
    #[serde(default)]
    content_hierarchy: Vec<ContentNode>,
    locked_at: DateTime<Utc>,
}

impl From<LockRecord> for LockedMarkup {
    fn from(record: LockRecord) -> Self {
        let document = AnnotatedMarkup::parse(&record.markup);
        Self {
            id: record.id,
            request_id: record.request_id,
            media_kind: record.media_kind,
            fingerprint: record.fingerprint,
            protected_elements: document.protected_ids(),
            style_allowed_elements: document.style_allowed_ids(),
            markup: record.markup,
            content_hierarchy: record.content_hierarchy,
            locked_at: record.locked_at,
        }
    }
}

/// Hex SHA-256 of `markup`
pub fn fingerprint_of(markup: &str) -> String {
    format!("{:x}", Sha256::digest(markup.as_bytes()))
}

/// Locks content into the template catalog
#[derive(Debug, Clone, Default)]
pub struct ContentLocker {
    catalog: TemplateCatalog,
}

impl ContentLocker {
    pub fn new(catalog: TemplateCatalog) -> Self {
        Self { catalog }
    }

    pub fn from_config(config: &LockerConfig) -> Self {
        Self::new(TemplateCatalog::from_config(config))
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    /// Render the template for `media` with `values` and lock the result
    pub fn lock(
        &self,
        requirements: &ContentRequirements,
        media: MediaKind,
        values: &BTreeMap<String, String>,
    ) -> LockedMarkup {
        let markup = render_template(self.catalog.template(media), values);
        let hierarchy = build_content_hierarchy(requirements, values);
        let locked = LockedMarkup::from_markup(
            markup,
            media,
            requirements.request_id.clone(),
            hierarchy,
        );
        debug!(
            id = %locked.id,
            media = %media,
            protected = locked.protected_elements.len(),
            style_allowed = locked.style_allowed_elements.len(),
            "Locked content"
        );
        locked
    }

    /// Compare `candidate` against the locked markup
    pub fn validate_integrity(&self, original: &LockedMarkup, candidate: &str) -> IntegrityReport {
        validate_integrity(original, candidate)
    }
}

/// Substitute `{{name}}` placeholders with escaped values in one pass.
/// Placeholders without a value are removed.
pub fn render_template(template: &str, values: &BTreeMap<String, String>) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures<'_>| {
            values
                .get(caps[1].trim())
                .map(|v| escape_html(v))
                .unwrap_or_default()
        })
        .trim()
        .to_string()
}

/// Escape `& < > " '` for HTML text and attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn build_content_hierarchy(
    requirements: &ContentRequirements,
    values: &BTreeMap<String, String>,
) -> Vec<ContentNode> {
    requirements
        .required_elements
        .iter()
        .map(|element| {
            let protected = element.protected.unwrap_or(false);
            ContentNode {
                id: element.id.clone(),
                element: element.kind,
                priority: requirements.priority_of(&element.id),
                content: values
                    .get(&element.id)
                    .cloned()
                    .or_else(|| element.content.clone()),
                locked_text: true,
                style_allowed: !protected,
                protected,
                children: Vec::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn requirements() -> ContentRequirements {
        ContentRequirements {
            request_id: Some("req-1".into()),
            required_elements: vec![
                RequiredElement {
                    id: "headline".into(),
                    kind: ElementKind::Headline,
                    required: true,
                    protected: None,
                    content: None,
                },
                RequiredElement {
                    id: "cta".into(),
                    kind: ElementKind::Cta,
                    required: true,
                    protected: Some(true),
                    content: Some("Default CTA".into()),
                },
            ],
            priority: BTreeMap::from([(1, "headline".to_string()), (2, "price".to_string())]),
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
    }

    #[test]
    fn test_render_removes_unfilled_placeholders() {
        let out = render_template("<p>{{a}}|{{ b }}|{{c}}</p>", &values(&[("a", "1"), ("b", "<2>")]));
        assert_eq!(out, "<p>1|&lt;2&gt;|</p>");
    }

    #[test]
    fn test_values_cannot_inject_placeholders() {
        let out = render_template("{{a}} {{b}}", &values(&[("a", "{{b}}"), ("b", "x")]));
        assert_eq!(out, "{{b}} x");
    }

    #[test]
    fn test_lock_landing_page() {
        let locker = ContentLocker::default();
        let locked = locker.lock(
            &requirements(),
            MediaKind::Lp,
            &values(&[("headline", "Fresh & Fast"), ("price", "$9"), ("cta_text", "Buy")]),
        );

        assert_eq!(locked.protected_elements(), ["price", "cta-section", "cta"]);
        assert_eq!(
            locked.style_allowed_elements(),
            ["hero", "hero-image", "product", "product_image", "features", "testimonials", "footer"]
        );
        assert!(locked.markup().contains("Fresh &amp; Fast"));
        assert!(!locked.markup().contains("{{"));
        assert_eq!(locked.request_id(), Some("req-1"));
        assert!(locked.is_protected("price"));
        assert!(!locked.is_protected("headline"));
        assert!(locked.is_consistent());
    }

    #[test]
    fn test_content_hierarchy() {
        let locked = ContentLocker::default().lock(
            &requirements(),
            MediaKind::Lp,
            &values(&[("headline", "Hello")]),
        );
        let nodes = locked.content_hierarchy();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].priority, 1);
        assert_eq!(nodes[0].content.as_deref(), Some("Hello"));
        assert!(nodes[0].locked_text && nodes[0].style_allowed && !nodes[0].protected);
        assert_eq!(nodes[1].priority, UNRANKED_PRIORITY);
        assert_eq!(nodes[1].content.as_deref(), Some("Default CTA"));
        assert!(nodes[1].protected && !nodes[1].style_allowed);
    }

    #[test]
    fn test_index_sets_come_from_rendered_markup() {
        let catalog = TemplateCatalog::builtin()
            .with_template(MediaKind::Logo, r#"<h1 data-element="wordmark">{{wordmark}}</h1>"#);
        let mut reqs = requirements();
        reqs.required_elements[0].protected = Some(true);
        let locked = ContentLocker::new(catalog).lock(&reqs, MediaKind::Logo, &BTreeMap::new());
        assert!(locked.protected_elements().is_empty());
    }

    #[test]
    fn test_empty_template_yields_empty_sets() {
        let catalog = TemplateCatalog::builtin().with_template(MediaKind::Ui, "");
        let locked = ContentLocker::new(catalog).lock(
            &ContentRequirements::default(),
            MediaKind::Ui,
            &BTreeMap::new(),
        );
        assert_eq!(locked.markup(), "");
        assert!(locked.protected_elements().is_empty());
        assert!(locked.style_allowed_elements().is_empty());
        assert!(locked.annotated_elements().is_empty());
    }

    #[test]
    fn test_fingerprint() {
        let locked = ContentLocker::default().lock(
            &ContentRequirements::default(),
            MediaKind::Logo,
            &values(&[("wordmark", "ACME")]),
        );
        assert_eq!(locked.fingerprint().len(), 64);
        assert!(locked.matches_fingerprint(locked.markup()));
        assert!(!locked.matches_fingerprint(&locked.markup().replace("ACME", "ACNE")));
        assert_eq!(
            fingerprint_of(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_record_round_trips_through_json() {
        let locked = ContentLocker::default().lock(
            &requirements(),
            MediaKind::Poster,
            &values(&[("title", "Expo")]),
        );
        let json = serde_json::to_string(&locked).unwrap();
        let back: LockedMarkup = serde_json::from_str(&json).unwrap();
        assert_eq!(back, locked);
        assert_eq!(back.media_kind(), MediaKind::Poster);
        assert!(json.contains("\"media_kind\":\"poster\""));
    }

    #[test]
    fn test_stored_index_sets_are_rederived() {
        let locked = ContentLocker::default().lock(
            &requirements(),
            MediaKind::Lp,
            &values(&[("price", "$9")]),
        );
        let mut record = serde_json::to_value(&locked).unwrap();
        record["protected_elements"] = serde_json::json!([]);
        record["style_allowed_elements"] = serde_json::json!(["price"]);

        let back: LockedMarkup = serde_json::from_value(record).unwrap();
        assert_eq!(back.protected_elements(), ["price", "cta-section", "cta"]);
        assert!(!back.style_allowed_elements().contains(&"price".to_string()));
        assert_eq!(back, locked);
    }

    #[test]
    fn test_requirements_from_json() {
        let json = r#"{
            "request_id": "r",
            "required_elements": [{"id": "price", "type": "price", "required": true, "protected": true}],
            "priority": {"1": "price"}
        }"#;
        let reqs: ContentRequirements = serde_json::from_str(json).unwrap();
        assert_eq!(reqs.priority_of("price"), 1);
        assert_eq!(reqs.required_elements[0].protected, Some(true));
    }
}
