// SPDX-License-Identifier: PMPL-1.0-or-later
//! Built-in markup templates, one per media kind
//!
//! Locking flags live in the templates themselves: which elements are
//! protected, locked-text or style-allowed is fixed per media kind and never
//! computed from input.

use crate::config::LockerConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Media kinds with a built-in template
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Landing page
    Lp,
    Poster,
    Logo,
    Package,
    Ui,
}

impl MediaKind {
    pub const ALL: [MediaKind; 5] = [
        MediaKind::Lp,
        MediaKind::Poster,
        MediaKind::Logo,
        MediaKind::Package,
        MediaKind::Ui,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Lp => "lp",
            MediaKind::Poster => "poster",
            MediaKind::Logo => "logo",
            MediaKind::Package => "package",
            MediaKind::Ui => "ui",
        }
    }

    /// Parse `name`, falling back to `fallback` for unknown kinds
    pub fn parse_or(name: &str, fallback: MediaKind) -> MediaKind {
        name.parse().unwrap_or_else(|_| {
            debug!(media = name, fallback = %fallback, "Unknown media kind, using fallback");
            fallback
        })
    }

    fn builtin_template(&self) -> &'static str {
        match self {
            MediaKind::Lp => LP_TEMPLATE,
            MediaKind::Poster => POSTER_TEMPLATE,
            MediaKind::Logo => LOGO_TEMPLATE,
            MediaKind::Package => PACKAGE_TEMPLATE,
            MediaKind::Ui => UI_TEMPLATE,
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lp" | "landing" | "landing-page" => Ok(MediaKind::Lp),
            "poster" => Ok(MediaKind::Poster),
            "logo" => Ok(MediaKind::Logo),
            "package" => Ok(MediaKind::Package),
            "ui" => Ok(MediaKind::Ui),
            _ => Err(format!("Unknown media kind: {}", s)),
        }
    }
}

/// Media kind to template lookup table
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    templates: BTreeMap<MediaKind, String>,
    fallback: MediaKind,
}

impl Default for TemplateCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TemplateCatalog {
    /// Catalog of the built-in templates with `lp` as fallback
    pub fn builtin() -> Self {
        Self {
            templates: MediaKind::ALL
                .iter()
                .map(|kind| (*kind, kind.builtin_template().to_string()))
                .collect(),
            fallback: MediaKind::Lp,
        }
    }

    /// Built-in catalog with the configured fallback and overrides
    pub fn from_config(config: &LockerConfig) -> Self {
        let mut catalog = Self::builtin().with_fallback(config.fallback_media);
        for (name, template) in &config.templates {
            match name.parse::<MediaKind>() {
                Ok(kind) => catalog = catalog.with_template(kind, template),
                Err(e) => debug!(error = %e, "Ignoring template override"),
            }
        }
        catalog
    }

    /// Replace the template for `kind`
    pub fn with_template(mut self, kind: MediaKind, template: &str) -> Self {
        self.templates.insert(kind, template.to_string());
        self
    }

    pub fn with_fallback(mut self, fallback: MediaKind) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn fallback(&self) -> MediaKind {
        self.fallback
    }

    /// Template for `kind`, or the fallback template when absent
    pub fn template(&self, kind: MediaKind) -> &str {
        self.templates
            .get(&kind)
            .or_else(|| self.templates.get(&self.fallback))
            .map(String::as_str)
            .unwrap_or("")
    }
}

const LP_TEMPLATE: &str = r#"
<article data-locked="true" data-version="1.0" class="lp">
  <header data-element="hero" data-style-allowed="true">
    <h1 data-element="headline" data-priority="1" data-locked-text="true">
      {{headline}}
    </h1>
    <p data-element="subheadline" data-locked-text="true">
      {{subheadline}}
    </p>
    <div data-element="hero-image" data-style-allowed="true"></div>
  </header>

  <section data-element="product" data-style-allowed="true">
    <div data-element="product_image" data-style-allowed="true"></div>
    <div data-element="product-info">
      <p data-element="description" data-locked-text="true">{{description}}</p>
      <p data-element="price" data-protected="true" data-locked-text="true">{{price}}</p>
    </div>
  </section>

  <section data-element="features" data-style-allowed="true">
    {{features}}
  </section>

  <section data-element="testimonials" data-style-allowed="true">
    {{testimonials}}
  </section>

  <section data-element="cta-section" data-protected="true">
    <button data-element="cta" data-protected="true">
      {{cta_text}}
    </button>
  </section>

  <footer data-element="footer" data-style-allowed="true">
    {{footer}}
  </footer>
</article>
"#;

const POSTER_TEMPLATE: &str = r#"
<article data-locked="true" data-version="1.0" class="poster">
  <div data-element="main_visual" data-style-allowed="true"></div>
  <h1 data-element="title" data-priority="1" data-locked-text="true">
    {{title}}
  </h1>
  <div data-element="info" data-protected="true">
    <p data-element="date_info" data-locked-text="true">{{date_info}}</p>
    <p data-element="venue_info" data-locked-text="true">{{venue_info}}</p>
  </div>
</article>
"#;

const LOGO_TEMPLATE: &str = r#"
<article data-locked="true" data-version="1.0" class="logo">
  <div data-element="symbol" data-style-allowed="true"></div>
  <h1 data-element="wordmark" data-priority="1" data-locked-text="true">
    {{wordmark}}
  </h1>
</article>
"#;

const PACKAGE_TEMPLATE: &str = r#"
<article data-locked="true" data-version="1.0" class="package">
  <h1 data-element="product_name" data-priority="1" data-protected="true" data-locked-text="true">
    {{product_name}}
  </h1>
  <div data-element="product_image" data-style-allowed="true"></div>
  <p data-element="description" data-locked-text="true">{{description}}</p>
  <div data-element="ingredients" data-protected="true" data-locked-text="true">
    {{ingredients}}
  </div>
</article>
"#;

const UI_TEMPLATE: &str = r#"
<article data-locked="true" data-version="1.0" class="ui-design">
  <nav data-element="navigation" data-protected="true">
    {{navigation}}
  </nav>
  <header data-element="hero" data-style-allowed="true">
    <h1 data-element="headline" data-priority="1" data-locked-text="true">
      {{headline}}
    </h1>
  </header>
  <section data-element="features" data-style-allowed="true">
    {{features}}
  </section>
  <section data-element="cta-section" data-protected="true">
    <button data-element="primary_cta" data-protected="true">
      {{cta_text}}
    </button>
  </section>
</article>
"#;
