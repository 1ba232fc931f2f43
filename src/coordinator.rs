// SPDX-License-Identifier: PMPL-1.0-or-later
//! Coordinator: lock, generate style, validate
//!
//! Style generation is external. Anything that can turn locked markup into
//! a stylesheet plugs in through [`StyleGenerator`].

use crate::config::Config;
use crate::fixer::{apply_fixes, safeguard_patch, SAFEGUARD_TARGET};
use crate::locker::{ContentLocker, ContentRequirements, IntegrityReport, LockedMarkup, MediaKind};
use crate::validator::Validator;
use crate::violation::{PatchKind, ValidationResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Configuration record for one style source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleSource {
    pub id: String,
    pub name: String,
    /// Output always gets the safeguard block
    #[serde(default)]
    pub aggressive: bool,
}

/// Image generation request attached to a style
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePrompt {
    pub element_id: String,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
}

/// What a style source produces for one locked markup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleOutput {
    pub source_id: String,
    pub css: String,
    #[serde(default)]
    pub css_variables: BTreeMap<String, String>,
    #[serde(default)]
    pub image_prompts: Vec<ImagePrompt>,
    /// Rewritten markup, when the source touches structure at all
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markup: Option<String>,
}

impl StyleOutput {
    /// The stylesheet with `css_variables` declared on `:root` ahead of it
    pub fn stylesheet(&self) -> String {
        if self.css_variables.is_empty() {
            return self.css.clone();
        }
        let declarations: String = self
            .css_variables
            .iter()
            .map(|(name, value)| {
                let name = name.trim_start_matches('-');
                format!("  --{}: {};\n", name, value)
            })
            .collect();
        format!(":root {{\n{}}}\n\n{}", declarations, self.css)
    }
}

/// Produces styles from locked markup
pub trait StyleGenerator {
    fn source(&self) -> &StyleSource;

    fn generate(&self, locked: &LockedMarkup) -> StyleOutput;
}

/// Style source serving a stylesheet written ahead of time
#[derive(Debug, Clone)]
pub struct FixedStyle {
    source: StyleSource,
    css: String,
}

impl FixedStyle {
    pub fn new(source: StyleSource, css: impl Into<String>) -> Self {
        Self {
            source,
            css: css.into(),
        }
    }
}

impl StyleGenerator for FixedStyle {
    fn source(&self) -> &StyleSource {
        &self.source
    }

    fn generate(&self, _locked: &LockedMarkup) -> StyleOutput {
        StyleOutput {
            source_id: self.source.id.clone(),
            css: self.css.clone(),
            ..StyleOutput::default()
        }
    }
}

/// Everything produced for one request
#[derive(Debug, Clone, Serialize)]
pub struct CoordinatedOutcome {
    pub locked: LockedMarkup,
    pub style: StyleOutput,
    pub integrity: IntegrityReport,
    pub validation: ValidationResult,
    /// Safeguards were added beyond what the validator decided
    pub safeguards_forced: bool,
}

impl CoordinatedOutcome {
    /// Content was tampered with; the style must be regenerated, not patched
    pub fn needs_regeneration(&self) -> bool {
        !self.integrity.valid
    }

    /// Stylesheet to ship
    pub fn final_css(&self) -> &str {
        self.validation
            .fixed_css
            .as_deref()
            .unwrap_or(self.style.css.as_str())
    }
}

/// Sequences locker, style source and validator
#[derive(Default)]
pub struct Coordinator {
    locker: ContentLocker,
    validator: Validator,
}

impl Coordinator {
    pub fn new(locker: ContentLocker, validator: Validator) -> Self {
        Self { locker, validator }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            ContentLocker::from_config(&config.locker),
            Validator::new(config.validator.clone()),
        )
    }

    pub fn locker(&self) -> &ContentLocker {
        &self.locker
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Lock content, generate a style for it and validate the result.
    ///
    /// Safeguards are forced when the source is flagged aggressive, when the
    /// candidate breaches integrity or when validation fails.
    pub fn process(
        &self,
        requirements: &ContentRequirements,
        media: MediaKind,
        values: &BTreeMap<String, String>,
        generator: &dyn StyleGenerator,
    ) -> CoordinatedOutcome {
        let locked = self.locker.lock(requirements, media, values);
        let style = generator.generate(&locked);
        let source = generator.source();

        let candidate = style.markup.as_deref().unwrap_or(locked.markup());
        let integrity = self.locker.validate_integrity(&locked, candidate);

        let stylesheet = style.stylesheet();
        let mut validation = self.validator.validate(candidate, &stylesheet, Some(&source.id));

        let has_safeguards = validation
            .auto_fixes
            .iter()
            .any(|p| p.kind == PatchKind::ReinforceProtected && p.target == SAFEGUARD_TARGET);
        let safeguards_forced =
            !has_safeguards && (source.aggressive || !integrity.valid || !validation.passed);
        if safeguards_forced {
            warn!(
                source = %source.id,
                integrity = integrity.valid,
                passed = validation.passed,
                "Forcing protected content safeguards"
            );
            validation.auto_fixes.push(safeguard_patch());
        }
        validation.fixed_css = Some(apply_fixes(&stylesheet, &validation.auto_fixes));

        CoordinatedOutcome {
            locked,
            style,
            integrity,
            validation,
            safeguards_forced,
        }
    }
}
