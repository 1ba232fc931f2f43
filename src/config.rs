// SPDX-License-Identifier: PMPL-1.0-or-later
//! Configuration for lockbot

use crate::analyzers::visibility::default_cta_elements;
use crate::error::{LockbotError, Result};
use crate::locker::templates::MediaKind;
use crate::violation::WcagLevel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub validator: ValidatorConfig,
    pub locker: LockerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Style sources whose output always gets the safeguard block
    pub aggressive_sources: Vec<String>,
    pub wcag_level: WcagLevel,
    /// Judge contrast against the large-text thresholds
    pub large_text: bool,
    /// Element identifiers treated as calls to action
    pub cta_elements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockerConfig {
    /// Media kind used for unknown or missing templates
    pub fallback_media: MediaKind,
    /// Template overrides keyed by media kind name
    pub templates: BTreeMap<String, String>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            aggressive_sources: ["agent_17", "agent_18", "agent_19", "agent_20"]
                .into_iter()
                .map(String::from)
                .collect(),
            wcag_level: WcagLevel::AA,
            large_text: false,
            cta_elements: default_cta_elements(),
        }
    }
}

impl Default for LockerConfig {
    fn default() -> Self {
        Self {
            fallback_media: MediaKind::Lp,
            templates: BTreeMap::new(),
        }
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lockbot")
        .join("config.yml")
}

pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)?;

    if path.extension().and_then(|s| s.to_str()) == Some("toml") {
        Ok(toml::from_str(&content)?)
    } else {
        Ok(serde_yaml::from_str(&content)?)
    }
}

pub fn write_default_config(path: &Path) -> Result<()> {
    let config = Config::default();

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = if path.extension().and_then(|s| s.to_str()) == Some("toml") {
        toml::to_string_pretty(&config)
            .map_err(|e| LockbotError::Config(format!("TOML serialize error: {}", e)))?
    } else {
        serde_yaml::to_string(&config)?
    };

    std::fs::write(path, content)?;
    Ok(())
}
