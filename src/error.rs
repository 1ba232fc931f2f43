// SPDX-License-Identifier: PMPL-1.0-or-later
//! Error types for lockbot
//!
//! The locking and validation core is total and never returns these. They
//! surface only where lockbot touches the filesystem or parses configuration.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LockbotError>;

#[derive(Error, Debug)]
pub enum LockbotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid input: {0}")]
    Input(String),
}
