// SPDX-License-Identifier: PMPL-1.0-or-later
//! Reading lock records, requirements and content values from disk

use crate::error::{LockbotError, Result};
use crate::locker::LockedMarkup;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Read a JSON (`.json`) or YAML (`.yml`, `.yaml`) record
pub fn read_record<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Ok(serde_json::from_str(&content)?),
        Some("yml") | Some("yaml") => Ok(serde_yaml::from_str(&content)?),
        _ => Err(LockbotError::Input(format!(
            "Expected a .json, .yml or .yaml file: {}",
            path.display()
        ))),
    }
}

/// Read a lock record and check it against its own fingerprint
pub fn read_locked_markup(path: &Path) -> Result<LockedMarkup> {
    let locked: LockedMarkup = read_record(path)?;
    if !locked.is_consistent() {
        return Err(LockbotError::Input(format!(
            "Lock record {} was edited after locking (fingerprint mismatch)",
            path.display()
        )));
    }
    Ok(locked)
}
