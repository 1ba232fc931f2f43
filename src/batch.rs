// SPDX-License-Identifier: PMPL-1.0-or-later
//! Batch validation of candidate stylesheets.
//!
//! Walks a directory tree for `.css` files and validates each one against
//! the same markup. Every file is independent of the others.

use crate::error::{LockbotError, Result};
use crate::validator::Validator;
use crate::violation::ValidationResult;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

/// Directories to skip
const SKIP_DIRS: &[&str] = &["node_modules", ".git", "target", "dist", "build", "vendor"];

/// Validation result for one stylesheet on disk
#[derive(Debug, Clone, Serialize)]
pub struct BatchEntry {
    pub path: PathBuf,
    pub result: ValidationResult,
}

/// Validate every `.css` file under `dir` against `markup`, in path order
pub fn validate_directory(
    dir: &Path,
    markup: &str,
    validator: &Validator,
    source_id: Option<&str>,
    fix: bool,
) -> Result<Vec<BatchEntry>> {
    if !dir.is_dir() {
        return Err(LockbotError::Input(format!(
            "Not a directory: {}",
            dir.display()
        )));
    }

    info!("Validating stylesheets under {}", dir.display());

    let mut entries = Vec::new();
    for entry in WalkDir::new(dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_str().unwrap_or("");
            if e.depth() > 0 && e.file_type().is_dir() {
                return !SKIP_DIRS.contains(&name) && !name.starts_with('.');
            }
            true
        })
    {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };

        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().and_then(|e| e.to_str()) != Some("css") {
            continue;
        }

        let css = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                info!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };

        let result = if fix {
            validator.validate_and_fix(markup, &css, source_id)
        } else {
            validator.validate(markup, &css, source_id)
        };
        entries.push(BatchEntry {
            path: path.to_path_buf(),
            result,
        });
    }

    let failed = entries.iter().filter(|e| !e.result.passed).count();
    info!("Validated {} stylesheets, {} failed", entries.len(), failed);

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MARKUP: &str = r#"<p data-element="price" data-protected="true">$5</p>"#;

    #[test]
    fn test_validate_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.css"), "p { color: #000; background: #fff; }").unwrap();
        std::fs::write(dir.path().join("b.css"), r#"[data-element="price"] { display: none; }"#).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "h1 { color: #000; background: #000; }").unwrap();
        std::fs::create_dir(dir.path().join("node_modules")).unwrap();
        std::fs::write(dir.path().join("node_modules").join("c.css"), "*{opacity:0}").unwrap();

        let entries = validate_directory(dir.path(), MARKUP, &Validator::default(), None, false).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].path.ends_with("a.css"));
        assert!(entries[0].result.passed);
        assert!(!entries[1].result.passed);
        assert!(entries[1].result.fixed_css.is_none());
    }

    #[test]
    fn test_fix_mode_sets_fixed_css() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.css"), "h1 { color: #000; background: #000; }").unwrap();
        let entries = validate_directory(dir.path(), MARKUP, &Validator::default(), None, true).unwrap();
        assert!(entries[0].result.fixed_css.as_deref().unwrap().contains("::before"));
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let result = validate_directory(
            Path::new("/nonexistent/path"),
            MARKUP,
            &Validator::default(),
            None,
            false,
        );
        assert!(matches!(result, Err(LockbotError::Input(_))));
    }
}
