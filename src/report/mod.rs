// SPDX-License-Identifier: PMPL-1.0-or-later
//! Report generation for validation and integrity results.
//!
//! Supports multiple output formats:
//! - Text: human-readable summary grouped by severity
//! - JSON: the result records as-is, for programmatic consumption
//! - SARIF: Static Analysis Results Interchange Format for IDE/CI integration

use crate::batch::BatchEntry;
use crate::locker::{IntegrityReport, IntegrityViolation};
use crate::violation::{Severity, ValidationResult};
use serde::Serialize;

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// Structured JSON
    Json,
    /// SARIF for IDE/CI integration
    Sarif,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Sarif => write!(f, "sarif"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "sarif" => Ok(OutputFormat::Sarif),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

/// Render a validation result. `artifact` names the stylesheet in SARIF
/// locations.
pub fn generate_report(result: &ValidationResult, format: OutputFormat, artifact: Option<&str>) -> String {
    match format {
        OutputFormat::Text => generate_text_report(result),
        OutputFormat::Json => to_json(result),
        OutputFormat::Sarif => {
            let results = result
                .issues
                .iter()
                .map(|issue| SarifResult {
                    rule_id: format!("lockbot/{}", issue.kind),
                    level: sarif_level(issue.severity).to_string(),
                    message: SarifMessage {
                        text: format!("{}: {}", issue.element, issue.message),
                    },
                    locations: locations(artifact),
                })
                .collect();
            to_sarif(results)
        }
    }
}

/// Render an integrity report. `artifact` names the candidate markup.
pub fn generate_integrity_report(
    report: &IntegrityReport,
    format: OutputFormat,
    artifact: Option<&str>,
) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = String::from("=== Lockbot Integrity Report ===\n\n");
            if report.valid {
                output.push_str("Locked content intact.\n");
                return output;
            }
            output.push_str(&format!("Found {} violation(s):\n", report.violations.len()));
            for violation in &report.violations {
                output.push_str(&format!("  - {}\n", violation));
            }
            output.push_str("\nRESULT: INTEGRITY BREACHED (regenerate the style)\n");
            output
        }
        OutputFormat::Json => to_json(report),
        OutputFormat::Sarif => {
            let results = report
                .violations
                .iter()
                .map(|violation| SarifResult {
                    rule_id: format!("lockbot/integrity/{}", integrity_rule(violation)),
                    level: "error".to_string(),
                    message: SarifMessage {
                        text: violation.to_string(),
                    },
                    locations: locations(artifact),
                })
                .collect();
            to_sarif(results)
        }
    }
}

/// Render results of a batch run
pub fn generate_batch_report(entries: &[BatchEntry], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = String::from("=== Lockbot Batch Report ===\n\n");
            if entries.is_empty() {
                output.push_str("No stylesheets found.\n");
                return output;
            }
            for entry in entries {
                output.push_str(&format!(
                    "{:<6} {:>3}/100  {} error(s), {} warning(s)  {}\n",
                    if entry.result.passed { "PASS" } else { "FAIL" },
                    entry.result.score,
                    entry.result.errors().len(),
                    entry.result.warnings().len(),
                    entry.path.display()
                ));
            }
            let failed = entries.iter().filter(|e| !e.result.passed).count();
            output.push_str(&format!("\n{} of {} stylesheet(s) failed\n", failed, entries.len()));
            output
        }
        OutputFormat::Json => to_json(&entries),
        OutputFormat::Sarif => {
            let results = entries
                .iter()
                .flat_map(|entry| {
                    let uri = entry.path.display().to_string();
                    entry.result.issues.iter().map(move |issue| SarifResult {
                        rule_id: format!("lockbot/{}", issue.kind),
                        level: sarif_level(issue.severity).to_string(),
                        message: SarifMessage {
                            text: format!("{}: {}", issue.element, issue.message),
                        },
                        locations: locations(Some(&uri)),
                    })
                })
                .collect();
            to_sarif(results)
        }
    }
}

/// Generate human-readable text report
fn generate_text_report(result: &ValidationResult) -> String {
    let mut output = String::new();

    output.push_str("=== Lockbot Accessibility Report ===\n\n");
    output.push_str(&format!("Score: {}/100\n", result.score));

    if result.issues.is_empty() {
        output.push_str("No accessibility issues found. All checks passed.\n");
    } else {
        let errors = result.errors().len();
        let warnings = result.warnings().len();
        output.push_str(&format!(
            "Found {} issue(s): {} error(s), {} warning(s)\n\n",
            result.issues.len(),
            errors,
            warnings
        ));

        for severity in [Severity::Error, Severity::Warning] {
            let issues = result.by_severity(severity);
            if issues.is_empty() {
                continue;
            }

            output.push_str(&format!("--- {} ({}) ---\n", severity, issues.len()));
            for issue in issues {
                output.push_str(&format!("[{}] {}\n", issue.kind, issue.message));
                output.push_str(&format!("  Element: {}\n", issue.element));
                if issue.auto_fixable {
                    output.push_str("  Fix: auto-fixable\n");
                }
                output.push('\n');
            }
        }
    }

    if !result.auto_fixes.is_empty() {
        output.push_str(&format!("Corrective patches: {}\n", result.auto_fixes.len()));
        for patch in &result.auto_fixes {
            output.push_str(&format!("  {} -> {}\n", patch.kind, patch.target));
        }
        output.push('\n');
    }

    if result.passed {
        output.push_str("RESULT: PASS\n");
    } else {
        output.push_str("RESULT: FAIL (errors found)\n");
    }

    output
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!("{{\"error\": \"Failed to serialize report: {}\"}}", e))
}

fn sarif_level(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
    }
}

fn integrity_rule(violation: &IntegrityViolation) -> &'static str {
    match violation {
        IntegrityViolation::ProtectedModified { .. } => "protected_modified",
        IntegrityViolation::ProtectedMissing { .. } => "protected_missing",
        IntegrityViolation::ProtectedUnflagged { .. } => "protected_unflagged",
        IntegrityViolation::LockedTextCountChanged { .. } => "locked_text_count_changed",
        IntegrityViolation::LockedTextModified { .. } => "locked_text_modified",
    }
}

fn locations(artifact: Option<&str>) -> Vec<SarifLocation> {
    artifact
        .map(|uri| SarifLocation {
            physical_location: SarifPhysicalLocation {
                artifact_location: SarifArtifactLocation {
                    uri: uri.to_string(),
                },
            },
        })
        .into_iter()
        .collect()
}

/// SARIF report structure (simplified)
#[derive(Debug, Serialize)]
struct SarifReport {
    #[serde(rename = "$schema")]
    schema: String,
    version: String,
    runs: Vec<SarifRun>,
}

#[derive(Debug, Serialize)]
struct SarifRun {
    tool: SarifTool,
    results: Vec<SarifResult>,
}

#[derive(Debug, Serialize)]
struct SarifTool {
    driver: SarifDriver,
}

#[derive(Debug, Serialize)]
struct SarifDriver {
    name: String,
    version: String,
    #[serde(rename = "informationUri")]
    information_uri: String,
}

#[derive(Debug, Serialize)]
struct SarifResult {
    #[serde(rename = "ruleId")]
    rule_id: String,
    level: String,
    message: SarifMessage,
    locations: Vec<SarifLocation>,
}

#[derive(Debug, Serialize)]
struct SarifMessage {
    text: String,
}

#[derive(Debug, Serialize)]
struct SarifLocation {
    #[serde(rename = "physicalLocation")]
    physical_location: SarifPhysicalLocation,
}

#[derive(Debug, Serialize)]
struct SarifPhysicalLocation {
    #[serde(rename = "artifactLocation")]
    artifact_location: SarifArtifactLocation,
}

#[derive(Debug, Serialize)]
struct SarifArtifactLocation {
    uri: String,
}

fn to_sarif(results: Vec<SarifResult>) -> String {
    let report = SarifReport {
        schema: "https://json.schemastore.org/sarif-2.1.0.json".to_string(),
        version: "2.1.0".to_string(),
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: "lockbot".to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    information_uri: "https://github.com/hyperpolymath/gitbot-fleet".to_string(),
                },
            },
            results,
        }],
    };

    serde_json::to_string_pretty(&report).unwrap_or_else(|e| {
        format!("{{\"error\": \"Failed to serialize SARIF report: {}\"}}", e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::Validator;

    fn failing() -> ValidationResult {
        Validator::default().validate_and_fix(
            "",
            "h1 { color: #000; background: #000; } p { color: #888; background: #fff; }",
            None,
        )
    }

    #[test]
    fn test_text_report_clean() {
        let result = Validator::default().validate("", "", None);
        let report = generate_report(&result, OutputFormat::Text, None);
        assert!(report.contains("Score: 100/100"));
        assert!(report.contains("No accessibility issues found"));
        assert!(report.contains("RESULT: PASS"));
    }

    #[test]
    fn test_text_report_with_issues() {
        let report = generate_report(&failing(), OutputFormat::Text, None);
        assert!(report.contains("Score: 80/100"));
        assert!(report.contains("--- ERROR (1) ---"));
        assert!(report.contains("--- WARNING (1) ---"));
        assert!(report.contains("[contrast_ratio]"));
        assert!(report.contains("raise_contrast -> h1"));
        assert!(report.contains("RESULT: FAIL"));
    }

    #[test]
    fn test_json_report_uses_wire_names() {
        let report = generate_report(&failing(), OutputFormat::Json, None);
        let parsed: serde_json::Value = serde_json::from_str(&report).expect("valid JSON");
        assert_eq!(parsed["passed"], false);
        assert_eq!(parsed["issues"][0]["type"], "contrast_ratio");
        assert!(parsed["autoFixes"].is_array());
        assert!(parsed["fixedCss"].is_string());
    }

    #[test]
    fn test_sarif_report() {
        let report = generate_report(&failing(), OutputFormat::Sarif, Some("theme.css"));
        let parsed: serde_json::Value = serde_json::from_str(&report).expect("valid JSON");
        assert_eq!(parsed["version"], "2.1.0");
        let results = &parsed["runs"][0]["results"];
        assert_eq!(results[0]["ruleId"], "lockbot/contrast_ratio");
        assert_eq!(results[0]["level"], "error");
        assert_eq!(results[1]["level"], "warning");
        assert_eq!(
            results[0]["locations"][0]["physicalLocation"]["artifactLocation"]["uri"],
            "theme.css"
        );
    }

    #[test]
    fn test_integrity_reports() {
        let breached = IntegrityReport {
            valid: false,
            violations: vec![IntegrityViolation::LockedTextModified { position: 2 }],
        };
        let text = generate_integrity_report(&breached, OutputFormat::Text, None);
        assert!(text.contains("Locked text at position 2 was modified"));
        assert!(text.contains("INTEGRITY BREACHED"));

        let json = generate_integrity_report(&breached, OutputFormat::Json, None);
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["violations"][0]["kind"], "locked_text_modified");
        assert_eq!(parsed["violations"][0]["position"], 2);

        let sarif = generate_integrity_report(&breached, OutputFormat::Sarif, Some("page.html"));
        let parsed: serde_json::Value = serde_json::from_str(&sarif).unwrap();
        assert_eq!(
            parsed["runs"][0]["results"][0]["ruleId"],
            "lockbot/integrity/locked_text_modified"
        );

        let intact = generate_integrity_report(&IntegrityReport { valid: true, violations: vec![] }, OutputFormat::Text, None);
        assert!(intact.contains("Locked content intact"));
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("SARIF".parse::<OutputFormat>().unwrap(), OutputFormat::Sarif);
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
