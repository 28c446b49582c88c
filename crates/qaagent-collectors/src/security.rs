//! Security scanner collector.
//!
//! Invokes a `bandit -f json -r`-shaped tool and maps its severity strings
//! onto the shared finding severities and a numeric confidence.

use crate::contract::{Collector, CollectorContext, CollectorResult};
use crate::process::{invoke, probe, write_artifact};
use async_trait::async_trait;
use chrono::Utc;
use qaagent_evidence::model::FindingRecord;
use serde::Deserialize;

pub struct SecurityScanCollector {
    pub program: String,
}

impl Default for SecurityScanCollector {
    fn default() -> Self {
        Self {
            program: "bandit".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SecurityReport {
    #[serde(default)]
    results: Vec<SecurityIssue>,
}

#[derive(Debug, Deserialize)]
struct SecurityIssue {
    filename: String,
    line_number: u32,
    #[serde(default)]
    col_offset: Option<u32>,
    issue_severity: String,
    issue_text: String,
    test_id: String,
    #[serde(default)]
    cwe: Option<SecurityCwe>,
}

#[derive(Debug, Deserialize)]
struct SecurityCwe {
    id: u32,
}

fn map_severity(severity: &str) -> (&'static str, f64) {
    match severity.to_ascii_lowercase().as_str() {
        "low" => ("info", 0.3),
        "medium" => ("warning", 0.6),
        "high" => ("high", 0.9),
        _ => ("warning", 0.6),
    }
}

#[async_trait]
impl Collector for SecurityScanCollector {
    fn tool_name(&self) -> &'static str {
        "security_scan"
    }

    async fn run(&self, ctx: &CollectorContext<'_>) -> CollectorResult {
        let started_at = Utc::now();
        let version = probe(&self.program, &["--version"], std::time::Duration::from_secs(5)).await;
        let Some(version) = version else {
            return CollectorResult::not_found(
                self.tool_name(),
                started_at,
                format!("{} not found on PATH", self.program),
            );
        };
        if ctx.probe_only {
            return CollectorResult::probed(self.tool_name(), started_at, Some(version));
        }

        let output = match invoke(
            &self.program,
            &["-f", "json", "-r", "."],
            &ctx.target_path,
            ctx.timeout,
        )
        .await
        {
            Ok(o) => o,
            Err(e) => {
                return CollectorResult {
                    tool_name: self.tool_name().to_string(),
                    version: Some(version),
                    executed: true,
                    exit_code: None,
                    findings: 0,
                    diagnostics: Vec::new(),
                    errors: vec![e.to_string()],
                    started_at,
                    finished_at: Utc::now(),
                };
            }
        };

        let _ = write_artifact(&ctx.artifact_path("security.json"), &output.stdout).await;

        let mut errors = Vec::new();
        let report: SecurityReport = match serde_json::from_str(&output.stdout) {
            Ok(r) => r,
            Err(e) => {
                errors.push(format!("failed to parse {} output: {e}", self.program));
                SecurityReport { results: Vec::new() }
            }
        };

        let mut findings = Vec::new();
        for issue in report.results {
            let id = match ctx.ids.next("FND") {
                Ok(id) => id,
                Err(e) => {
                    errors.push(e.to_string());
                    continue;
                }
            };
            let (severity, confidence) = map_severity(&issue.issue_severity);
            match FindingRecord::new(id, self.tool_name(), severity, issue.issue_text.clone(), Utc::now()) {
                Ok(finding) => {
                    let mut finding = finding
                        .with_location(issue.filename, Some(issue.line_number), issue.col_offset)
                        .with_code(issue.test_id)
                        .with_tags(vec!["security".to_string()])
                        .with_confidence(confidence);
                    if let Some(cwe) = issue.cwe {
                        let mut metadata = serde_json::Map::new();
                        metadata.insert("cwe".to_string(), serde_json::json!(format!("CWE-{}", cwe.id)));
                        finding = finding.with_metadata(metadata);
                    }
                    findings.push(finding);
                }
                Err(e) => errors.push(e.to_string()),
            }
        }

        let count = findings.len();
        if let Err(e) = ctx.write_findings(&findings) {
            errors.push(e.to_string());
        }

        CollectorResult {
            tool_name: self.tool_name().to_string(),
            version: Some(version),
            executed: true,
            exit_code: output.exit_code,
            findings: count,
            diagnostics: Vec::new(),
            errors,
            started_at,
            finished_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_severities_to_confidence() {
        assert_eq!(map_severity("low"), ("info", 0.3));
        assert_eq!(map_severity("medium"), ("warning", 0.6));
        assert_eq!(map_severity("high"), ("high", 0.9));
    }

    #[test]
    fn parses_report_with_cwe() {
        let raw = r#"{"results":[{"filename":"a.py","line_number":10,"col_offset":2,"issue_severity":"HIGH","issue_text":"hardcoded password","test_id":"B105","cwe":{"id":259}}]}"#;
        let report: SecurityReport = serde_json::from_str(raw).unwrap();
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].cwe.as_ref().unwrap().id, 259);
    }
}
