//! General-quality linter collector.
//!
//! Invokes the configured quality linter (a `pylint -f json`-shaped tool)
//! and normalizes its JSON array output to findings. Unlike the style
//! linter, exit code 32 on this family of tools means "findings were
//! reported", not "the tool itself failed".

use crate::contract::{Collector, CollectorContext, CollectorResult};
use crate::process::{invoke, probe, write_artifact};
use async_trait::async_trait;
use chrono::Utc;
use qaagent_evidence::model::FindingRecord;
use serde::Deserialize;

pub struct QualityLintCollector {
    pub program: String,
}

impl Default for QualityLintCollector {
    fn default() -> Self {
        Self {
            program: "pylint".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PylintMessage {
    path: String,
    line: u32,
    column: u32,
    #[serde(rename = "message-id")]
    message_id: String,
    message: String,
    #[serde(rename = "type")]
    kind: String,
}

fn map_severity(kind: &str) -> &'static str {
    match kind {
        "fatal" | "error" => "high",
        "warning" => "warning",
        "convention" | "refactor" | "info" => "info",
        _ => "info",
    }
}

#[async_trait]
impl Collector for QualityLintCollector {
    fn tool_name(&self) -> &'static str {
        "quality_lint"
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
            &["-f", "json", "."],
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

        let _ = write_artifact(&ctx.artifact_path("pylint.json"), &output.stdout).await;

        let mut errors = Vec::new();
        // 0 = clean, 32 = findings present; both parse normally. Anything
        // else is an unexpected tool failure, but we still attempt to parse
        // whatever was printed.
        if let Some(code) = output.exit_code {
            if code != 0 && code != 32 {
                errors.push(format!("{} exited with unexpected status {code}", self.program));
            }
        } else if output.timed_out {
            errors.push(format!("{} timed out", self.program));
        }

        let messages: Vec<PylintMessage> = match serde_json::from_str(&output.stdout) {
            Ok(m) => m,
            Err(e) => {
                if output.stdout.trim().is_empty() && output.exit_code == Some(0) {
                    Vec::new()
                } else {
                    errors.push(format!("failed to parse {} output: {e}", self.program));
                    Vec::new()
                }
            }
        };

        let mut findings = Vec::new();
        for msg in messages {
            let id = match ctx.ids.next("FND") {
                Ok(id) => id,
                Err(e) => {
                    errors.push(e.to_string());
                    continue;
                }
            };
            match FindingRecord::new(
                id,
                self.tool_name(),
                map_severity(&msg.kind),
                msg.message.clone(),
                Utc::now(),
            ) {
                Ok(finding) => {
                    let finding = finding
                        .with_location(msg.path, Some(msg.line), Some(msg.column))
                        .with_code(msg.message_id)
                        .with_tags(vec!["lint".to_string(), "quality".to_string()]);
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
    fn maps_fatal_and_error_to_high() {
        assert_eq!(map_severity("fatal"), "high");
        assert_eq!(map_severity("error"), "high");
    }

    #[test]
    fn maps_convention_to_info() {
        assert_eq!(map_severity("convention"), "info");
    }

    #[test]
    fn parses_pylint_json_array() {
        let raw = r#"[{"path":"a.py","line":3,"column":0,"message-id":"C0114","message":"Missing module docstring","type":"convention"}]"#;
        let messages: Vec<PylintMessage> = serde_json::from_str(raw).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].message_id, "C0114");
    }
}
