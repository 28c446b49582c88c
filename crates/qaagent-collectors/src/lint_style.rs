//! Style linter collector.
//!
//! Invokes the configured style linter (a `ruff check`-shaped tool: default
//! text format, `path:line:col: CODE message` per line) and normalizes its
//! output to `warning`-severity findings tagged `lint`.

use crate::contract::{Collector, CollectorContext, CollectorResult};
use crate::process::{invoke, probe, write_artifact};
use async_trait::async_trait;
use chrono::Utc;
use qaagent_evidence::model::FindingRecord;
use regex::Regex;
use std::sync::OnceLock;

pub struct StyleLintCollector {
    pub program: String,
}

impl Default for StyleLintCollector {
    fn default() -> Self {
        Self {
            program: "ruff".to_string(),
        }
    }
}

fn line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?P<file>[^:]+):(?P<line>\d+):(?P<col>\d+):\s*(?P<code>\S+)\s+(?P<message>.+)$").unwrap())
}

#[async_trait]
impl Collector for StyleLintCollector {
    fn tool_name(&self) -> &'static str {
        "style_lint"
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
            &["check", "."],
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

        let _ = write_artifact(&ctx.artifact_path("ruff.log"), &output.stdout).await;

        let mut errors = Vec::new();
        // Exit 0: clean. Exit 1: findings present, still parse. Any other
        // code: a tool failure, but we still attempt to parse whatever it
        // printed since partial output can still be useful.
        if let Some(code) = output.exit_code {
            if code != 0 && code != 1 {
                errors.push(format!("{} exited with unexpected status {code}", self.program));
            }
        } else if output.timed_out {
            errors.push(format!("{} timed out", self.program));
        }

        let mut findings = Vec::new();
        for line in output.stdout.lines() {
            let Some(caps) = line_re().captures(line) else {
                continue;
            };
            let id = match ctx.ids.next("FND") {
                Ok(id) => id,
                Err(e) => {
                    errors.push(e.to_string());
                    continue;
                }
            };
            let message = format!("{}: {}", &caps["code"], &caps["message"]);
            match FindingRecord::new(id, self.tool_name(), "warning", message, Utc::now()) {
                Ok(finding) => {
                    let finding = finding
                        .with_location(
                            &caps["file"],
                            caps["line"].parse().ok(),
                            caps["col"].parse().ok(),
                        )
                        .with_code(&caps["code"])
                        .with_tags(vec!["lint".to_string()]);
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
    fn parses_path_line_col_code_message() {
        let caps = line_re()
            .captures("src/auth/login.py:12:5: E501 line too long")
            .unwrap();
        assert_eq!(&caps["file"], "src/auth/login.py");
        assert_eq!(&caps["line"], "12");
        assert_eq!(&caps["col"], "5");
        assert_eq!(&caps["code"], "E501");
        assert_eq!(&caps["message"], "line too long");
    }

    #[test]
    fn ignores_non_matching_lines() {
        assert!(line_re().captures("Found 3 errors.").is_none());
    }
}
