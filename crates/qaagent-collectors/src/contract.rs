//! The shared contract every collector implements.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use qaagent_evidence::model::{FindingRecord, RecordType};
use qaagent_evidence::run::RunHandle;
use qaagent_evidence::writer::Writer;
use qaagent_evidence::SharedIdGenerator;
use std::path::PathBuf;
use std::time::Duration;

/// Everything a collector needs to probe, invoke, and normalize one tool's
/// output against a run.
pub struct CollectorContext<'a> {
    pub target_path: PathBuf,
    pub run: &'a RunHandle,
    pub ids: SharedIdGenerator,
    pub timeout: Duration,
    pub probe_only: bool,
}

impl<'a> CollectorContext<'a> {
    pub fn new(target_path: impl Into<PathBuf>, run: &'a RunHandle, ids: SharedIdGenerator) -> Self {
        Self {
            target_path: target_path.into(),
            run,
            ids,
            timeout: Duration::from_secs(120),
            probe_only: false,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// When set, collectors stop after detecting tool presence: no
    /// invocation, no evidence written. Used by `analyze collectors
    /// --dry-run`.
    pub fn with_probe_only(mut self, probe_only: bool) -> Self {
        self.probe_only = probe_only;
        self
    }

    pub fn writer(&self) -> Writer<'_> {
        Writer::new(self.run)
    }

    /// Write findings (non-empty) to `quality.jsonl`.
    pub fn write_findings(&self, findings: &[FindingRecord]) -> qaagent_common::error::Result<usize> {
        self.writer().write(RecordType::Quality, findings)
    }

    pub fn artifact_path(&self, filename: &str) -> PathBuf {
        self.run.run_dir().join("artifacts").join(filename)
    }
}

/// The outcome of running one collector, independent of whether it wrote
/// any evidence.
#[derive(Debug, Clone)]
pub struct CollectorResult {
    pub tool_name: String,
    pub version: Option<String>,
    pub executed: bool,
    pub exit_code: Option<i32>,
    pub findings: usize,
    pub diagnostics: Vec<String>,
    pub errors: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CollectorResult {
    pub fn not_found(tool_name: impl Into<String>, started_at: DateTime<Utc>, reason: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            version: None,
            executed: false,
            exit_code: None,
            findings: 0,
            diagnostics: vec![reason.into()],
            errors: Vec::new(),
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// A tool was detected present but `probe_only` stopped the collector
    /// before invocation. Reported as `executed` so `analyze collectors
    /// --dry-run`'s availability table reads as "found", not "missing".
    pub fn probed(tool_name: impl Into<String>, started_at: DateTime<Utc>, version: Option<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            version,
            executed: true,
            exit_code: None,
            findings: 0,
            diagnostics: vec!["dry run: tool present, not invoked".to_string()],
            errors: Vec::new(),
            started_at,
            finished_at: Utc::now(),
        }
    }
}

/// A single external-tool collector. `run` never propagates an error:
/// per the failure policy, tool-local errors are contained in
/// `CollectorResult::errors` and the manifest's `ToolStatus`, and a run
/// continues regardless.
#[async_trait]
pub trait Collector: Send + Sync {
    /// The tool name as it appears in `manifest.tools` and in
    /// `artifacts/<tool>.log`.
    fn tool_name(&self) -> &'static str;

    async fn run(&self, ctx: &CollectorContext<'_>) -> CollectorResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probed_result_is_executed_with_no_findings() {
        let result = CollectorResult::probed("style_lint", Utc::now(), Some("1.2.3".to_string()));
        assert!(result.executed);
        assert_eq!(result.findings, 0);
        assert_eq!(result.version.as_deref(), Some("1.2.3"));
        assert!(result.errors.is_empty());
    }
}
