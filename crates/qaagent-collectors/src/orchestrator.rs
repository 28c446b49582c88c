//! Runs every collector against one run and records structured start/finish
//! events to the run's log file.

use crate::contract::{Collector, CollectorContext, CollectorResult};
use qaagent_evidence::model::ToolStatus;
use qaagent_evidence::run::RunHandle;
use qaagent_evidence::SharedIdGenerator;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

#[derive(Serialize)]
#[serde(tag = "event")]
enum LogEvent<'a> {
    #[serde(rename = "collector.start")]
    Start { tool: &'a str, at: chrono::DateTime<chrono::Utc> },
    #[serde(rename = "collector.finish")]
    Finish {
        tool: &'a str,
        executed: bool,
        findings: usize,
        diagnostics: &'a [String],
        errors: &'a [String],
        at: chrono::DateTime<chrono::Utc>,
    },
}

fn append_event(log_path: &Path, event: &LogEvent) -> qaagent_common::error::Result<()> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::OpenOptions::new().create(true).append(true).open(log_path)?;
    let line = serde_json::to_string(event)?;
    file.write_all(line.as_bytes())?;
    file.write_all(b"\n")?;
    Ok(())
}

/// Runs each collector in `collectors` against `run` in order, appending a
/// `collector.start`/`collector.finish` pair to `logs_root/<run_id>.jsonl`
/// around every invocation, and records each tool's [`ToolStatus`] on the
/// manifest. Collectors never abort the orchestrator; one tool's failure is
/// contained in its own `ToolStatus`.
pub async fn run_all(
    run: &RunHandle,
    target_path: impl Into<std::path::PathBuf>,
    ids: SharedIdGenerator,
    timeout: Duration,
    logs_root: &Path,
    collectors: Vec<Box<dyn Collector>>,
) -> Vec<CollectorResult> {
    let target_path = target_path.into();
    let log_path = logs_root.join(format!("{}.jsonl", run.run_id()));
    let mut results = Vec::new();

    for collector in collectors {
        let ctx = CollectorContext::new(target_path.clone(), run, ids.clone()).with_timeout(timeout);

        let _ = append_event(
            &log_path,
            &LogEvent::Start {
                tool: collector.tool_name(),
                at: chrono::Utc::now(),
            },
        );

        let result = collector.run(&ctx).await;

        let _ = append_event(
            &log_path,
            &LogEvent::Finish {
                tool: collector.tool_name(),
                executed: result.executed,
                findings: result.findings,
                diagnostics: &result.diagnostics,
                errors: &result.errors,
                at: result.finished_at,
            },
        );

        let status = if !result.executed {
            ToolStatus::unavailable(
                result
                    .diagnostics
                    .first()
                    .cloned()
                    .unwrap_or_else(|| "tool unavailable".to_string()),
            )
        } else if !result.errors.is_empty() {
            ToolStatus::failed(result.exit_code, result.errors.join("; "))
        } else {
            ToolStatus::ok(result.version.clone(), result.exit_code.unwrap_or(0))
        };
        run.set_tool(&result.tool_name, status);
        let _ = run.persist();

        results.push(result);
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::CollectorResult;
    use async_trait::async_trait;
    use chrono::Utc;
    use qaagent_evidence::IdGenerator;

    struct StubCollector;

    #[async_trait]
    impl Collector for StubCollector {
        fn tool_name(&self) -> &'static str {
            "stub"
        }

        async fn run(&self, _ctx: &CollectorContext<'_>) -> CollectorResult {
            let now = Utc::now();
            CollectorResult {
                tool_name: "stub".to_string(),
                version: Some("1.0".to_string()),
                executed: true,
                exit_code: Some(0),
                findings: 0,
                diagnostics: Vec::new(),
                errors: Vec::new(),
                started_at: now,
                finished_at: now,
            }
        }
    }

    #[tokio::test]
    async fn writes_one_start_and_finish_event_per_collector() {
        let dir = tempfile::tempdir().unwrap();
        let run = RunHandle::create(dir.path(), "t", "/t").unwrap();
        let ids = SharedIdGenerator::new(IdGenerator::from_run_id(run.run_id()).unwrap());
        let logs = dir.path().join("logs");

        let results = run_all(
            &run,
            "/t",
            ids,
            Duration::from_secs(5),
            &logs,
            vec![Box::new(StubCollector)],
        )
        .await;

        assert_eq!(results.len(), 1);
        let log_contents = std::fs::read_to_string(logs.join(format!("{}.jsonl", run.run_id()))).unwrap();
        assert_eq!(log_contents.lines().count(), 2);
        assert!(run.manifest().tool_executed("stub"));
    }
}
