//! Coverage ingester collector.
//!
//! Unlike the other collectors, this one never shells out: it reads a
//! coverage report already produced by the target's own test run, preferring
//! a Cobertura-style XML report over an LCOV text report when both exist.

use crate::contract::{Collector, CollectorContext, CollectorResult};
use async_trait::async_trait;
use chrono::Utc;
use qaagent_evidence::model::{CoverageRecord, OVERALL_COMPONENT};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub struct CoverageIngestCollector;

impl Default for CoverageIngestCollector {
    fn default() -> Self {
        Self
    }
}

const XML_CANDIDATES: &[&str] = &["coverage.xml", "cobertura.xml"];
const LCOV_CANDIDATES: &[&str] = &["lcov.info", "coverage.lcov"];

fn find_report(root: &Path) -> Option<(PathBuf, ReportKind)> {
    for name in XML_CANDIDATES {
        let candidate = root.join(name);
        if candidate.is_file() {
            return Some((candidate, ReportKind::Xml));
        }
    }
    for name in LCOV_CANDIDATES {
        let candidate = root.join(name);
        if candidate.is_file() {
            return Some((candidate, ReportKind::Lcov));
        }
    }
    None
}

enum ReportKind {
    Xml,
    Lcov,
}

struct FileCoverage {
    path: String,
    total: u64,
    covered: u64,
}

fn class_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"<class[^>]*\bfilename="(?P<filename>[^"]+)"[^>]*>(?P<body>.*?)</class>"#).unwrap()
    })
}

fn line_hit_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"<line\b[^>]*\bhits="(?P<hits>\d+)""#).unwrap())
}

/// Parses the subset of Cobertura XML we need: one `<class filename=...>`
/// element per source file, each containing `<line hits="N">` children.
fn parse_cobertura(xml: &str) -> Vec<FileCoverage> {
    let mut files = Vec::new();
    for caps in class_re().captures_iter(xml) {
        let filename = caps["filename"].to_string();
        let body = &caps["body"];
        let mut total = 0u64;
        let mut covered = 0u64;
        for hit in line_hit_re().captures_iter(body) {
            total += 1;
            if hit["hits"].parse::<u64>().unwrap_or(0) > 0 {
                covered += 1;
            }
        }
        if total > 0 {
            files.push(FileCoverage {
                path: filename,
                total,
                covered,
            });
        }
    }
    files
}

/// Parses LCOV's `SF:`/`DA:`/`end_of_record` text format.
fn parse_lcov(text: &str) -> Vec<FileCoverage> {
    let mut files = Vec::new();
    let mut current_path: Option<String> = None;
    let mut total = 0u64;
    let mut covered = 0u64;
    for line in text.lines() {
        if let Some(path) = line.strip_prefix("SF:") {
            current_path = Some(path.to_string());
            total = 0;
            covered = 0;
        } else if let Some(rest) = line.strip_prefix("DA:") {
            total += 1;
            if let Some((_, hits)) = rest.split_once(',') {
                if hits.trim().parse::<u64>().unwrap_or(0) > 0 {
                    covered += 1;
                }
            }
        } else if line == "end_of_record" {
            if let Some(path) = current_path.take() {
                if total > 0 {
                    files.push(FileCoverage { path, total, covered });
                }
            }
        }
    }
    files
}

#[async_trait]
impl Collector for CoverageIngestCollector {
    fn tool_name(&self) -> &'static str {
        "coverage_ingest"
    }

    async fn run(&self, ctx: &CollectorContext<'_>) -> CollectorResult {
        let started_at = Utc::now();
        let Some((path, kind)) = find_report(&ctx.target_path) else {
            return CollectorResult::not_found(
                self.tool_name(),
                started_at,
                "no coverage report found",
            );
        };
        if ctx.probe_only {
            return CollectorResult::probed(self.tool_name(), started_at, None);
        }

        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(r) => r,
            Err(e) => {
                return CollectorResult {
                    tool_name: self.tool_name().to_string(),
                    version: None,
                    executed: true,
                    exit_code: None,
                    findings: 0,
                    diagnostics: Vec::new(),
                    errors: vec![format!("failed to read {}: {e}", path.display())],
                    started_at,
                    finished_at: Utc::now(),
                };
            }
        };

        let files = match kind {
            ReportKind::Xml => parse_cobertura(&raw),
            ReportKind::Lcov => parse_lcov(&raw),
        };

        let mut errors = Vec::new();
        let mut records = Vec::new();
        let mut overall_total = 0u64;
        let mut overall_covered = 0u64;

        for file in &files {
            overall_total += file.total;
            overall_covered += file.covered;
            let id = match ctx.ids.next("COV") {
                Ok(id) => id,
                Err(e) => {
                    errors.push(e.to_string());
                    continue;
                }
            };
            let value = file.covered as f64 / file.total as f64;
            // Tolerate a report without a <sources> element: treat the
            // filename as already relative to the target root.
            let component = file.path.clone();
            match CoverageRecord::new(id, "line", component, value, Utc::now()) {
                Ok(record) => records.push(record.with_statements(file.total, file.covered)),
                Err(e) => errors.push(e.to_string()),
            }
        }

        if overall_total > 0 {
            match ctx.ids.next("COV") {
                Ok(id) => {
                    let overall_value = overall_covered as f64 / overall_total as f64;
                    match CoverageRecord::new(id, "line", OVERALL_COMPONENT, overall_value, Utc::now()) {
                        Ok(record) => records.push(record.with_statements(overall_total, overall_covered)),
                        Err(e) => errors.push(e.to_string()),
                    }
                }
                Err(e) => errors.push(e.to_string()),
            }
        }

        let count = records.len();
        if let Err(e) = ctx.writer().write(qaagent_evidence::model::RecordType::Coverage, &records) {
            errors.push(e.to_string());
        }

        CollectorResult {
            tool_name: self.tool_name().to_string(),
            version: None,
            executed: true,
            exit_code: Some(0),
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
    fn parses_cobertura_line_hits() {
        let xml = r#"<coverage><packages><package><classes>
            <class filename="src/a.py"><lines><line number="1" hits="1"/><line number="2" hits="0"/></lines></class>
        </classes></package></packages></coverage>"#;
        let files = parse_cobertura(xml);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].total, 2);
        assert_eq!(files[0].covered, 1);
    }

    #[test]
    fn parses_lcov_records() {
        let lcov = "SF:src/a.py\nDA:1,1\nDA:2,0\nend_of_record\n";
        let files = parse_lcov(lcov);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "src/a.py");
        assert_eq!(files[0].total, 2);
        assert_eq!(files[0].covered, 1);
    }

    #[test]
    fn prefers_xml_over_lcov_when_both_present() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("coverage.xml"), "<coverage/>").unwrap();
        std::fs::write(dir.path().join("lcov.info"), "").unwrap();
        let (path, kind) = find_report(dir.path()).unwrap();
        assert!(path.ends_with("coverage.xml"));
        assert!(matches!(kind, ReportKind::Xml));
    }

    #[tokio::test]
    async fn probe_only_reports_presence_without_reading_the_report() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("coverage.xml"), "<coverage/>").unwrap();
        let run = qaagent_evidence::RunHandle::create(dir.path(), "t", "/t").unwrap();
        let ids = qaagent_evidence::SharedIdGenerator::new(
            qaagent_evidence::IdGenerator::from_run_id(run.run_id()).unwrap(),
        );
        let ctx = CollectorContext::new(dir.path(), &run, ids).with_probe_only(true);

        let collector = CoverageIngestCollector::default();
        let result = collector.run(&ctx).await;
        assert!(result.executed);
        assert_eq!(result.findings, 0);
        assert!(run
            .run_dir()
            .join("evidence/coverage.jsonl")
            .exists()
            .then_some(())
            .is_none());
    }
}
