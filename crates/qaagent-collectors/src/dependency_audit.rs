//! Dependency auditor collector.
//!
//! Discovers requirements manifests in the target and invokes a
//! `pip-audit -f json -r <manifest>`-shaped tool once per manifest,
//! emitting one finding per advertised vulnerability.

use crate::contract::{Collector, CollectorContext, CollectorResult};
use crate::process::{invoke, probe, write_artifact};
use async_trait::async_trait;
use chrono::Utc;
use qaagent_evidence::model::FindingRecord;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub struct DependencyAuditCollector {
    pub program: String,
}

impl Default for DependencyAuditCollector {
    fn default() -> Self {
        Self {
            program: "pip-audit".to_string(),
        }
    }
}

const MANIFEST_NAMES: &[&str] = &[
    "requirements.txt",
    "requirements-dev.txt",
    "requirements-test.txt",
    "pyproject.toml",
];

fn discover_manifests(root: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();
    for name in MANIFEST_NAMES {
        let candidate = root.join(name);
        if candidate.is_file() {
            found.push(candidate);
        }
    }
    found
}

#[derive(Debug, Deserialize)]
struct AuditReport {
    #[serde(default)]
    dependencies: Vec<AuditDependency>,
}

#[derive(Debug, Deserialize)]
struct AuditDependency {
    name: String,
    version: String,
    #[serde(default)]
    vulns: Vec<AuditVuln>,
}

#[derive(Debug, Deserialize)]
struct AuditVuln {
    id: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    fix_versions: Vec<String>,
}

#[async_trait]
impl Collector for DependencyAuditCollector {
    fn tool_name(&self) -> &'static str {
        "dependency_audit"
    }

    async fn run(&self, ctx: &CollectorContext<'_>) -> CollectorResult {
        let started_at = Utc::now();
        let manifests = discover_manifests(&ctx.target_path);
        if manifests.is_empty() {
            return CollectorResult::not_found(
                self.tool_name(),
                started_at,
                "no supported dependency manifest found",
            );
        }

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

        let mut errors = Vec::new();
        let mut findings = Vec::new();
        let mut last_exit_code = None;

        for manifest in &manifests {
            let manifest_name = manifest
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "manifest".to_string());
            let output = match invoke(
                &self.program,
                &["-f", "json", "-r", manifest.to_str().unwrap_or_default()],
                &ctx.target_path,
                ctx.timeout,
            )
            .await
            {
                Ok(o) => o,
                Err(e) => {
                    errors.push(format!("{manifest_name}: {e}"));
                    continue;
                }
            };
            last_exit_code = output.exit_code;

            let _ = write_artifact(
                &ctx.artifact_path(&format!("dependency_audit.{manifest_name}.json")),
                &output.stdout,
            )
            .await;

            let report: AuditReport = match serde_json::from_str(&output.stdout) {
                Ok(r) => r,
                Err(e) => {
                    errors.push(format!("failed to parse audit output for {manifest_name}: {e}"));
                    continue;
                }
            };

            for dep in report.dependencies {
                for vuln in &dep.vulns {
                    let id = match ctx.ids.next("FND") {
                        Ok(id) => id,
                        Err(e) => {
                            errors.push(e.to_string());
                            continue;
                        }
                    };
                    let severity = if vuln.fix_versions.is_empty() { "high" } else { "critical" };
                    let message = if vuln.description.is_empty() {
                        format!("{} {} is affected by {}", dep.name, dep.version, vuln.id)
                    } else {
                        vuln.description.clone()
                    };
                    match FindingRecord::new(id, self.tool_name(), severity, message, Utc::now()) {
                        Ok(finding) => {
                            let mut metadata = serde_json::Map::new();
                            metadata.insert("package".to_string(), serde_json::json!(dep.name));
                            metadata.insert("installed_version".to_string(), serde_json::json!(dep.version));
                            metadata.insert("vulnerability_id".to_string(), serde_json::json!(vuln.id));
                            if !vuln.fix_versions.is_empty() {
                                metadata.insert("fix_versions".to_string(), serde_json::json!(vuln.fix_versions));
                            }
                            let finding = finding
                                .with_location(manifest_name.clone(), None, None)
                                .with_code(vuln.id.clone())
                                .with_tags(vec!["dependency".to_string(), "security".to_string()])
                                .with_metadata(metadata);
                            findings.push(finding);
                        }
                        Err(e) => errors.push(e.to_string()),
                    }
                }
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
            exit_code: last_exit_code,
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
    fn discovers_requirements_txt() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("requirements.txt"), "flask==1.0\n").unwrap();
        let found = discover_manifests(dir.path());
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn no_manifests_found_in_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_manifests(dir.path()).is_empty());
    }

    #[test]
    fn severity_is_critical_when_fix_available() {
        let raw = r#"{"dependencies":[{"name":"flask","version":"1.0","vulns":[{"id":"GHSA-1","description":"x","fix_versions":["1.1"]}]}]}"#;
        let report: AuditReport = serde_json::from_str(raw).unwrap();
        assert!(!report.dependencies[0].vulns[0].fix_versions.is_empty());
    }
}
