//! Evidence Contract types.
//!
//! Durable JSON shapes for the manifest and the five evidence categories.
//! Construction is validated: scores and confidences are checked against
//! their declared ranges at construction, never at serialization time, so a
//! `RiskRecord` that exists in memory is always a `RiskRecord` that could be
//! written.

use chrono::{DateTime, Utc};
use qaagent_common::error::Error;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Git metadata attached to a `Target`, when the target path is a repo.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TargetGit {
    pub commit: String,
    pub branch: String,
}

/// The repository this run analyzed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Target {
    pub name: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git: Option<TargetGit>,
}

impl Target {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            git: None,
        }
    }

    pub fn with_git(mut self, commit: impl Into<String>, branch: impl Into<String>) -> Self {
        self.git = Some(TargetGit {
            commit: commit.into(),
            branch: branch.into(),
        });
        self
    }
}

/// Per-tool execution outcome, one entry per tool per run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub executed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolStatus {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            version: None,
            executed: false,
            exit_code: None,
            error: Some(reason.into()),
        }
    }

    pub fn ok(version: Option<String>, exit_code: i32) -> Self {
        Self {
            version,
            executed: true,
            exit_code: Some(exit_code),
            error: None,
        }
    }

    pub fn failed(exit_code: Option<i32>, error: impl Into<String>) -> Self {
        Self {
            version: None,
            executed: true,
            exit_code,
            error: Some(error.into()),
        }
    }
}

/// Evidence record counts, one bucket per category.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Counts {
    pub findings: u64,
    pub coverage_components: u64,
    pub churn_records: u64,
    pub risks: u64,
    pub recommendations: u64,
}

/// The categories an evidence writer can append to. Each maps to one JSONL
/// file and one `counts` bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    Quality,
    Coverage,
    Churn,
    Risks,
    Recommendations,
}

impl RecordType {
    /// JSONL filename, relative to `evidence/`.
    pub fn filename(self) -> &'static str {
        match self {
            RecordType::Quality => "quality.jsonl",
            RecordType::Coverage => "coverage.jsonl",
            RecordType::Churn => "churn.jsonl",
            RecordType::Risks => "risks.jsonl",
            RecordType::Recommendations => "recommendations.jsonl",
        }
    }

    /// The manifest-category key used in `evidence_files`.
    pub fn category(self) -> &'static str {
        match self {
            RecordType::Quality => "quality",
            RecordType::Coverage => "coverage",
            RecordType::Churn => "churn",
            RecordType::Risks => "risks",
            RecordType::Recommendations => "recommendations",
        }
    }

    pub fn count_mut(self, counts: &mut Counts) -> &mut u64 {
        match self {
            RecordType::Quality => &mut counts.findings,
            RecordType::Coverage => &mut counts.coverage_components,
            RecordType::Churn => &mut counts.churn_records,
            RecordType::Risks => &mut counts.risks,
            RecordType::Recommendations => &mut counts.recommendations,
        }
    }
}

/// The manifest: the authoritative index for a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Manifest {
    pub run_id: String,
    pub created_at: DateTime<Utc>,
    pub target: Target,
    #[serde(default)]
    pub tools: BTreeMap<String, ToolStatus>,
    #[serde(default)]
    pub counts: Counts,
    #[serde(default)]
    pub evidence_files: BTreeMap<String, String>,
}

impl Manifest {
    pub fn new(run_id: impl Into<String>, created_at: DateTime<Utc>, target: Target) -> Self {
        Self {
            run_id: run_id.into(),
            created_at,
            target,
            tools: BTreeMap::new(),
            counts: Counts::default(),
            evidence_files: BTreeMap::new(),
        }
    }

    /// Look up whether a given tool executed successfully on this run.
    pub fn tool_executed(&self, tool: &str) -> bool {
        self.tools.get(tool).is_some_and(|s| s.executed)
    }

    /// The exit code a tool reported, if it ran.
    pub fn tool_exit_code(&self, tool: &str) -> Option<i32> {
        self.tools.get(tool).and_then(|s| s.exit_code)
    }
}

const SEVERITIES: [&str; 4] = ["info", "warning", "high", "critical"];

/// A normalized finding from a lint, security, or dependency-audit collector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FindingRecord {
    pub evidence_id: String,
    pub tool: String,
    pub severity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    pub collected_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

#[allow(clippy::too_many_arguments)]
impl FindingRecord {
    pub fn new(
        evidence_id: impl Into<String>,
        tool: impl Into<String>,
        severity: impl Into<String>,
        message: impl Into<String>,
        collected_at: DateTime<Utc>,
    ) -> qaagent_common::error::Result<Self> {
        let severity = severity.into();
        if !SEVERITIES.contains(&severity.as_str()) {
            return Err(Error::validation(format!(
                "invalid finding severity: {severity}"
            )));
        }
        Ok(Self {
            evidence_id: evidence_id.into(),
            tool: tool.into(),
            severity,
            code: None,
            message: message.into(),
            file: None,
            line: None,
            column: None,
            tags: Vec::new(),
            confidence: None,
            collected_at,
            metadata: serde_json::Map::new(),
        })
    }

    pub fn with_location(mut self, file: impl Into<String>, line: Option<u32>, column: Option<u32>) -> Self {
        self.file = Some(file.into());
        self.line = line;
        self.column = column;
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Map<String, serde_json::Value>) -> Self {
        self.metadata = metadata;
        self
    }
}

/// The synthetic component name carrying project-wide coverage.
pub const OVERALL_COMPONENT: &str = "__overall__";

/// A coverage measurement for one component (or the synthetic overall one).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoverageRecord {
    pub coverage_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub component: String,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_statements: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub covered_statements: Option<u64>,
    #[serde(default)]
    pub sources: Vec<String>,
    pub collected_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl CoverageRecord {
    pub fn new(
        coverage_id: impl Into<String>,
        kind: impl Into<String>,
        component: impl Into<String>,
        value: f64,
        collected_at: DateTime<Utc>,
    ) -> qaagent_common::error::Result<Self> {
        if !(0.0..=1.0).contains(&value) {
            return Err(Error::validation(format!(
                "coverage value {value} out of range [0,1]"
            )));
        }
        Ok(Self {
            coverage_id: coverage_id.into(),
            kind: kind.into(),
            component: component.into(),
            value,
            total_statements: None,
            covered_statements: None,
            sources: Vec::new(),
            collected_at,
            metadata: serde_json::Map::new(),
        })
    }

    pub fn with_statements(mut self, total: u64, covered: u64) -> Self {
        self.total_statements = Some(total);
        self.covered_statements = Some(covered);
        self
    }

    pub fn with_sources(mut self, sources: Vec<String>) -> Self {
        self.sources = sources;
        self
    }

    pub fn is_overall(&self) -> bool {
        self.component == OVERALL_COMPONENT
    }
}

/// Version-control churn aggregated over a time window, per path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChurnRecord {
    pub evidence_id: String,
    pub path: String,
    pub window: String,
    pub commits: u64,
    pub lines_added: u64,
    pub lines_deleted: u64,
    pub contributors: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_commit_at: Option<DateTime<Utc>>,
}

impl ChurnRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        evidence_id: impl Into<String>,
        path: impl Into<String>,
        window: impl Into<String>,
        commits: u64,
        lines_added: u64,
        lines_deleted: u64,
        contributors: u64,
        last_commit_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            evidence_id: evidence_id.into(),
            path: path.into(),
            window: window.into(),
            commits,
            lines_added,
            lines_deleted,
            contributors,
            last_commit_at,
        }
    }
}

const BAND_NAMES: [&str; 4] = ["P0", "P1", "P2", "P3"];
const SEVERITY_LABELS: [&str; 4] = ["critical", "high", "medium", "low"];

/// An aggregated risk score for one component.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskRecord {
    pub risk_id: String,
    pub component: String,
    pub score: f64,
    pub band: String,
    pub confidence: f64,
    pub severity: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub evidence_refs: Vec<String>,
    #[serde(default)]
    pub factors: BTreeMap<String, f64>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

#[allow(clippy::too_many_arguments)]
impl RiskRecord {
    pub fn new(
        risk_id: impl Into<String>,
        component: impl Into<String>,
        score: f64,
        max_score: f64,
        band: impl Into<String>,
        confidence: f64,
        severity: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> qaagent_common::error::Result<Self> {
        if !(0.0..=max_score).contains(&score) {
            return Err(Error::validation(format!(
                "risk score {score} out of range [0,{max_score}]"
            )));
        }
        if !(0.0..=1.0).contains(&confidence) {
            return Err(Error::validation(format!(
                "risk confidence {confidence} out of range [0,1]"
            )));
        }
        let band = band.into();
        if !BAND_NAMES.contains(&band.as_str()) {
            return Err(Error::validation(format!("unknown band: {band}")));
        }
        let severity = severity.into();
        if !SEVERITY_LABELS.contains(&severity.as_str()) {
            return Err(Error::validation(format!("unknown severity: {severity}")));
        }
        Ok(Self {
            risk_id: risk_id.into(),
            component: component.into(),
            score,
            band,
            confidence,
            severity,
            title: title.into(),
            description: description.into(),
            evidence_refs: Vec::new(),
            factors: BTreeMap::new(),
            recommendations: Vec::new(),
            created_at,
            metadata: serde_json::Map::new(),
        })
    }

    pub fn with_evidence_refs(mut self, refs: Vec<String>) -> Self {
        self.evidence_refs = refs;
        self
    }

    pub fn with_factors(mut self, factors: BTreeMap<String, f64>) -> Self {
        self.factors = factors;
        self
    }
}

const PRIORITIES: [&str; 4] = ["critical", "high", "medium", "low"];

/// A prioritized action derived from a risk or a coverage gap.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationRecord {
    pub recommendation_id: String,
    pub component: String,
    pub priority: String,
    pub summary: String,
    pub details: String,
    #[serde(default)]
    pub evidence_refs: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl RecommendationRecord {
    pub fn new(
        recommendation_id: impl Into<String>,
        component: impl Into<String>,
        priority: impl Into<String>,
        summary: impl Into<String>,
        details: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> qaagent_common::error::Result<Self> {
        let priority = priority.into();
        if !PRIORITIES.contains(&priority.as_str()) {
            return Err(Error::validation(format!("unknown priority: {priority}")));
        }
        Ok(Self {
            recommendation_id: recommendation_id.into(),
            component: component.into(),
            priority,
            summary: summary.into(),
            details: details.into(),
            evidence_refs: Vec::new(),
            created_at,
            metadata: serde_json::Map::new(),
        })
    }

    pub fn with_evidence_refs(mut self, refs: Vec<String>) -> Self {
        self.evidence_refs = refs;
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Map<String, serde_json::Value>) -> Self {
        self.metadata = metadata;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 28, 0, 0, 0).unwrap()
    }

    #[test]
    fn finding_rejects_unknown_severity() {
        let err = FindingRecord::new("FND-20260728-0001", "ruff", "fatal", "oops", ts());
        assert!(err.is_err());
    }

    #[test]
    fn coverage_rejects_out_of_range_value() {
        let err = CoverageRecord::new("COV-20260728-0001", "line", "a.py", 1.5, ts());
        assert!(err.is_err());
    }

    #[test]
    fn risk_rejects_score_above_max() {
        let err = RiskRecord::new(
            "RSK-20260728-0001",
            "a.py",
            101.0,
            100.0,
            "P0",
            0.5,
            "critical",
            "t",
            "d",
            ts(),
        );
        assert!(err.is_err());
    }

    #[test]
    fn risk_rejects_unknown_band() {
        let err = RiskRecord::new(
            "RSK-20260728-0001",
            "a.py",
            50.0,
            100.0,
            "P9",
            0.5,
            "medium",
            "t",
            "d",
            ts(),
        );
        assert!(err.is_err());
    }

    #[test]
    fn recommendation_rejects_unknown_priority() {
        let err = RecommendationRecord::new(
            "REC-20260728-0001",
            "a.py",
            "urgent",
            "s",
            "d",
            ts(),
        );
        assert!(err.is_err());
    }
}
