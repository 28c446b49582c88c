//! Typed JSONL evidence readers.
//!
//! Robust to the three conditions the reader contract calls out: a missing
//! file (empty sequence, debug log), a malformed line (skipped, warning
//! log, continue), and unknown/extra fields (silently ignored by serde's
//! default struct decoding).

use crate::model::{ChurnRecord, CoverageRecord, FindingRecord, RecommendationRecord, RiskRecord};
use crate::run::RunHandle;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Reads evidence back out of a run directory.
pub struct Reader<'a> {
    run: &'a RunHandle,
}

impl<'a> Reader<'a> {
    pub fn new(run: &'a RunHandle) -> Self {
        Self { run }
    }

    pub fn findings(&self) -> Vec<FindingRecord> {
        self.load("evidence/quality.jsonl")
    }

    pub fn coverage(&self) -> Vec<CoverageRecord> {
        self.load("evidence/coverage.jsonl")
    }

    pub fn churn(&self) -> Vec<ChurnRecord> {
        self.load("evidence/churn.jsonl")
    }

    pub fn risks(&self) -> Vec<RiskRecord> {
        self.load("evidence/risks.jsonl")
    }

    pub fn recommendations(&self) -> Vec<RecommendationRecord> {
        self.load("evidence/recommendations.jsonl")
    }

    fn load<T: DeserializeOwned>(&self, relpath: &str) -> Vec<T> {
        load_jsonl(&self.run.run_dir().join(relpath))
    }
}

/// Load a JSONL file into a `Vec<T>`, independent of a `RunHandle` (used by
/// the API crate, which only has a run directory path).
pub fn load_jsonl<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => {
            tracing::debug!(path = %path.display(), "evidence file missing, returning empty set");
            return Vec::new();
        }
    };

    let mut out = Vec::new();
    for (i, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<T>(line) {
            Ok(record) => out.push(record),
            Err(e) => {
                tracing::warn!(path = %path.display(), line = i + 1, error = %e, "skipping malformed evidence line");
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RecordType;
    use crate::writer::Writer;
    use chrono::Utc;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_empty_vec() {
        let dir = tempdir().unwrap();
        let run = RunHandle::create(dir.path(), "t", "/t").unwrap();
        let reader = Reader::new(&run);
        assert!(reader.risks().is_empty());
    }

    #[test]
    fn malformed_line_is_skipped_not_fatal() {
        let dir = tempdir().unwrap();
        let run = RunHandle::create(dir.path(), "t", "/t").unwrap();
        let good = FindingRecord::new("FND-20260728-0001", "ruff", "warning", "ok", Utc::now()).unwrap();
        Writer::new(&run).write(RecordType::Quality, &[good]).unwrap();

        let path = run.run_dir().join("evidence/quality.jsonl");
        let mut contents = std::fs::read_to_string(&path).unwrap();
        contents.push_str("not valid json\n");
        std::fs::write(&path, contents).unwrap();

        let reader = Reader::new(&run);
        let findings = reader.findings();
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn round_trip_preserves_semantic_fields() {
        let dir = tempdir().unwrap();
        let run = RunHandle::create(dir.path(), "t", "/t").unwrap();
        let finding = FindingRecord::new("FND-20260728-0001", "ruff", "warning", "msg", Utc::now())
            .unwrap()
            .with_location("src/a.py", Some(1), Some(2));
        Writer::new(&run)
            .write(RecordType::Quality, &[finding.clone()])
            .unwrap();

        let loaded = Reader::new(&run).findings();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].evidence_id, finding.evidence_id);
        assert_eq!(loaded[0].file, finding.file);
    }
}
