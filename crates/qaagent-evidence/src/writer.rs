//! Append-only JSONL evidence writer.

use crate::model::RecordType;
use crate::run::RunHandle;
use qaagent_common::error::Result;
use serde::Serialize;
use std::io::Write;

/// Appends records to a run's evidence files, keeping `evidence_files` and
/// `counts` in lockstep with the bytes on disk.
pub struct Writer<'a> {
    run: &'a RunHandle,
}

impl<'a> Writer<'a> {
    pub fn new(run: &'a RunHandle) -> Self {
        Self { run }
    }

    /// Append every record in `records` to the JSONL file for
    /// `record_type`, one line per record, deterministic field order (serde
    /// struct field order). Registers the file, bumps the matching count,
    /// and persists the manifest. Empty input is a no-op.
    pub fn write<T: Serialize>(&self, record_type: RecordType, records: &[T]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let relpath = format!("evidence/{}", record_type.filename());
        let full_path = self.run.run_dir().join(&relpath);

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&full_path)?;
        for record in records {
            let line = serde_json::to_string(record)?;
            file.write_all(line.as_bytes())?;
            file.write_all(b"\n")?;
        }
        file.sync_all()?;

        self.run.register_file(record_type, &relpath)?;
        self.run.increment_count(record_type, records.len() as u64);
        self.run.persist()?;

        Ok(records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FindingRecord;
    use chrono::Utc;
    use tempfile::tempdir;

    #[test]
    fn write_updates_counts_and_evidence_files() {
        let dir = tempdir().unwrap();
        let run = RunHandle::create(dir.path(), "t", "/t").unwrap();
        let writer = Writer::new(&run);

        let finding =
            FindingRecord::new("FND-20260728-0001", "ruff", "warning", "unused import", Utc::now())
                .unwrap();
        let n = writer.write(RecordType::Quality, &[finding]).unwrap();
        assert_eq!(n, 1);

        let manifest = run.manifest();
        assert_eq!(manifest.counts.findings, 1);
        assert_eq!(
            manifest.evidence_files.get("quality"),
            Some(&"evidence/quality.jsonl".to_string())
        );

        let contents = std::fs::read_to_string(run.run_dir().join("evidence/quality.jsonl")).unwrap();
        assert_eq!(contents.lines().count(), 1);
    }

    #[test]
    fn empty_write_is_a_no_op() {
        let dir = tempdir().unwrap();
        let run = RunHandle::create(dir.path(), "t", "/t").unwrap();
        let writer = Writer::new(&run);
        let records: Vec<FindingRecord> = Vec::new();
        let n = writer.write(RecordType::Quality, &records).unwrap();
        assert_eq!(n, 0);
        assert!(!run.run_dir().join("evidence/quality.jsonl").exists());
    }

    #[test]
    fn repeated_writes_append_rather_than_overwrite() {
        let dir = tempdir().unwrap();
        let run = RunHandle::create(dir.path(), "t", "/t").unwrap();
        let writer = Writer::new(&run);
        let f1 = FindingRecord::new("FND-20260728-0001", "ruff", "warning", "a", Utc::now()).unwrap();
        let f2 = FindingRecord::new("FND-20260728-0002", "ruff", "warning", "b", Utc::now()).unwrap();
        writer.write(RecordType::Quality, &[f1]).unwrap();
        writer.write(RecordType::Quality, &[f2]).unwrap();

        assert_eq!(run.manifest().counts.findings, 2);
        let contents = std::fs::read_to_string(run.run_dir().join("evidence/quality.jsonl")).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }
}
