//! Deterministic `<PREFIX>-YYYYMMDD-NNNN` evidence id allocation.

use qaagent_common::error::{Error, Result};
use std::collections::HashMap;

/// Allocates evidence ids for a single run. Counters are per-prefix and
/// reset whenever a new generator is constructed (i.e. per run).
#[derive(Debug, Clone)]
pub struct IdGenerator {
    date_prefix: String,
    counters: HashMap<String, u32>,
}

impl IdGenerator {
    /// Build a generator from a run id, extracting its 8-digit date prefix.
    /// `run_id` is expected to start with `YYYYMMDD` (the run-id format is
    /// `YYYYMMDD_HHMMSSZ[_NN]`).
    pub fn from_run_id(run_id: &str) -> Result<Self> {
        let date = run_id.get(0..8).ok_or_else(|| {
            Error::validation(format!("run id too short to contain a date prefix: {run_id}"))
        })?;
        if date.len() != 8 || !date.chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::validation(format!(
                "malformed run id date prefix: {run_id}"
            )));
        }
        Ok(Self {
            date_prefix: date.to_string(),
            counters: HashMap::new(),
        })
    }

    /// Allocate the next id for `prefix`, e.g. `FND-20260728-0001`.
    pub fn next(&mut self, prefix: &str) -> Result<String> {
        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(Error::validation(format!(
                "evidence id prefix must be non-empty and alphabetic: {prefix}"
            )));
        }
        let counter = self.counters.entry(prefix.to_uppercase()).or_insert(0);
        *counter += 1;
        Ok(format!(
            "{}-{}-{:04}",
            prefix.to_uppercase(),
            self.date_prefix,
            counter
        ))
    }
}

/// A thread-safe handle to an [`IdGenerator`], for collectors that may run
/// concurrently against the same run.
#[derive(Clone)]
pub struct SharedIdGenerator(std::sync::Arc<std::sync::Mutex<IdGenerator>>);

impl SharedIdGenerator {
    pub fn new(generator: IdGenerator) -> Self {
        Self(std::sync::Arc::new(std::sync::Mutex::new(generator)))
    }

    pub fn next(&self, prefix: &str) -> Result<String> {
        self.0.lock().unwrap().next(prefix)
    }
}

/// Known evidence id prefixes.
pub mod prefixes {
    pub const FINDING: &str = "FND";
    pub const COVERAGE: &str = "COV";
    pub const CHURN: &str = "CHN";
    pub const RISK: &str = "RSK";
    pub const RECOMMENDATION: &str = "REC";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_strictly_increasing_per_prefix() {
        let mut gen = IdGenerator::from_run_id("20260728_100503Z").unwrap();
        assert_eq!(gen.next("FND").unwrap(), "FND-20260728-0001");
        assert_eq!(gen.next("FND").unwrap(), "FND-20260728-0002");
        assert_eq!(gen.next("COV").unwrap(), "COV-20260728-0001");
    }

    #[test]
    fn rejects_empty_or_non_alpha_prefix() {
        let mut gen = IdGenerator::from_run_id("20260728_100503Z").unwrap();
        assert!(gen.next("").is_err());
        assert!(gen.next("FND1").is_err());
    }

    #[test]
    fn rejects_malformed_run_id() {
        assert!(IdGenerator::from_run_id("not-a-run-id").is_err());
        assert!(IdGenerator::from_run_id("2026").is_err());
    }

    #[test]
    fn counters_are_zero_padded_to_four_digits() {
        let mut gen = IdGenerator::from_run_id("20260728_100503Z").unwrap();
        for _ in 0..9999 {
            gen.next("FND").unwrap();
        }
        assert_eq!(gen.next("FND").unwrap(), "FND-20260728-10000");
    }
}
