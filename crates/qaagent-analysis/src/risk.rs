//! Per-component risk aggregation: raw factors from findings, coverage, and
//! churn; weighted scores; band and severity assignment; confidence.

use crate::config::RiskConfig;
use chrono::Utc;
use qaagent_evidence::model::{ChurnRecord, CoverageRecord, FindingRecord, RiskRecord, OVERALL_COMPONENT};
use qaagent_evidence::SharedIdGenerator;
use std::collections::{BTreeMap, BTreeSet};

fn security_weight(severity: &str) -> f64 {
    match severity {
        "critical" => 2.0,
        "high" => 2.0,
        "medium" => 1.0,
        "low" => 0.5,
        _ => 1.0,
    }
}

fn severity_from_score(score: f64) -> &'static str {
    if score >= 80.0 {
        "critical"
    } else if score >= 65.0 {
        "high"
    } else if score >= 50.0 {
        "medium"
    } else {
        "low"
    }
}

struct RawFactors {
    security: f64,
    coverage: f64,
    churn: f64,
}

/// Aggregates one [`RiskRecord`] per component that appears in any of
/// `findings`, `coverage`, or `churn`, sorted by score descending.
pub fn aggregate(
    findings: &[FindingRecord],
    coverage: &[CoverageRecord],
    churn: &[ChurnRecord],
    config: &RiskConfig,
    ids: &SharedIdGenerator,
) -> qaagent_common::error::Result<Vec<RiskRecord>> {
    let mut components: BTreeSet<String> = BTreeSet::new();
    for f in findings {
        if let Some(file) = &f.file {
            components.insert(file.clone());
        }
    }
    for c in coverage {
        if !c.is_overall() {
            components.insert(c.component.clone());
        }
    }
    for c in churn {
        components.insert(c.path.clone());
    }

    let security_raw = security_raw_by_component(findings);
    let coverage_raw = coverage_raw_by_component(coverage);
    let churn_raw = churn_raw_by_component(churn);

    let mut records = Vec::with_capacity(components.len());
    for component in &components {
        let raw = RawFactors {
            security: security_raw.get(component).copied().unwrap_or(0.0),
            coverage: coverage_raw.get(component).copied().unwrap_or(0.0),
            churn: churn_raw.get(component).copied().unwrap_or(0.0),
        };

        let weight = |name: &str| config.weights.get(name).copied().unwrap_or(0.0);
        let mut factors = BTreeMap::new();
        factors.insert("security".to_string(), raw.security * weight("security"));
        factors.insert("coverage".to_string(), raw.coverage * weight("coverage"));
        factors.insert("churn".to_string(), raw.churn * weight("churn"));

        let total: f64 = factors.values().sum();
        let score = total.min(config.max_total);
        let band = config.band_for(score);
        let severity = severity_from_score(score);

        let positive_factors = [raw.security, raw.coverage, raw.churn]
            .iter()
            .filter(|v| **v > 0.0)
            .count();
        let confidence = positive_factors as f64 / 3.0;

        let evidence_refs: Vec<String> = findings
            .iter()
            .filter(|f| f.file.as_deref() == Some(component.as_str()))
            .map(|f| f.evidence_id.clone())
            .collect();

        let id = ids.next("RSK")?;
        let record = RiskRecord::new(
            id,
            component.clone(),
            score,
            config.max_total,
            band,
            confidence,
            severity,
            format!("Elevated risk in {component}"),
            format!("Aggregated from {} contributing factor(s).", factors.values().filter(|v| **v > 0.0).count()),
            Utc::now(),
        )?
        .with_evidence_refs(evidence_refs)
        .with_factors(factors);

        records.push(record);
    }

    records.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
    Ok(records)
}

fn security_raw_by_component(findings: &[FindingRecord]) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::new();
    for f in findings {
        let Some(file) = &f.file else { continue };
        *totals.entry(file.clone()).or_insert(0.0) += security_weight(&f.severity);
    }
    totals
}

fn coverage_raw_by_component(coverage: &[CoverageRecord]) -> BTreeMap<String, f64> {
    coverage
        .iter()
        .filter(|c| c.component != OVERALL_COMPONENT)
        .map(|c| (c.component.clone(), (1.0 - c.value).max(0.0)))
        .collect()
}

fn churn_raw_by_component(churn: &[ChurnRecord]) -> BTreeMap<String, f64> {
    let composites: BTreeMap<String, f64> = churn
        .iter()
        .map(|c| {
            (
                c.path.clone(),
                (c.commits + c.lines_added + c.lines_deleted) as f64,
            )
        })
        .collect();

    if composites.is_empty() {
        return composites;
    }

    let min = composites.values().cloned().fold(f64::INFINITY, f64::min);
    let max = composites.values().cloned().fold(f64::NEG_INFINITY, f64::max);

    if (max - min).abs() < f64::EPSILON {
        return composites.keys().map(|k| (k.clone(), 0.0)).collect();
    }

    composites
        .into_iter()
        .map(|(k, v)| (k, (v - min) / (max - min)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use qaagent_evidence::IdGenerator;

    fn ids() -> SharedIdGenerator {
        SharedIdGenerator::new(IdGenerator::from_run_id("20260728_100000Z").unwrap())
    }

    #[test]
    fn risk_ordering_puts_the_riskier_component_first() {
        let findings = vec![FindingRecord::new(
            "FND-20260728-0001",
            "bandit",
            "high",
            "sql injection",
            Utc::now(),
        )
        .unwrap()
        .with_location("src/auth/login.py", Some(1), None)];

        let coverage = vec![
            CoverageRecord::new("COV-20260728-0001", "line", "src/auth/login.py", 0.3, Utc::now()).unwrap(),
            CoverageRecord::new("COV-20260728-0002", "line", "src/other.py", 0.9, Utc::now()).unwrap(),
        ];

        let churn = vec![
            ChurnRecord::new("CHN-20260728-0001", "src/auth/login.py", "90d", 12, 80, 40, 2, None),
            ChurnRecord::new("CHN-20260728-0002", "src/other.py", "90d", 1, 5, 1, 1, None),
        ];

        let config = RiskConfig::default();
        let records = aggregate(&findings, &coverage, &churn, &config, &ids()).unwrap();

        assert_eq!(records[0].component, "src/auth/login.py");
        assert!(records[0].score > records[1].score);
    }

    #[test]
    fn churn_normalization_is_zero_when_all_equal() {
        let churn = vec![
            ChurnRecord::new("CHN-20260728-0001", "a.py", "90d", 5, 10, 10, 1, None),
            ChurnRecord::new("CHN-20260728-0002", "b.py", "90d", 5, 10, 10, 1, None),
        ];
        let raw = churn_raw_by_component(&churn);
        assert!(raw.values().all(|v| *v == 0.0));
    }

    #[test]
    fn churn_normalization_spans_zero_to_one_when_values_differ() {
        let churn = vec![
            ChurnRecord::new("CHN-20260728-0001", "a.py", "90d", 1, 1, 1, 1, None),
            ChurnRecord::new("CHN-20260728-0002", "b.py", "90d", 100, 100, 100, 1, None),
        ];
        let raw = churn_raw_by_component(&churn);
        assert_eq!(raw["a.py"], 0.0);
        assert_eq!(raw["b.py"], 1.0);
    }

    #[test]
    fn band_and_severity_match_score_thresholds() {
        let config = RiskConfig::default();
        assert_eq!(config.band_for(85.0), "P0");
        assert_eq!(severity_from_score(85.0), "critical");
        assert_eq!(config.band_for(65.0), "P1");
        assert_eq!(config.band_for(49.9), "P3");
    }
}
