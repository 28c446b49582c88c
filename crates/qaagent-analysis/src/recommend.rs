//! Recommendation engine: derives prioritized actions from risks and
//! coverage gaps.

use crate::journey::JourneyCoverage;
use chrono::Utc;
use qaagent_evidence::model::{RecommendationRecord, RiskRecord};
use qaagent_evidence::SharedIdGenerator;

const DEFAULT_RISK_THRESHOLD: f64 = 65.0;
const DEFAULT_COVERAGE_TOLERANCE: f64 = 0.05;

/// Tunables for recommendation generation; defaults match the platform's
/// documented knobs.
#[derive(Debug, Clone, Copy)]
pub struct RecommendationConfig {
    pub risk_threshold: f64,
    pub coverage_tolerance: f64,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            risk_threshold: DEFAULT_RISK_THRESHOLD,
            coverage_tolerance: DEFAULT_COVERAGE_TOLERANCE,
        }
    }
}

fn priority_from_score(score: f64) -> &'static str {
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

/// Builds one recommendation per risk and one per journey whose coverage
/// falls short of its target by more than `config.coverage_tolerance`.
/// `config.risk_threshold` is reserved for callers that want to pre-filter
/// risks before calling this; every risk passed in produces a
/// recommendation here.
pub fn recommend(
    risks: &[RiskRecord],
    journeys: &[JourneyCoverage],
    ids: &SharedIdGenerator,
) -> qaagent_common::error::Result<Vec<RecommendationRecord>> {
    let mut out = Vec::new();

    for risk in risks {
        let priority = priority_from_score(risk.score);
        let factors = risk
            .factors
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join(", ");
        let summary = format!("Focus on {} ({priority} risk)", risk.component);
        let details = format!("Risk score {} (band {}). Factors: {}", risk.score, risk.band, factors);

        let mut metadata = serde_json::Map::new();
        metadata.insert("score".to_string(), serde_json::json!(risk.score));
        metadata.insert("band".to_string(), serde_json::json!(risk.band));

        let id = ids.next("REC")?;
        let record = RecommendationRecord::new(id, risk.component.clone(), priority, summary, details, Utc::now())?
            .with_evidence_refs(risk.evidence_refs.clone())
            .with_metadata(metadata);
        out.push(record);
    }

    for journey in journeys {
        let config = RecommendationConfig::default();
        if journey.coverage >= journey.target - config.coverage_tolerance {
            continue;
        }
        let details = format!(
            "Journey {} coverage {:.2} is below target {:.2} (tolerance {:.2}).",
            journey.journey, journey.coverage, journey.target, config.coverage_tolerance
        );
        let mut metadata = serde_json::Map::new();
        metadata.insert("coverage".to_string(), serde_json::json!(journey.coverage));
        metadata.insert("target".to_string(), serde_json::json!(journey.target));

        let id = ids.next("REC")?;
        let record = RecommendationRecord::new(
            id,
            journey.journey.clone(),
            "high",
            format!("Increase coverage for {}", journey.journey),
            details,
            Utc::now(),
        )?
        .with_evidence_refs(journey.components.clone())
        .with_metadata(metadata);
        out.push(record);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qaagent_evidence::IdGenerator;

    fn ids() -> SharedIdGenerator {
        SharedIdGenerator::new(IdGenerator::from_run_id("20260728_100000Z").unwrap())
    }

    fn journey(coverage: f64, target: f64) -> JourneyCoverage {
        JourneyCoverage {
            journey: "checkout".to_string(),
            coverage,
            target,
            components: vec!["src/checkout/pay.py".to_string()],
        }
    }

    #[test]
    fn coverage_within_tolerance_produces_no_recommendation() {
        let recs = recommend(&[], &[journey(0.75, 0.80)], &ids()).unwrap();
        assert!(recs.is_empty());
    }

    #[test]
    fn coverage_beyond_tolerance_produces_one_high_priority_recommendation() {
        let recs = recommend(&[], &[journey(0.74, 0.80)], &ids()).unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].priority, "high");
        assert_eq!(recs[0].metadata["coverage"], serde_json::json!(0.74));
    }

    #[test]
    fn priority_mirrors_risk_severity_thresholds() {
        assert_eq!(priority_from_score(85.0), "critical");
        assert_eq!(priority_from_score(65.0), "high");
        assert_eq!(priority_from_score(50.0), "medium");
        assert_eq!(priority_from_score(10.0), "low");
    }
}
