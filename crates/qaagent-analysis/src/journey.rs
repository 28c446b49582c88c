//! Coverage-to-journey mapping: for each configured journey, average the
//! coverage of every component matching one of its glob patterns.
//!
//! Glob semantics: patterns are built with [`globset::GlobBuilder`] and
//! `literal_separator(true)`, so `*` does not cross `/` (use `**` for that)
//! — the "canonical" interpretation the specification leaves as an
//! implementation choice. This is documented so journey authors can rely
//! on it.

use crate::config::{Journey, JourneyConfig};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use qaagent_evidence::model::CoverageRecord;

/// One journey's resolved coverage snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct JourneyCoverage {
    pub journey: String,
    pub coverage: f64,
    pub target: f64,
    pub components: Vec<String>,
}

fn build_matcher(patterns: &[String]) -> qaagent_common::error::Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| qaagent_common::error::Error::validation(format!("invalid journey glob {pattern:?}: {e}")))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| qaagent_common::error::Error::validation(format!("failed to build glob set: {e}")))
}

fn map_one(journey: &Journey, coverage: &[CoverageRecord], target: f64) -> qaagent_common::error::Result<JourneyCoverage> {
    let matcher = build_matcher(&journey.components)?;
    let matched: Vec<&CoverageRecord> = coverage
        .iter()
        .filter(|c| matcher.is_match(&c.component))
        .collect();

    let avg = if matched.is_empty() {
        0.0
    } else {
        matched.iter().map(|c| c.value).sum::<f64>() / matched.len() as f64
    };

    Ok(JourneyCoverage {
        journey: journey.id.clone(),
        coverage: avg,
        target,
        components: matched.iter().map(|c| c.component.clone()).collect(),
    })
}

/// Maps every journey in `config` against `coverage`, in configured order.
pub fn map_journeys(
    config: &JourneyConfig,
    coverage: &[CoverageRecord],
) -> qaagent_common::error::Result<Vec<JourneyCoverage>> {
    config
        .journeys
        .iter()
        .map(|journey| {
            let target = config.coverage_targets.get(&journey.id).copied().unwrap_or(0.0) / 100.0;
            map_one(journey, coverage, target)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn coverage(component: &str, value: f64) -> CoverageRecord {
        CoverageRecord::new(format!("COV-{component}"), "line", component, value, Utc::now()).unwrap()
    }

    #[test]
    fn journey_matching_averages_only_matched_components() {
        let journey = Journey {
            id: "auth_login".to_string(),
            name: "Auth Login".to_string(),
            components: vec!["src/auth/*".to_string()],
            apis: Vec::new(),
            acceptance: Vec::new(),
        };
        let coverage = vec![
            coverage("src/auth/login.py", 0.6),
            coverage("src/auth/session.py", 0.4),
            coverage("src/other/foo.py", 0.9),
        ];
        let result = map_one(&journey, &coverage, 0.0).unwrap();
        assert_eq!(result.components.len(), 2);
        assert!((result.coverage - 0.5).abs() < 1e-9);
    }

    #[test]
    fn star_does_not_cross_path_separators() {
        let journey = Journey {
            id: "auth".to_string(),
            name: "Auth".to_string(),
            components: vec!["src/auth/*".to_string()],
            apis: Vec::new(),
            acceptance: Vec::new(),
        };
        let coverage = vec![coverage("src/auth/nested/deep.py", 0.9)];
        let result = map_one(&journey, &coverage, 0.0).unwrap();
        assert!(result.components.is_empty());
    }

    #[test]
    fn no_matches_yields_zero_coverage() {
        let journey = Journey {
            id: "empty".to_string(),
            name: "Empty".to_string(),
            components: vec!["nope/*".to_string()],
            apis: Vec::new(),
            acceptance: Vec::new(),
        };
        let result = map_one(&journey, &[], 0.0).unwrap();
        assert_eq!(result.coverage, 0.0);
    }
}
