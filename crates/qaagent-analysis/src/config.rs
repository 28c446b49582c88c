//! YAML config loaders for risk weights and journey definitions.
//!
//! Both documents are entirely optional: a missing file resolves to
//! defaults (risk config) or an empty config (journey config), never an
//! error.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// One priority band: `name` is assigned when `score >= min_score` and no
/// higher-`min_score` band also matches.
#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    pub name: String,
    pub min_score: f64,
}

/// Resolved risk-scoring configuration: factor weights, the score cap, and
/// the ordered band thresholds.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskConfig {
    pub weights: BTreeMap<String, f64>,
    pub max_total: f64,
    pub bands: Vec<Band>,
}

impl Default for RiskConfig {
    fn default() -> Self {
        let weights = [
            ("security", 3.0),
            ("coverage", 2.0),
            ("churn", 2.0),
            ("complexity", 1.5),
            ("api_exposure", 1.0),
            ("a11y", 0.5),
            ("performance", 1.0),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        Self {
            weights,
            max_total: 100.0,
            bands: default_bands(),
        }
    }
}

fn default_bands() -> Vec<Band> {
    vec![
        Band { name: "P0".to_string(), min_score: 80.0 },
        Band { name: "P1".to_string(), min_score: 65.0 },
        Band { name: "P2".to_string(), min_score: 50.0 },
        Band { name: "P3".to_string(), min_score: 0.0 },
    ]
}

impl RiskConfig {
    /// The band assigned to `score`: bands are searched from the highest
    /// `min_score` down, and the lowest-threshold band is the fallback.
    pub fn band_for(&self, score: f64) -> &str {
        let mut sorted: Vec<&Band> = self.bands.iter().collect();
        sorted.sort_by(|a, b| b.min_score.partial_cmp(&a.min_score).unwrap());
        sorted
            .iter()
            .find(|b| score >= b.min_score)
            .or_else(|| sorted.last().copied())
            .map(|b| b.name.as_str())
            .unwrap_or("P3")
    }

    pub fn load(path: &Path) -> qaagent_common::error::Result<Self> {
        let Ok(raw) = std::fs::read_to_string(path) else {
            tracing::debug!(path = %path.display(), "risk config not found, using defaults");
            return Ok(Self::default());
        };
        let doc: RiskConfigDoc = serde_yaml::from_str(&raw).map_err(|e| {
            qaagent_common::error::Error::parse(format!("malformed risk config {path:?}: {e}"))
        })?;

        let defaults = Self::default();
        let mut weights = defaults.weights.clone();
        if let Some(configured) = doc.scoring.as_ref().and_then(|s| s.weights.clone()) {
            // Unknown weight names are silently dropped; only known factor
            // names influence scoring.
            for (name, value) in configured {
                if weights.contains_key(&name) {
                    weights.insert(name, value);
                }
            }
        }

        let max_total = doc
            .scoring
            .as_ref()
            .and_then(|s| s.caps.as_ref())
            .and_then(|c| c.max_total)
            .unwrap_or(defaults.max_total);

        let bands = doc
            .prioritization
            .as_ref()
            .and_then(|p| p.bands.clone())
            .filter(|b| !b.is_empty())
            .map(|b| {
                b.into_iter()
                    .map(|entry| Band {
                        name: entry.name,
                        min_score: entry.min_score,
                    })
                    .collect()
            })
            .unwrap_or_else(default_bands);

        Ok(Self { weights, max_total, bands })
    }
}

#[derive(Debug, Deserialize)]
struct RiskConfigDoc {
    scoring: Option<ScoringDoc>,
    prioritization: Option<PrioritizationDoc>,
}

#[derive(Debug, Deserialize)]
struct ScoringDoc {
    weights: Option<BTreeMap<String, f64>>,
    caps: Option<CapsDoc>,
}

#[derive(Debug, Deserialize)]
struct CapsDoc {
    max_total: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct PrioritizationDoc {
    bands: Option<Vec<BandDoc>>,
}

#[derive(Debug, Deserialize)]
struct BandDoc {
    name: String,
    min_score: f64,
}

/// One business-level journey: a set of component globs, APIs, acceptance
/// notes, and an implicit coverage target resolved via `coverage_targets`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Journey {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub components: Vec<String>,
    #[serde(default)]
    pub apis: Vec<String>,
    #[serde(default)]
    pub acceptance: Vec<String>,
}

/// Resolved journey configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JourneyConfig {
    pub product: String,
    pub journeys: Vec<Journey>,
    pub coverage_targets: BTreeMap<String, f64>,
}

impl JourneyConfig {
    pub fn load(path: &Path) -> qaagent_common::error::Result<Self> {
        let Ok(raw) = std::fs::read_to_string(path) else {
            tracing::debug!(path = %path.display(), "journey config not found, using empty config");
            return Ok(Self::default());
        };
        let doc: JourneyConfigDoc = serde_yaml::from_str(&raw).map_err(|e| {
            qaagent_common::error::Error::parse(format!("malformed journey config {path:?}: {e}"))
        })?;
        Ok(Self {
            product: doc.product.unwrap_or_default(),
            journeys: doc.journeys.unwrap_or_default(),
            coverage_targets: doc
                .coverage_targets
                .unwrap_or_default()
                .into_iter()
                .map(|(k, v)| (k, v as f64))
                .collect(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct JourneyConfigDoc {
    product: Option<String>,
    journeys: Option<Vec<Journey>>,
    coverage_targets: Option<BTreeMap<String, f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_used_when_file_missing() {
        let config = RiskConfig::load(Path::new("/nonexistent/risk.yaml")).unwrap();
        assert_eq!(config, RiskConfig::default());
    }

    #[test]
    fn band_for_picks_highest_matching_threshold() {
        let config = RiskConfig::default();
        assert_eq!(config.band_for(85.0), "P0");
        assert_eq!(config.band_for(65.0), "P1");
        assert_eq!(config.band_for(49.9), "P3");
    }

    #[test]
    fn unknown_weight_names_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("risk.yaml");
        std::fs::write(
            &path,
            "scoring:\n  weights:\n    security: 5.0\n    mystery_factor: 9.0\n",
        )
        .unwrap();
        let config = RiskConfig::load(&path).unwrap();
        assert_eq!(config.weights["security"], 5.0);
        assert!(!config.weights.contains_key("mystery_factor"));
    }

    #[test]
    fn empty_config_when_journey_file_missing() {
        let config = JourneyConfig::load(Path::new("/nonexistent/journeys.yaml")).unwrap();
        assert!(config.journeys.is_empty());
    }
}
