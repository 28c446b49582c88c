//! Run and evidence read endpoints (spec.md §4.10).

use std::collections::BTreeMap;
use std::path::Path;

use axum::extract::{Path as AxumPath, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use qaagent_common::error::Error as CoreError;
use qaagent_evidence::model::{
    ChurnRecord, CoverageRecord, FindingRecord, Manifest, RecommendationRecord, RiskRecord,
    OVERALL_COMPONENT,
};
use qaagent_evidence::reader::load_jsonl;

use crate::error::ApiError;
use crate::state::ApiState;

#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub target: qaagent_evidence::model::Target,
    pub counts: qaagent_evidence::model::Counts,
}

impl From<Manifest> for RunSummary {
    fn from(m: Manifest) -> Self {
        Self {
            run_id: m.run_id,
            created_at: m.created_at,
            target: m.target,
            counts: m.counts,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    limit: Option<u32>,
    offset: Option<u32>,
}

const DEFAULT_LIMIT: u32 = 50;
const MAX_LIMIT: u32 = 200;

fn clamp_limit(limit: Option<u32>) -> u32 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

#[derive(Debug, Serialize)]
pub struct RunsResponse {
    runs: Vec<RunSummary>,
    total: usize,
    limit: u32,
    offset: u32,
}

/// `GET /api/runs?limit=&offset=`
pub async fn list_runs(
    State(state): State<ApiState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<RunsResponse>, ApiError> {
    let limit = clamp_limit(query.limit);
    let offset = query.offset.unwrap_or(0);

    let all = qaagent_evidence::run::list_runs(&state.runs_root())?;
    let total = all.len();
    let page = all
        .into_iter()
        .skip(offset as usize)
        .take((limit as usize).saturating_sub(offset as usize))
        .map(RunSummary::from)
        .collect();

    Ok(Json(RunsResponse {
        runs: page,
        total,
        limit,
        offset,
    }))
}

fn run_dir(state: &ApiState, run_id: &str) -> Result<std::path::PathBuf, ApiError> {
    if Path::new(run_id).is_absolute() || run_id.contains("..") {
        return Err(CoreError::validation(format!("invalid run id: {run_id}")).into());
    }
    let dir = state.runs_root().join(run_id);
    if !dir.join("manifest.json").exists() {
        return Err(CoreError::not_found(format!("run not found: {run_id}")).into());
    }
    Ok(dir)
}

/// `GET /api/runs/{run_id}`
pub async fn get_run(
    State(state): State<ApiState>,
    AxumPath(run_id): AxumPath<String>,
) -> Result<Json<Manifest>, ApiError> {
    let dir = run_dir(&state, &run_id)?;
    let raw = std::fs::read_to_string(dir.join("manifest.json")).map_err(CoreError::from)?;
    let manifest: Manifest =
        serde_json::from_str(&raw).map_err(|e| CoreError::parse(format!("malformed manifest: {e}")))?;
    Ok(Json(manifest))
}

#[derive(Serialize)]
pub struct FindingsResponse {
    findings: Vec<FindingRecord>,
}

/// `GET /api/runs/{run_id}/findings`
pub async fn get_findings(
    State(state): State<ApiState>,
    AxumPath(run_id): AxumPath<String>,
) -> Result<Json<FindingsResponse>, ApiError> {
    let dir = run_dir(&state, &run_id)?;
    let findings = load_jsonl(&dir.join("evidence/quality.jsonl"));
    Ok(Json(FindingsResponse { findings }))
}

#[derive(Serialize)]
pub struct CoverageResponse {
    coverage: Vec<CoverageRecord>,
}

/// `GET /api/runs/{run_id}/coverage`
pub async fn get_coverage(
    State(state): State<ApiState>,
    AxumPath(run_id): AxumPath<String>,
) -> Result<Json<CoverageResponse>, ApiError> {
    let dir = run_dir(&state, &run_id)?;
    let coverage = load_jsonl(&dir.join("evidence/coverage.jsonl"));
    Ok(Json(CoverageResponse { coverage }))
}

#[derive(Serialize)]
pub struct ChurnResponse {
    churn: Vec<ChurnRecord>,
}

/// `GET /api/runs/{run_id}/churn`
pub async fn get_churn(
    State(state): State<ApiState>,
    AxumPath(run_id): AxumPath<String>,
) -> Result<Json<ChurnResponse>, ApiError> {
    let dir = run_dir(&state, &run_id)?;
    let churn = load_jsonl(&dir.join("evidence/churn.jsonl"));
    Ok(Json(ChurnResponse { churn }))
}

#[derive(Serialize)]
pub struct RisksResponse {
    risks: Vec<RiskRecord>,
}

/// `GET /api/runs/{run_id}/risks`
pub async fn get_risks(
    State(state): State<ApiState>,
    AxumPath(run_id): AxumPath<String>,
) -> Result<Json<RisksResponse>, ApiError> {
    let dir = run_dir(&state, &run_id)?;
    let risks = load_jsonl(&dir.join("evidence/risks.jsonl"));
    Ok(Json(RisksResponse { risks }))
}

#[derive(Serialize)]
pub struct RecommendationsResponse {
    recommendations: Vec<RecommendationRecord>,
}

/// `GET /api/runs/{run_id}/recommendations`
pub async fn get_recommendations(
    State(state): State<ApiState>,
    AxumPath(run_id): AxumPath<String>,
) -> Result<Json<RecommendationsResponse>, ApiError> {
    let dir = run_dir(&state, &run_id)?;
    let recommendations = load_jsonl(&dir.join("evidence/recommendations.jsonl"));
    Ok(Json(RecommendationsResponse { recommendations }))
}

#[derive(Debug, Deserialize)]
pub struct TrendsQuery {
    limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct RiskCounts {
    #[serde(rename = "P0")]
    p0: usize,
    #[serde(rename = "P1")]
    p1: usize,
    #[serde(rename = "P2")]
    p2: usize,
    #[serde(rename = "P3")]
    p3: usize,
}

#[derive(Debug, Serialize)]
pub struct RunTrend {
    run_id: String,
    created_at: chrono::DateTime<chrono::Utc>,
    average_coverage: f64,
    overall_coverage: Option<f64>,
    high_risk_count: usize,
    risk_counts: RiskCounts,
    total_risks: usize,
    average_risk_score: f64,
}

#[derive(Serialize)]
pub struct TrendsResponse {
    trends: Vec<RunTrend>,
}

const HIGH_RISK_THRESHOLD: f64 = 65.0;
const TRENDS_HARD_CAP: u32 = 200;

/// `GET /api/runs/trends?limit=`
pub async fn get_trends(
    State(state): State<ApiState>,
    Query(query): Query<TrendsQuery>,
) -> Result<Json<TrendsResponse>, ApiError> {
    let limit = query.limit.unwrap_or(TRENDS_HARD_CAP).clamp(1, TRENDS_HARD_CAP);
    let runs_root = state.runs_root();
    let manifests = qaagent_evidence::run::list_runs(&runs_root)?;

    let trends = manifests
        .into_iter()
        .take(limit as usize)
        .map(|manifest| {
            let dir = runs_root.join(&manifest.run_id);
            let coverage: Vec<CoverageRecord> = load_jsonl(&dir.join("evidence/coverage.jsonl"));
            let risks: Vec<RiskRecord> = load_jsonl(&dir.join("evidence/risks.jsonl"));

            let component_values: Vec<f64> = coverage
                .iter()
                .filter(|c| c.component != OVERALL_COMPONENT)
                .map(|c| c.value)
                .collect();
            let average_coverage = if component_values.is_empty() {
                0.0
            } else {
                component_values.iter().sum::<f64>() / component_values.len() as f64
            };
            let overall_coverage = coverage
                .iter()
                .find(|c| c.component == OVERALL_COMPONENT)
                .map(|c| c.value);

            let high_risk_count = risks.iter().filter(|r| r.score >= HIGH_RISK_THRESHOLD).count();
            let mut band_counts: BTreeMap<&str, usize> = BTreeMap::new();
            for r in &risks {
                *band_counts.entry(r.band.as_str()).or_insert(0) += 1;
            }
            let average_risk_score = if risks.is_empty() {
                0.0
            } else {
                risks.iter().map(|r| r.score).sum::<f64>() / risks.len() as f64
            };

            RunTrend {
                run_id: manifest.run_id,
                created_at: manifest.created_at,
                average_coverage,
                overall_coverage,
                high_risk_count,
                risk_counts: RiskCounts {
                    p0: *band_counts.get("P0").unwrap_or(&0),
                    p1: *band_counts.get("P1").unwrap_or(&0),
                    p2: *band_counts.get("P2").unwrap_or(&0),
                    p3: *band_counts.get("P3").unwrap_or(&0),
                },
                total_risks: risks.len(),
                average_risk_score,
            }
        })
        .collect();

    Ok(Json(TrendsResponse { trends }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_limit_respects_bounds() {
        assert_eq!(clamp_limit(None), DEFAULT_LIMIT);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(10_000)), MAX_LIMIT);
        assert_eq!(clamp_limit(Some(2)), 2);
    }
}
