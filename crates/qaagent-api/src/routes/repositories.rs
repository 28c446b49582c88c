//! Optional in-memory repository registry (spec.md §4.10, supplement #4 in
//! SPEC_FULL.md): a convenience layer over the CLI analysis pipeline for
//! callers that want to track a handful of targets without standing up
//! their own storage. Entries live only for the lifetime of the process.

use axum::extract::{Path as AxumPath, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use qaagent_collectors::default_collectors;
use qaagent_common::error::Error as CoreError;
use qaagent_evidence::{IdGenerator, RunHandle, SharedIdGenerator};

use crate::error::ApiError;
use crate::state::{ApiState, Repository};

#[derive(Serialize)]
pub struct RepositoriesResponse {
    repositories: Vec<Repository>,
}

/// `GET /api/repositories`
pub async fn list(State(state): State<ApiState>) -> Json<RepositoriesResponse> {
    let mut repositories: Vec<Repository> = state.repositories().values().cloned().collect();
    repositories.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    Json(RepositoriesResponse { repositories })
}

#[derive(Deserialize)]
pub struct CreateRepository {
    name: String,
    path: String,
}

/// `POST /api/repositories`
pub async fn create(
    State(state): State<ApiState>,
    Json(body): Json<CreateRepository>,
) -> (StatusCode, Json<Repository>) {
    let repo = Repository {
        id: uuid::Uuid::new_v4().to_string(),
        name: body.name,
        path: body.path,
        created_at: chrono::Utc::now(),
        last_run_id: None,
        status: "registered".to_string(),
    };
    state.repositories().insert(repo.id.clone(), repo.clone());
    (StatusCode::CREATED, Json(repo))
}

fn find(state: &ApiState, id: &str) -> Result<Repository, ApiError> {
    state
        .repositories()
        .get(id)
        .cloned()
        .ok_or_else(|| CoreError::not_found(format!("repository not found: {id}")).into())
}

/// `GET /api/repositories/{id}`
pub async fn get(
    State(state): State<ApiState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<Repository>, ApiError> {
    Ok(Json(find(&state, &id)?))
}

/// `DELETE /api/repositories/{id}`
pub async fn delete(
    State(state): State<ApiState>,
    AxumPath(id): AxumPath<String>,
) -> Result<StatusCode, ApiError> {
    find(&state, &id)?;
    state.repositories().remove(&id);
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize, Default)]
pub struct AnalyzeRequest {
    #[serde(default)]
    force: bool,
}

#[derive(Serialize)]
pub struct AnalyzeResponse {
    run_id: String,
    reused: bool,
}

/// `POST /api/repositories/{id}/analyze`
///
/// Idempotent under `force`: a repeated call without `force` against a
/// repository that already ran returns the prior run id rather than
/// starting a second analysis.
pub async fn analyze(
    State(state): State<ApiState>,
    AxumPath(id): AxumPath<String>,
    Json(body): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let repo = find(&state, &id)?;

    if !body.force {
        if let Some(run_id) = repo.last_run_id.clone() {
            return Ok(Json(AnalyzeResponse { run_id, reused: true }));
        }
    }

    let runs_root = state.runs_root();
    let run = RunHandle::create(&runs_root, &repo.name, &repo.path)?;
    let ids = SharedIdGenerator::new(IdGenerator::from_run_id(&run.run_id())?);
    let logs_root = qaagent_evidence::runs_root::default_logs_root(&runs_root);

    qaagent_collectors::orchestrator::run_all(
        &run,
        repo.path.clone(),
        ids,
        std::time::Duration::from_secs(120),
        &logs_root,
        default_collectors(),
    )
    .await;

    let run_id = run.run_id();
    if let Some(entry) = state.repositories().get_mut(&id) {
        entry.last_run_id = Some(run_id.clone());
        entry.status = "analyzed".to_string();
    }

    Ok(Json(AnalyzeResponse { run_id, reused: false }))
}

#[derive(Serialize)]
pub struct StatusResponse {
    status: String,
    last_run_id: Option<String>,
}

/// `GET /api/repositories/{id}/status`
pub async fn status(
    State(state): State<ApiState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    let repo = find(&state, &id)?;
    Ok(Json(StatusResponse {
        status: repo.status,
        last_run_id: repo.last_run_id,
    }))
}
