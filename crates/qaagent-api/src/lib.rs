//! Read-only HTTP API over persisted qaagent runs and evidence.
//!
//! The server never mutates a run directory except through the one
//! deliberate escape hatch spec.md §4.10 allows — `POST
//! /api/repositories/{id}/analyze`, which drives the same orchestrator the
//! CLI's `analyze collectors` subcommand uses. Every other endpoint is a
//! pure translation from persisted JSON/JSONL to a response body; no
//! in-memory mutable state is shared across requests except the optional
//! repository registry, which is explicitly scoped to that one surface.

pub mod error;
pub mod routes;
pub mod state;

use std::path::PathBuf;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::ApiState;

/// Env var holding a comma-separated allowlist of CORS origins. Unset means
/// wide-open CORS, acceptable for local development per spec.md §5; a
/// production deployment must set this.
pub const ENV_CORS_ORIGINS: &str = "QAAGENT_CORS_ORIGINS";

fn cors_layer() -> CorsLayer {
    match std::env::var(ENV_CORS_ORIGINS) {
        Ok(raw) if !raw.trim().is_empty() => {
            let origins: Vec<axum::http::HeaderValue> = raw
                .split(',')
                .filter_map(|o| o.trim().parse().ok())
                .collect();
            CorsLayer::new().allow_origin(origins).allow_methods(Any).allow_headers(Any)
        }
        _ => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    }
}

/// Build the full router over `state`. Exposed separately from [`serve`] so
/// integration tests can mount it on an in-process listener.
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health))
        .route("/api/runs", get(routes::runs::list_runs))
        .route("/api/runs/trends", get(routes::runs::get_trends))
        .route("/api/runs/{run_id}", get(routes::runs::get_run))
        .route("/api/runs/{run_id}/findings", get(routes::runs::get_findings))
        .route("/api/runs/{run_id}/coverage", get(routes::runs::get_coverage))
        .route("/api/runs/{run_id}/churn", get(routes::runs::get_churn))
        .route("/api/runs/{run_id}/risks", get(routes::runs::get_risks))
        .route(
            "/api/runs/{run_id}/recommendations",
            get(routes::runs::get_recommendations),
        )
        .route(
            "/api/repositories",
            get(routes::repositories::list).post(routes::repositories::create),
        )
        .route(
            "/api/repositories/{id}",
            get(routes::repositories::get).delete(routes::repositories::delete),
        )
        .route("/api/repositories/{id}/analyze", post(routes::repositories::analyze))
        .route("/api/repositories/{id}/status", get(routes::repositories::status))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve the API until the process is interrupted.
pub async fn serve(host: &str, port: u16, runs_root: Option<PathBuf>) -> anyhow::Result<()> {
    let state = ApiState::new(runs_root);
    let app = build_router(state);

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "qaagent API listening");
    axum::serve(listener, app).await?;
    Ok(())
}
