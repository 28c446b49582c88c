//! End-to-end smoke tests against an in-process server, covering the
//! pagination and graceful-degradation scenarios from spec.md §8.

use qaagent_api::{build_router, ApiState};
use qaagent_evidence::model::{FindingRecord, RecordType};
use qaagent_evidence::{RunHandle, Writer};
use tempfile::TempDir;

async fn spawn(runs_root: &std::path::Path) -> String {
    let state = ApiState::new(Some(runs_root.to_path_buf()));
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn health_check_reports_ok() {
    let dir = TempDir::new().unwrap();
    let base = spawn(dir.path()).await;

    let resp = reqwest::get(format!("{base}/health")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn pagination_returns_one_run_for_limit_2_offset_1() {
    let dir = TempDir::new().unwrap();
    for name in ["a", "b", "c"] {
        RunHandle::create(dir.path(), name, "/repo").unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    let base = spawn(dir.path()).await;

    let resp = reqwest::get(format!("{base}/api/runs?limit=2&offset=1")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["runs"].as_array().unwrap().len(), 1);
    assert_eq!(body["total"], 3);
    assert_eq!(body["limit"], 2);
    assert_eq!(body["offset"], 1);
}

#[tokio::test]
async fn missing_risks_file_yields_empty_array_not_an_error() {
    let dir = TempDir::new().unwrap();
    let run = RunHandle::create(dir.path(), "only-quality", "/repo").unwrap();
    let finding = FindingRecord::new(
        "FND-20260728-0001",
        "ruff",
        "warning",
        "unused import",
        chrono::Utc::now(),
    )
    .unwrap();
    Writer::new(&run).write(RecordType::Quality, &[finding]).unwrap();
    let run_id = run.run_id();

    let base = spawn(dir.path()).await;
    let resp = reqwest::get(format!("{base}/api/runs/{run_id}/risks")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["risks"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn unknown_run_id_is_404() {
    let dir = TempDir::new().unwrap();
    let base = spawn(dir.path()).await;
    let resp = reqwest::get(format!("{base}/api/runs/does-not-exist")).await.unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn repository_lifecycle_register_and_status() {
    let dir = TempDir::new().unwrap();
    let base = spawn(dir.path()).await;

    let client = reqwest::Client::new();
    let created: serde_json::Value = client
        .post(format!("{base}/api/repositories"))
        .json(&serde_json::json!({"name": "demo", "path": "/tmp/demo"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = created["id"].as_str().unwrap().to_string();

    let status: serde_json::Value = client
        .get(format!("{base}/api/repositories/{id}/status"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["status"], "registered");
    assert!(status["last_run_id"].is_null());

    let resp = client
        .delete(format!("{base}/api/repositories/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);
}
