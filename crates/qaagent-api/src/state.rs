//! Shared state for the API router.
//!
//! Runs-root is resolved fresh on every request (see
//! [`ApiState::runs_root`]) rather than cached, so a test harness can
//! redirect storage via `QAAGENT_RUNS_DIR` without restarting the server.
//! The repository registry is the one piece of real mutable state: an
//! in-memory map behind a mutex, exactly as spec.md §4.10 describes for the
//! optional `/api/repositories*` surface.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A registered analysis target. Held in memory only; restarting the API
/// process forgets the registry.
#[derive(Debug, Clone, Serialize)]
pub struct Repository {
    pub id: String,
    pub name: String,
    pub path: String,
    pub created_at: DateTime<Utc>,
    pub last_run_id: Option<String>,
    pub status: String,
}

#[derive(Clone)]
pub struct ApiState {
    explicit_runs_root: Option<PathBuf>,
    repositories: Arc<Mutex<HashMap<String, Repository>>>,
}

impl ApiState {
    pub fn new(explicit_runs_root: Option<PathBuf>) -> Self {
        Self {
            explicit_runs_root,
            repositories: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Resolve the runs-root directory for this request: explicit
    /// constructor argument, then `QAAGENT_RUNS_DIR`, then the platform
    /// default. Re-evaluated every call.
    pub fn runs_root(&self) -> PathBuf {
        qaagent_evidence::runs_root::resolve(
            self.explicit_runs_root.as_ref().and_then(|p| p.to_str()),
        )
    }

    pub fn repositories(&self) -> std::sync::MutexGuard<'_, HashMap<String, Repository>> {
        self.repositories.lock().unwrap()
    }
}
