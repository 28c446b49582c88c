//! Run manager: allocates, loads, and persists a run directory.

use crate::model::{Counts, Manifest, RecordType, Target, ToolStatus};
use chrono::Utc;
use qaagent_common::error::{Error, Result};
use qaagent_common::time::{iso8601, run_id_timestamp};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A handle to one run directory. Cheap to clone the `Arc` a caller wraps
/// this in; the manifest itself is guarded by a mutex so collectors running
/// concurrently within one process serialize their "append + count +
/// persist" sequence.
pub struct RunHandle {
    run_dir: PathBuf,
    manifest: Mutex<Manifest>,
}

impl RunHandle {
    /// Allocate a fresh run directory under `runs_root`, with a numeric
    /// suffix on timestamp collision.
    pub fn create(runs_root: &Path, target_name: &str, target_path: &str) -> Result<Self> {
        let now = Utc::now();
        let base_id = run_id_timestamp(now);
        let (run_id, run_dir) = allocate_directory(runs_root, &base_id)?;

        std::fs::create_dir_all(run_dir.join("evidence"))?;
        std::fs::create_dir_all(run_dir.join("artifacts"))?;

        let target = Target::new(target_name, target_path);
        let manifest = Manifest::new(run_id, now, target);

        let handle = Self {
            run_dir,
            manifest: Mutex::new(manifest),
        };
        handle.persist()?;
        Ok(handle)
    }

    /// Load an existing run by id (relative to `runs_root`) or by absolute
    /// path.
    pub fn load(runs_root: &Path, run_id: &str) -> Result<Self> {
        let run_dir = if Path::new(run_id).is_absolute() {
            PathBuf::from(run_id)
        } else {
            runs_root.join(run_id)
        };
        let manifest_path = run_dir.join("manifest.json");
        if !manifest_path.exists() {
            return Err(Error::not_found(format!("run not found: {run_id}")));
        }
        let raw = std::fs::read_to_string(&manifest_path)?;
        let manifest: Manifest = serde_json::from_str(&raw)
            .map_err(|e| Error::parse(format!("malformed manifest {manifest_path:?}: {e}")))?;
        Ok(Self {
            run_dir,
            manifest: Mutex::new(manifest),
        })
    }

    /// Find the most recently created run under `runs_root`.
    pub fn load_latest(runs_root: &Path) -> Result<Self> {
        let id = latest_run_id(runs_root)?;
        Self::load(runs_root, &id)
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    pub fn run_id(&self) -> String {
        self.manifest.lock().unwrap().run_id.clone()
    }

    /// A snapshot of the current manifest.
    pub fn manifest(&self) -> Manifest {
        self.manifest.lock().unwrap().clone()
    }

    /// Idempotently register an evidence file's relative path under its
    /// category.
    pub fn register_file(&self, record_type: RecordType, relpath: &str) -> Result<()> {
        if !qaagent_common::path::is_safe_relative(Path::new(relpath)) {
            return Err(Error::validation(format!(
                "evidence_files path must be relative and inside the run directory: {relpath}"
            )));
        }
        let mut manifest = self.manifest.lock().unwrap();
        manifest
            .evidence_files
            .entry(record_type.category().to_string())
            .or_insert_with(|| relpath.to_string());
        Ok(())
    }

    /// Bump the count bucket for `record_type` by `n`.
    pub fn increment_count(&self, record_type: RecordType, n: u64) {
        let mut manifest = self.manifest.lock().unwrap();
        *record_type.count_mut(&mut manifest.counts) += n;
    }

    pub fn set_tool(&self, name: &str, status: ToolStatus) {
        let mut manifest = self.manifest.lock().unwrap();
        manifest.tools.insert(name.to_string(), status);
    }

    /// Rewrite `manifest.json` atomically (write-to-temp + rename). Callers
    /// must have already flushed the evidence bytes this manifest update
    /// describes, so an observer never sees counts that outrun the file on
    /// disk.
    pub fn persist(&self) -> Result<()> {
        let manifest = self.manifest.lock().unwrap();
        let body = serde_json::to_string_pretty(&*manifest)?;
        let tmp_path = self.run_dir.join("manifest.json.tmp");
        {
            let mut tmp = std::fs::File::create(&tmp_path)?;
            tmp.write_all(body.as_bytes())?;
            tmp.sync_all()?;
        }
        std::fs::rename(&tmp_path, self.run_dir.join("manifest.json"))?;
        Ok(())
    }
}

fn allocate_directory(runs_root: &Path, base_id: &str) -> Result<(String, PathBuf)> {
    std::fs::create_dir_all(runs_root)?;
    let candidate = runs_root.join(base_id);
    if !candidate.exists() {
        return Ok((base_id.to_string(), candidate));
    }
    for n in 1..1000u32 {
        let id = format!("{base_id}_{n:02}");
        let candidate = runs_root.join(&id);
        if !candidate.exists() {
            return Ok((id, candidate));
        }
    }
    Err(Error::io(format!(
        "could not allocate a unique run directory for {base_id}"
    )))
}

/// List every run's manifest under `runs_root`, newest-first by
/// `created_at`. Shared by the CLI's `analyze list-runs` and the API's
/// `GET /api/runs` so the two surfaces can never drift apart.
pub fn list_runs(runs_root: &Path) -> Result<Vec<Manifest>> {
    let entries = match std::fs::read_dir(runs_root) {
        Ok(e) => e,
        Err(_) => return Ok(Vec::new()),
    };
    let mut manifests = Vec::new();
    for entry in entries.flatten() {
        let manifest_path = entry.path().join("manifest.json");
        let Ok(raw) = std::fs::read_to_string(&manifest_path) else {
            continue;
        };
        match serde_json::from_str::<Manifest>(&raw) {
            Ok(manifest) => manifests.push(manifest),
            Err(e) => {
                tracing::warn!(path = %manifest_path.display(), error = %e, "skipping malformed manifest");
            }
        }
    }
    manifests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(manifests)
}

fn latest_run_id(runs_root: &Path) -> Result<String> {
    let mut best: Option<(String, std::time::SystemTime)> = None;
    let entries = std::fs::read_dir(runs_root)
        .map_err(|_| Error::not_found("no runs found: runs-root does not exist"))?;
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.join("manifest.json").exists() {
            continue;
        }
        let modified = entry
            .metadata()
            .and_then(|m| m.modified())
            .unwrap_or(std::time::SystemTime::UNIX_EPOCH);
        let id = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        match &best {
            Some((_, best_time)) if *best_time >= modified => {}
            _ => best = Some((id, modified)),
        }
    }
    best.map(|(id, _)| id)
        .ok_or_else(|| Error::not_found("no runs found under runs-root"))
}

/// Format timestamp helper re-exported for callers that need `created_at`
/// without going through a `RunHandle`.
pub fn now_iso8601() -> String {
    iso8601(Utc::now())
}
