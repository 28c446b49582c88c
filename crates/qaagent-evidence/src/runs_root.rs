//! Resolution of the runs-root directory.
//!
//! Centralized here (rather than scattered across the CLI and API crates)
//! so a test harness can redirect storage by setting the env var without
//! restarting anything, per the run manager's design note.

use std::path::PathBuf;

/// Env var overriding the runs-root default.
pub const ENV_RUNS_DIR: &str = "QAAGENT_RUNS_DIR";

/// Resolve the runs-root directory.
///
/// Priority: explicit argument → `QAAGENT_RUNS_DIR` → platform default
/// (`$HOME/.qaagent/runs`).
pub fn resolve(explicit: Option<&str>) -> PathBuf {
    if let Some(path) = explicit {
        return PathBuf::from(path);
    }
    if let Ok(path) = std::env::var(ENV_RUNS_DIR) {
        return PathBuf::from(path);
    }
    default_runs_root()
}

fn default_runs_root() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".qaagent").join("runs")
}

/// The directory the orchestrator's JSONL event log lives under, by
/// default a sibling of the runs-root (`<runs_root>/../logs`).
pub fn default_logs_root(runs_root: &std::path::Path) -> PathBuf {
    runs_root
        .parent()
        .map(|p| p.join("logs"))
        .unwrap_or_else(|| runs_root.join("logs"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_argument_wins_over_everything() {
        std::env::set_var(ENV_RUNS_DIR, "/tmp/should-not-be-used");
        let resolved = resolve(Some("/tmp/explicit"));
        std::env::remove_var(ENV_RUNS_DIR);
        assert_eq!(resolved, PathBuf::from("/tmp/explicit"));
    }

    #[test]
    fn env_var_is_used_when_no_explicit_argument() {
        std::env::set_var(ENV_RUNS_DIR, "/tmp/from-env");
        let resolved = resolve(None);
        std::env::remove_var(ENV_RUNS_DIR);
        assert_eq!(resolved, PathBuf::from("/tmp/from-env"));
    }
}
