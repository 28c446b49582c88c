//! `analyze list-runs`: print persisted runs newest-first. Delegates to the
//! same run-manager listing function the API's `GET /api/runs` uses so the
//! two surfaces can never drift apart.

use crate::cli::args::ListRunsArgs;
use qaagent_common::error::Result;
use qaagent_evidence::{run, runs_root};

pub async fn run(args: ListRunsArgs) -> Result<i32> {
    let runs_root = runs_root::resolve(args.runs_dir.as_deref());
    let manifests = run::list_runs(&runs_root)?;

    for manifest in manifests.iter().take(args.limit) {
        println!(
            "{}  {}  {}  findings={} risks={}",
            manifest.run_id,
            manifest.created_at.to_rfc3339(),
            manifest.target.name,
            manifest.counts.findings,
            manifest.counts.risks,
        );
    }
    println!("{} run(s) total", manifests.len());
    Ok(crate::exit_codes::EXIT_SUCCESS)
}
