//! `analyze collectors`: create a run and execute the default collector set
//! against a target, or (with `--dry-run`) just report tool availability.

use crate::cli::args::CollectorsArgs;
use qaagent_collectors::{default_collectors, orchestrator, CollectorContext};
use qaagent_common::error::Result;
use qaagent_evidence::{runs_root, IdGenerator, RunHandle, SharedIdGenerator};
use std::time::Duration;

fn target_name(target: &std::path::Path) -> String {
    target
        .canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .or_else(|| target.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "target".to_string())
}

/// Probe every default collector's tool availability against `target`
/// without persisting a run: collectors stop right after their presence
/// check, so the scratch run directory never accumulates evidence and is
/// discarded once the table is printed.
async fn dry_run(target: &std::path::Path, timeout: Duration) -> Result<()> {
    let scratch = tempfile::tempdir()?;
    let run = RunHandle::create(scratch.path(), &target_name(target), &target.display().to_string())?;
    let ids = SharedIdGenerator::new(IdGenerator::from_run_id(&run.run_id())?);

    println!("{:<16} {:<10} {}", "tool", "status", "version");
    for collector in default_collectors() {
        let ctx = CollectorContext::new(target.to_path_buf(), &run, ids.clone())
            .with_timeout(timeout)
            .with_probe_only(true);
        let result = collector.run(&ctx).await;
        let availability = if result.executed { "available" } else { "missing" };
        println!(
            "{:<16} {:<10} {}",
            collector.tool_name(),
            availability,
            result.version.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

pub async fn run(args: CollectorsArgs) -> Result<i32> {
    let timeout = Duration::from_secs(args.timeout_secs);

    if args.dry_run {
        dry_run(&args.target, timeout).await?;
        return Ok(crate::exit_codes::EXIT_SUCCESS);
    }

    let runs_root = runs_root::resolve(args.runs_dir.as_deref());
    let run = RunHandle::create(&runs_root, &target_name(&args.target), &args.target.display().to_string())?;
    let ids = SharedIdGenerator::new(IdGenerator::from_run_id(&run.run_id())?);
    let logs_root = runs_root::default_logs_root(&runs_root);

    let results = orchestrator::run_all(&run, args.target.clone(), ids, timeout, &logs_root, default_collectors()).await;

    let total_findings: usize = results.iter().map(|r| r.findings).sum();
    println!(
        "run {} complete: {} collectors, {} findings",
        run.run_id(),
        results.len(),
        total_findings
    );
    Ok(crate::exit_codes::EXIT_SUCCESS)
}
