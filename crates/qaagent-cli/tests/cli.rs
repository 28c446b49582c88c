//! End-to-end CLI tests against the compiled binary, driving a `tempfile`
//! runs-root so runs never touch the real `$HOME/.qaagent/runs`.

use assert_cmd::Command;
use predicates::prelude::*;
use qaagent_evidence::model::{FindingRecord, RecordType};
use qaagent_evidence::{RunHandle, Writer};

fn qaagent() -> Command {
    Command::cargo_bin("qaagent").unwrap()
}

#[test]
fn dry_run_reports_availability_without_creating_a_run() {
    let target = tempfile::tempdir().unwrap();
    let runs_dir = tempfile::tempdir().unwrap();

    qaagent()
        .args(["analyze", "collectors", "--dry-run", "--runs-dir"])
        .arg(runs_dir.path())
        .arg(target.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("style_lint"));

    assert_eq!(std::fs::read_dir(runs_dir.path()).unwrap().count(), 0);
}

#[test]
fn list_runs_on_empty_root_reports_zero() {
    let runs_dir = tempfile::tempdir().unwrap();

    qaagent()
        .args(["analyze", "list-runs", "--runs-dir"])
        .arg(runs_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("0 run(s) total"));
}

#[test]
fn risks_without_any_run_is_a_usage_error() {
    let runs_dir = tempfile::tempdir().unwrap();

    qaagent()
        .args(["analyze", "risks", "--runs-dir"])
        .arg(runs_dir.path())
        .assert()
        .failure()
        .code(2);
}

#[test]
fn risks_aggregates_a_hand_seeded_run() {
    let runs_dir = tempfile::tempdir().unwrap();
    let run = RunHandle::create(runs_dir.path(), "demo", "/tmp/demo").unwrap();
    let finding = FindingRecord::new(
        "FND-20260728-0001",
        "ruff",
        "warning",
        "unused import",
        chrono::Utc::now(),
    )
    .unwrap()
    .with_location("src/a.py", Some(1), Some(1));
    Writer::new(&run).write(RecordType::Quality, &[finding]).unwrap();
    let run_id = run.run_id();

    qaagent()
        .args(["analyze", "risks", &run_id, "--runs-dir"])
        .arg(runs_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("wrote"));

    assert!(runs_dir
        .path()
        .join(&run_id)
        .join("evidence/risks.jsonl")
        .exists());
}

#[test]
fn list_runs_newest_first_matches_creation_order() {
    let runs_dir = tempfile::tempdir().unwrap();
    let first = RunHandle::create(runs_dir.path(), "a", "/a").unwrap();
    std::thread::sleep(std::time::Duration::from_millis(10));
    let second = RunHandle::create(runs_dir.path(), "b", "/b").unwrap();

    let output = qaagent()
        .args(["analyze", "list-runs", "--runs-dir"])
        .arg(runs_dir.path())
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    let first_line_pos = stdout.find(&second.run_id()).unwrap();
    let second_line_pos = stdout.find(&first.run_id()).unwrap();
    assert!(first_line_pos < second_line_pos);
}
