//! VCS churn collector.
//!
//! Requires a `.git` directory; queries commit history over a trailing
//! window via `git log --numstat` and aggregates commits, lines, and
//! contributors per path.

use crate::contract::{Collector, CollectorContext, CollectorResult};
use crate::process::invoke;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use qaagent_evidence::model::ChurnRecord;
use std::collections::HashMap;

pub struct ChurnCollector {
    pub window_days: i64,
}

impl Default for ChurnCollector {
    fn default() -> Self {
        Self { window_days: 90 }
    }
}

struct PathAggregate {
    commits: u64,
    lines_added: u64,
    lines_deleted: u64,
    contributors: std::collections::HashSet<String>,
    last_commit_at: Option<DateTime<Utc>>,
}

impl PathAggregate {
    fn new() -> Self {
        Self {
            commits: 0,
            lines_added: 0,
            lines_deleted: 0,
            contributors: std::collections::HashSet::new(),
            last_commit_at: None,
        }
    }
}

/// `git log --numstat --pretty=format:COMMIT%x1f<author>%x1f<iso date>` output:
/// a commit header line, followed by zero or more numstat lines
/// `<added>\t<deleted>\t<path>`, blank-line separated.
fn parse_log(raw: &str) -> HashMap<String, PathAggregate> {
    let mut aggregates: HashMap<String, PathAggregate> = HashMap::new();
    let mut current_author = String::new();
    let mut current_date: Option<DateTime<Utc>> = None;
    let mut seen_paths_this_commit: std::collections::HashSet<String> = std::collections::HashSet::new();

    for line in raw.lines() {
        if let Some(rest) = line.strip_prefix("COMMIT\u{1f}") {
            let mut parts = rest.splitn(2, '\u{1f}');
            current_author = parts.next().unwrap_or_default().to_string();
            current_date = parts
                .next()
                .and_then(|d| DateTime::parse_from_rfc3339(d).ok())
                .map(|d| d.with_timezone(&Utc));
            seen_paths_this_commit.clear();
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }
        let mut fields = line.splitn(3, '\t');
        let (Some(added), Some(deleted), Some(path)) = (fields.next(), fields.next(), fields.next()) else {
            continue;
        };
        // Binary files report `-` for both counts; skip them, and skip
        // directory-only entries (no path component after splitting).
        if added == "-" || deleted == "-" || path.is_empty() {
            continue;
        }
        let added: u64 = match added.parse() {
            Ok(n) => n,
            Err(_) => continue,
        };
        let deleted: u64 = match deleted.parse() {
            Ok(n) => n,
            Err(_) => continue,
        };

        let entry = aggregates.entry(path.to_string()).or_insert_with(PathAggregate::new);
        entry.lines_added += added;
        entry.lines_deleted += deleted;
        if !current_author.is_empty() {
            entry.contributors.insert(current_author.clone());
        }
        if let Some(date) = current_date {
            entry.last_commit_at = Some(entry.last_commit_at.map_or(date, |existing| existing.max(date)));
        }
        if seen_paths_this_commit.insert(path.to_string()) {
            entry.commits += 1;
        }
    }

    aggregates
}

#[async_trait]
impl Collector for ChurnCollector {
    fn tool_name(&self) -> &'static str {
        "vcs_churn"
    }

    async fn run(&self, ctx: &CollectorContext<'_>) -> CollectorResult {
        let started_at = Utc::now();
        if !ctx.target_path.join(".git").is_dir() {
            return CollectorResult::not_found(self.tool_name(), started_at, "target is not a git repository");
        }
        if ctx.probe_only {
            return CollectorResult::probed(self.tool_name(), started_at, None);
        }

        let since = format!("--since={}.days", self.window_days);
        let output = match invoke(
            "git",
            &[
                "log",
                &since,
                "--no-merges",
                "--numstat",
                "--pretty=format:COMMIT\u{1f}%an\u{1f}%aI",
            ],
            &ctx.target_path,
            ctx.timeout,
        )
        .await
        {
            Ok(o) => o,
            Err(e) => {
                return CollectorResult {
                    tool_name: self.tool_name().to_string(),
                    version: None,
                    executed: true,
                    exit_code: None,
                    findings: 0,
                    diagnostics: Vec::new(),
                    errors: vec![e.to_string()],
                    started_at,
                    finished_at: Utc::now(),
                };
            }
        };

        let mut errors = Vec::new();
        if let Some(code) = output.exit_code {
            if code != 0 {
                errors.push(format!("git log exited with status {code}"));
            }
        }

        let window = format!("{}d", self.window_days);
        let aggregates = parse_log(&output.stdout);
        let mut records = Vec::new();
        for (path, agg) in aggregates {
            let id = match ctx.ids.next("CHN") {
                Ok(id) => id,
                Err(e) => {
                    errors.push(e.to_string());
                    continue;
                }
            };
            records.push(ChurnRecord::new(
                id,
                path,
                window.clone(),
                agg.commits,
                agg.lines_added,
                agg.lines_deleted,
                agg.contributors.len() as u64,
                agg.last_commit_at,
            ));
        }

        let count = records.len();
        if let Err(e) = ctx.writer().write(qaagent_evidence::model::RecordType::Churn, &records) {
            errors.push(e.to_string());
        }

        CollectorResult {
            tool_name: self.tool_name().to_string(),
            version: None,
            executed: true,
            exit_code: output.exit_code,
            findings: count,
            diagnostics: Vec::new(),
            errors,
            started_at,
            finished_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_binary_numstat_entries() {
        let log = "COMMIT\u{1f}Jane\u{1f}2026-01-01T00:00:00Z\n-\t-\timage.png\n5\t2\tsrc/a.py\n";
        let aggregates = parse_log(log);
        assert!(!aggregates.contains_key("image.png"));
        assert!(aggregates.contains_key("src/a.py"));
    }

    #[test]
    fn aggregates_across_multiple_commits_by_same_author() {
        let log = concat!(
            "COMMIT\u{1f}Jane\u{1f}2026-01-01T00:00:00Z\n",
            "5\t2\tsrc/a.py\n",
            "\n",
            "COMMIT\u{1f}Jane\u{1f}2026-01-02T00:00:00Z\n",
            "1\t1\tsrc/a.py\n",
        );
        let aggregates = parse_log(log);
        let a = &aggregates["src/a.py"];
        assert_eq!(a.commits, 2);
        assert_eq!(a.lines_added, 6);
        assert_eq!(a.contributors.len(), 1);
    }

    #[test]
    fn counts_distinct_contributors() {
        let log = concat!(
            "COMMIT\u{1f}Jane\u{1f}2026-01-01T00:00:00Z\n",
            "5\t2\tsrc/a.py\n",
            "\n",
            "COMMIT\u{1f}Bob\u{1f}2026-01-02T00:00:00Z\n",
            "1\t1\tsrc/a.py\n",
        );
        let aggregates = parse_log(log);
        assert_eq!(aggregates["src/a.py"].contributors.len(), 2);
    }
}
