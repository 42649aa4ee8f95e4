use super::*;
use chrono::Utc;
use std::path::PathBuf;

fn failed(repo: &str, stderr: &str) -> ExecutionResult {
    ExecutionResult {
        repo: PathBuf::from(repo),
        exit_code: Some(1),
        stdout: String::new(),
        stderr: stderr.to_string(),
        started_at: Utc::now(),
        finished_at: Utc::now(),
        cancelled: false,
    }
}

fn succeeded(repo: &str) -> ExecutionResult {
    ExecutionResult {
        repo: PathBuf::from(repo),
        exit_code: Some(0),
        stdout: String::new(),
        stderr: String::new(),
        started_at: Utc::now(),
        finished_at: Utc::now(),
        cancelled: false,
    }
}

#[test]
fn failure_includes_exit_code_and_first_stderr_line() {
    let result = failed("repoA", "Port 6333 in use\nextra detail");
    let line = format_failure(&result.repo, "start", &result, None);
    assert_eq!(line, "✗ repoA (start): exit 1 — Port 6333 in use");
}

#[test]
fn query_hint_only_applies_to_query_command() {
    assert_eq!(query_hint("query", Path::new("repoA")), Some("use grep in repoA".to_string()));
    assert_eq!(query_hint("start", Path::new("repoA")), None);
}

#[test]
fn summary_counts_and_lists_failures() {
    let results = vec![succeeded("repoA"), failed("repoB", "Port 6333 in use"), succeeded("repoC")];
    let summary = format_summary("start", &results);
    assert!(summary.starts_with("2 succeeded, 1 failed"));
    assert!(summary.contains("repoB"));
}

#[test]
fn progress_line_matches_sequential_start_example() {
    let ok = format_progress_line(1, 3, Path::new("repoA"), Some(&succeeded("repoA")));
    let bad = format_progress_line(2, 3, Path::new("repoB"), Some(&failed("repoB", "Port 6333 in use")));
    assert_eq!(ok, "[1/3] ✓ repoA");
    assert_eq!(bad, "[2/3] ✗ repoB Port 6333 in use");
}
