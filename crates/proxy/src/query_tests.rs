use super::*;
use chrono::Utc;
use serde_json::json;

fn ok_result(stdout: &str) -> ExecutionResult {
    ExecutionResult {
        repo: PathBuf::from("ignored"),
        exit_code: Some(0),
        stdout: stdout.to_string(),
        stderr: String::new(),
        started_at: Utc::now(),
        finished_at: Utc::now(),
        cancelled: false,
    }
}

fn fail_result(stderr: &str) -> ExecutionResult {
    ExecutionResult {
        repo: PathBuf::from("ignored"),
        exit_code: Some(1),
        stdout: String::new(),
        stderr: stderr.to_string(),
        started_at: Utc::now(),
        finished_at: Utc::now(),
        cancelled: false,
    }
}

#[test]
fn global_limit_truncates_descending_score() {
    let repo_a = PathBuf::from("repoA");
    let repo_b = PathBuf::from("repoB");
    let repo_c = PathBuf::from("repoC");

    let make = |scores: &[f64]| -> ExecutionResult {
        let arr: Vec<_> = scores.iter().map(|s| json!({"score": s, "text": "hit"})).collect();
        ok_result(&serde_json::to_string(&arr).unwrap())
    };

    let a = parse_result(&repo_a, &make(&[9.0, 5.0, 1.0]));
    let b = parse_result(&repo_b, &make(&[8.0, 4.0]));
    let c = parse_result(&repo_c, &make(&[7.0, 6.0]));

    let outcome = merge(vec![a, b, c], Some(4));

    assert_eq!(outcome.hits.len(), 4);
    let scores: Vec<f64> = outcome.hits.iter().map(|h| h.score).collect();
    assert_eq!(scores, vec![9.0, 8.0, 7.0, 6.0]);
    assert_eq!(outcome.hits[0].source_repo, repo_a);
    assert!(outcome.errors.is_empty());
}

#[test]
fn limit_zero_or_absent_does_not_truncate() {
    let repo = PathBuf::from("repoA");
    let result = ok_result(&serde_json::to_string(&vec![json!({"score": 1.0}), json!({"score": 2.0})]).unwrap());
    let hits = parse_result(&repo, &result);

    let unlimited = merge(vec![hits.clone()], None);
    assert_eq!(unlimited.hits.len(), 2);

    let zero = merge(vec![hits], Some(0));
    assert_eq!(zero.hits.len(), 2);
}

#[test]
fn per_repo_failure_does_not_fail_the_query() {
    let repo_a = PathBuf::from("repoA");
    let repo_b = PathBuf::from("repoB");

    let a = parse_result(&repo_a, &ok_result(&serde_json::to_string(&vec![json!({"score": 1.0})]).unwrap()));
    let b = parse_result(&repo_b, &fail_result("index not found"));

    let outcome = merge(vec![a, b], None);

    assert_eq!(outcome.hits.len(), 1);
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].repo, repo_b);
    assert!(outcome.errors[0].hint.contains("grep"));
}

#[test]
fn stable_tie_break_on_score_then_repo_then_ordinal() {
    let repo_a = PathBuf::from("repoA");
    let repo_b = PathBuf::from("repoB");

    let a = parse_result(&repo_a, &ok_result(&serde_json::to_string(&vec![json!({"score": 5.0}), json!({"score": 5.0})]).unwrap()));
    let b = parse_result(&repo_b, &ok_result(&serde_json::to_string(&vec![json!({"score": 5.0})]).unwrap()));

    let outcome = merge(vec![a, b], None);

    assert_eq!(outcome.hits[0].source_repo, repo_a);
    assert_eq!(outcome.hits[0].ordinal, 0);
    assert_eq!(outcome.hits[1].source_repo, repo_a);
    assert_eq!(outcome.hits[1].ordinal, 1);
    assert_eq!(outcome.hits[2].source_repo, repo_b);
}
