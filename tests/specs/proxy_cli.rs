//! Proxy CLI surface specs: discovery, fan-out, merge, and exit codes
//! (spec.md §4.10-§4.15, §6).

use crate::helpers::Workspace;

#[test]
fn init_proxy_mode_discovers_and_persists_sorted_repos() {
    let ws = Workspace::new();
    ws.mark_repo("repoB");
    ws.mark_repo("sub/repoA");

    let output = ws.cidx(&["init", "--proxy-mode"]).assert().success();
    let stdout = String::from_utf8_lossy(&output.get_output().stdout).into_owned();
    assert!(stdout.contains("2 sub-repositories"));

    let config_path = ws.path().join(".code-indexer/config.json");
    let config: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(config_path).unwrap()).unwrap();
    assert_eq!(config["proxy_mode"], true);
    assert_eq!(config["discovered_repos"], serde_json::json!(["repoB", "sub/repoA"]));
}

#[test]
fn init_without_proxy_mode_flag_is_invalid_usage() {
    let ws = Workspace::new();
    ws.cidx(&["init"]).assert().code(2);
}

#[test]
fn commands_outside_a_proxy_workspace_are_invalid_usage() {
    let ws = Workspace::new();
    ws.cidx(&["status"]).assert().code(2);
}

#[test]
fn status_fans_out_and_reports_success_per_repo() {
    let ws = Workspace::new();
    ws.mark_repo("repoA");
    ws.mark_repo("repoB");
    ws.cidx(&["init", "--proxy-mode"]).assert().success();

    ws.set_stand_in("exit 0");
    let output = ws.cidx(&["status"]).assert().success();
    let stdout = String::from_utf8_lossy(&output.get_output().stdout).into_owned();
    assert!(stdout.contains("✓ repoA (status)"));
    assert!(stdout.contains("✓ repoB (status)"));
}

#[test]
fn sequential_start_continues_past_one_failure_and_exits_nonzero() {
    let ws = Workspace::new();
    ws.mark_repo("repoA");
    ws.mark_repo("repoB");
    ws.cidx(&["init", "--proxy-mode"]).assert().success();

    ws.set_stand_in(r#"case "$(basename "$PWD")" in repoB) echo "Port 6333 in use" >&2; exit 1 ;; esac"#);
    let output = ws.cidx(&["start"]).assert().code(1);
    let stdout = String::from_utf8_lossy(&output.get_output().stdout).into_owned();

    assert!(stdout.contains("[1/2] ✓ repoA"));
    assert!(stdout.contains("[2/2] ✗ repoB Port 6333 in use"));
    assert!(stdout.contains("1 succeeded, 1 failed"));
}

#[test]
fn query_merges_by_descending_score_and_truncates_to_the_limit() {
    let ws = Workspace::new();
    ws.mark_repo("repoA");
    ws.mark_repo("repoB");
    ws.cidx(&["init", "--proxy-mode"]).assert().success();

    ws.set_stand_in(
        r#"case "$(basename "$PWD")" in
  repoA) echo '[{"score": 5.0, "id": "a1"}, {"score": 1.0, "id": "a2"}]' ;;
  repoB) echo '[{"score": 3.0, "id": "b1"}]' ;;
esac"#,
    );

    let output = ws.cidx(&["query", "--limit", "2"]).assert().success();
    let stdout = String::from_utf8_lossy(&output.get_output().stdout).into_owned();

    assert!(stdout.contains("\"a1\""));
    assert!(stdout.contains("\"b1\""));
    assert!(!stdout.contains("\"a2\""));
    assert!(stdout.contains("2 hits, 0 repos with errors"));
}

#[test]
fn query_reports_a_per_repo_error_without_failing_the_whole_query() {
    let ws = Workspace::new();
    ws.mark_repo("repoA");
    ws.mark_repo("repoB");
    ws.cidx(&["init", "--proxy-mode"]).assert().success();

    ws.set_stand_in(
        r#"case "$(basename "$PWD")" in
  repoA) echo '[{"score": 1.0, "id": "a1"}]' ;;
  repoB) echo "index corrupted" >&2; exit 1 ;;
esac"#,
    );

    let output = ws.cidx(&["query"]).assert().code(1);
    let stdout = String::from_utf8_lossy(&output.get_output().stdout).into_owned();

    assert!(stdout.contains("\"a1\""));
    assert!(stdout.contains("use grep in repoB"));
}

#[test]
fn fix_config_picks_up_repos_added_after_init() {
    let ws = Workspace::new();
    ws.mark_repo("repoA");
    ws.cidx(&["init", "--proxy-mode"]).assert().success();

    ws.mark_repo("repoB");
    let output = ws.cidx(&["fix-config"]).assert().success();
    let stdout = String::from_utf8_lossy(&output.get_output().stdout).into_owned();
    assert!(stdout.contains("2 sub-repositories"));
}
