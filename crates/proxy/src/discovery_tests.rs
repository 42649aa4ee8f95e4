use super::*;
use std::fs;
use tempfile::tempdir;

fn mark(dir: &Path) {
    fs::create_dir_all(dir.join(MARKER_DIR)).unwrap();
}

#[test]
fn discovers_nested_repos_sorted_and_relative() {
    let root = tempdir().unwrap();
    let r = root.path();
    mark(r);
    mark(&r.join("repoB"));
    mark(&r.join("sub/repoA"));
    fs::create_dir_all(r.join("empty")).unwrap();

    let repos = discover_repos(r).unwrap();
    assert_eq!(repos, vec![PathBuf::from("repoB"), PathBuf::from("sub/repoA")]);
}

#[test]
fn does_not_recurse_into_discovered_repos() {
    let root = tempdir().unwrap();
    let r = root.path();
    mark(r);
    mark(&r.join("repoA"));
    mark(&r.join("repoA/nested"));

    let repos = discover_repos(r).unwrap();
    assert_eq!(repos, vec![PathBuf::from("repoA")]);
}

#[test]
fn init_writes_config_and_rejects_nesting() {
    let root = tempdir().unwrap();
    let r = root.path();
    mark(&r.join("repoA"));

    let now = chrono::Utc::now();
    let config = init_proxy_mode(r, now).unwrap();
    assert!(config.proxy_mode);
    assert_eq!(config.discovered_repos, vec![PathBuf::from("repoA")]);
    assert!(config_path(r).is_file());

    let nested = r.join("repoA/child");
    fs::create_dir_all(&nested).unwrap();
    let err = init_proxy_mode(&nested, now).unwrap_err();
    assert!(matches!(err, ProxyError::NestedProxy(_, _)));
}

#[test]
fn load_config_round_trips() {
    let root = tempdir().unwrap();
    let r = root.path();
    mark(&r.join("repoA"));
    let now = chrono::Utc::now();
    init_proxy_mode(r, now).unwrap();

    let loaded = load_config(r).unwrap();
    assert_eq!(loaded.discovered_repos, vec![PathBuf::from("repoA")]);
}

#[test]
fn refresh_config_picks_up_new_repos() {
    let root = tempdir().unwrap();
    let r = root.path();
    let now = chrono::Utc::now();
    init_proxy_mode(r, now).unwrap();
    assert!(load_config(r).unwrap().discovered_repos.is_empty());

    mark(&r.join("repoA"));
    let refreshed = refresh_config(r).unwrap();
    assert_eq!(refreshed.discovered_repos, vec![PathBuf::from("repoA")]);
}

#[test]
fn not_a_proxy_when_config_missing() {
    let root = tempdir().unwrap();
    let err = load_config(root.path()).unwrap_err();
    assert!(matches!(err, ProxyError::NotAProxy(_)));
}

#[test]
fn find_proxy_root_walks_up_from_a_subdirectory() {
    let root = tempdir().unwrap();
    let r = root.path();
    mark(&r.join("repoA"));
    init_proxy_mode(r, chrono::Utc::now()).unwrap();

    let deep = r.join("repoA/src/nested");
    fs::create_dir_all(&deep).unwrap();
    assert_eq!(find_proxy_root(&deep), Some(r.to_path_buf()));
}

#[test]
fn find_proxy_root_is_none_outside_any_proxy() {
    let root = tempdir().unwrap();
    assert_eq!(find_proxy_root(root.path()), None);
}
