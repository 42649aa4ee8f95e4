// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

use super::*;
use std::time::SystemTime;
use tempfile::tempdir;

#[test]
fn write_atomic_leaves_no_temp_file_behind() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("state.json");
    write_atomic(&path, b"{}").expect("write");
    assert_eq!(fs::read(&path).expect("read"), b"{}");
    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .expect("read_dir")
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().contains(".tmp."))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn write_atomic_replaces_existing_content_wholesale() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("state.json");
    write_atomic(&path, b"first").expect("write1");
    write_atomic(&path, b"second").expect("write2");
    assert_eq!(fs::read(&path).expect("read"), b"second");
}

#[test]
fn write_atomic_cleans_up_temp_file_on_rename_failure() {
    let dir = tempdir().expect("tempdir");
    // `path` is itself a directory, so the temp file (a sibling) is created
    // fine but the final rename-over-a-directory fails.
    let path = dir.path().join("state.json");
    fs::create_dir(&path).expect("mkdir");

    write_atomic(&path, b"{}").expect_err("rename over a directory should fail");

    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .expect("read_dir")
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().contains(".tmp."))
        .collect();
    assert!(leftovers.is_empty(), "temp file should be removed best-effort on failure");
}

#[test]
fn sweep_removes_only_stale_temp_files() {
    let dir = tempdir().expect("tempdir");
    let fresh = dir.path().join("state.json.tmp.1.abc");
    let stale = dir.path().join("state.json.tmp.2.def");
    fs::write(&fresh, b"x").expect("write fresh");
    fs::write(&stale, b"x").expect("write stale");

    let old = SystemTime::now() - Duration::from_secs(900);
    let file = fs::File::open(&stale).expect("open stale");
    file.set_modified(old).expect("backdate");

    let removed = sweep_stale_temp_files(dir.path()).expect("sweep");
    assert_eq!(removed, 1);
    assert!(fresh.exists());
    assert!(!stale.exists());
}
