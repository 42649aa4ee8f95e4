// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

use super::*;
use tempfile::tempdir;

#[test]
fn load_missing_snapshot_returns_none() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("snapshot.json");
    assert!(Snapshot::load(&path).expect("load").is_none());
}

#[test]
fn write_then_load_round_trips() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("snapshot.json");
    let snapshot = Snapshot::new(7, MaterializedState::default(), Utc::now());
    snapshot.write(&path).expect("write");

    let loaded = Snapshot::load(&path).expect("load").expect("some");
    assert_eq!(loaded.seq, 7);
    assert_eq!(loaded.version, CURRENT_SNAPSHOT_VERSION);
}
