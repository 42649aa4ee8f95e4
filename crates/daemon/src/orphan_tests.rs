// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

use super::*;
use cidx_core::Sentinel;
use tempfile::TempDir;

fn scanner() -> (TempDir, Arc<Layout>, OrphanScanner) {
    let dir = TempDir::new().unwrap();
    let layout = Arc::new(Layout::new(dir.path()));
    layout.ensure_dirs().unwrap();
    let monitor = SentinelMonitor::new(layout.clone());
    (dir, layout.clone(), OrphanScanner::new(layout, monitor))
}

#[test]
fn job_with_fresh_sentinel_is_active() {
    let (_dir, layout, scanner) = scanner();
    let job_id = JobId::new();
    std::fs::create_dir_all(layout.job_dir(job_id)).unwrap();
    let monitor = SentinelMonitor::new(layout.clone());
    monitor.write(&Sentinel::new(job_id, std::process::id(), "subprocess", "host-a")).unwrap();

    let verdicts = scanner.scan();
    assert_eq!(verdicts, vec![(job_id, OrphanVerdict::Active)]);
}

#[test]
fn job_with_dead_sentinel_is_orphaned() {
    let (_dir, layout, scanner) = scanner();
    let job_id = JobId::new();
    std::fs::create_dir_all(layout.job_dir(job_id)).unwrap();
    let monitor = SentinelMonitor::new(layout.clone());
    monitor.write(&Sentinel::new(job_id, 999_999, "subprocess", "host-a")).unwrap();

    let verdicts = scanner.scan();
    assert_eq!(verdicts, vec![(job_id, OrphanVerdict::Orphaned)]);
}

#[test]
fn job_with_no_sentinel_and_no_age_is_active() {
    let (_dir, layout, scanner) = scanner();
    let job_id = JobId::new();
    std::fs::create_dir_all(layout.job_dir(job_id)).unwrap();

    let verdicts = scanner.scan();
    assert_eq!(verdicts, vec![(job_id, OrphanVerdict::Active)]);
}

#[test]
fn cleanup_removes_the_job_directory_and_marker() {
    let (_dir, layout, scanner) = scanner();
    let job_id = JobId::new();
    let job_dir = layout.job_dir(job_id);
    std::fs::create_dir_all(&job_dir).unwrap();
    std::fs::write(job_dir.join("sess-1.output"), b"partial output").unwrap();
    let monitor = SentinelMonitor::new(layout.clone());
    monitor.write(&Sentinel::new(job_id, 999_999, "subprocess", "host-a")).unwrap();

    let cleaned = scanner.cleanup(job_id).unwrap();
    assert!(cleaned);
    assert!(!job_dir.exists());
    assert!(!layout.cleanup_marker_path(job_id).exists());
}

#[test]
fn cleanup_aborts_when_the_heartbeat_turns_fresh_just_before_deletion() {
    let (_dir, layout, scanner) = scanner();
    let job_id = JobId::new();
    let job_dir = layout.job_dir(job_id);
    std::fs::create_dir_all(&job_dir).unwrap();
    let monitor = SentinelMonitor::new(layout.clone());
    monitor.write(&Sentinel::new(job_id, std::process::id(), "subprocess", "host-a")).unwrap();

    let cleaned = scanner.cleanup(job_id).unwrap();
    assert!(!cleaned);
    assert!(job_dir.exists());
}

#[test]
fn cleanup_backs_up_staged_contents_before_deleting() {
    let (_dir, layout, scanner) = scanner();
    let job_id = JobId::new();
    let job_dir = layout.job_dir(job_id);
    std::fs::create_dir_all(&job_dir).unwrap();
    std::fs::write(job_dir.join("notes.md"), b"staged changes").unwrap();
    let monitor = SentinelMonitor::new(layout.clone());
    monitor.write(&Sentinel::new(job_id, 999_999, "subprocess", "host-a")).unwrap();

    scanner.cleanup(job_id).unwrap();

    let staged = std::fs::read_dir(layout.staging_dir()).unwrap().flatten().next().expect("a backup dir");
    assert!(staged.path().join("notes.md").exists());
}

#[test]
fn resume_interrupted_finishes_a_leftover_marker() {
    let (_dir, layout, scanner) = scanner();
    let job_id = JobId::new();
    let job_dir = layout.job_dir(job_id);
    std::fs::create_dir_all(&job_dir).unwrap();
    atomic::write_atomic_json(&layout.cleanup_marker_path(job_id), &serde_json::json!({
        "job_id": job_id,
        "resources": ["sentinel", "outputs", "workspace"],
        "done": [],
    }))
    .unwrap();

    let resumed = scanner.resume_interrupted().unwrap();
    assert_eq!(resumed, vec![job_id]);
    assert!(!job_dir.exists());
}
