// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

use super::*;
use cidx_core::JobId;
use std::sync::Arc;
use tempfile::TempDir;

fn monitor() -> (TempDir, SentinelMonitor) {
    let dir = TempDir::new().unwrap();
    let layout = Arc::new(Layout::new(dir.path()));
    (dir, SentinelMonitor::new(layout))
}

#[test]
fn write_then_read_round_trips() {
    let (_dir, monitor) = monitor();
    let sentinel = Sentinel::new(JobId::new(), std::process::id(), "subprocess", "host-a");
    monitor.write(&sentinel).unwrap();
    let loaded = monitor.read(sentinel.job_id).unwrap();
    assert_eq!(loaded.job_id, sentinel.job_id);
    assert_eq!(loaded.pid, sentinel.pid);
}

#[test]
fn missing_sentinel_reads_as_none() {
    let (_dir, monitor) = monitor();
    assert!(monitor.read(JobId::new()).is_none());
}

#[test]
fn scan_finds_all_written_sentinels() {
    let (_dir, monitor) = monitor();
    let s1 = Sentinel::new(JobId::new(), std::process::id(), "subprocess", "host-a");
    let s2 = Sentinel::new(JobId::new(), std::process::id(), "subprocess", "host-a");
    monitor.write(&s1).unwrap();
    monitor.write(&s2).unwrap();
    let found = monitor.scan();
    assert_eq!(found.len(), 2);
}

#[test]
fn dead_pid_classifies_dead_even_with_fresh_timestamp() {
    let (_dir, monitor) = monitor();
    // PID 0 is never a valid target for a zero-signal kill from userspace
    // in the way a real process id is; use an implausible high PID instead
    // to simulate "process gone".
    let sentinel = Sentinel::new(JobId::new(), 999_999, "subprocess", "host-a");
    let status = monitor.classify(&sentinel, Utc::now());
    assert_eq!(status, SentinelStatus::Dead);
}

#[test]
fn live_pid_with_fresh_timestamp_classifies_fresh() {
    let (_dir, monitor) = monitor();
    let sentinel = Sentinel::new(JobId::new(), std::process::id(), "subprocess", "host-a");
    let status = monitor.classify(&sentinel, Utc::now());
    assert_eq!(status, SentinelStatus::Fresh);
}

#[test]
fn append_output_is_visible_via_read_output() {
    let (_dir, monitor) = monitor();
    let job_id = JobId::new();
    monitor.append_output(job_id, "sess-1", "hello ").unwrap();
    monitor.append_output(job_id, "sess-1", "world").unwrap();
    assert_eq!(monitor.read_output(job_id, "sess-1").unwrap(), "hello world");
}

#[test]
fn remove_deletes_the_sentinel_file() {
    let (_dir, monitor) = monitor();
    let sentinel = Sentinel::new(JobId::new(), std::process::id(), "subprocess", "host-a");
    monitor.write(&sentinel).unwrap();
    monitor.remove(sentinel.job_id);
    assert!(monitor.read(sentinel.job_id).is_none());
}
