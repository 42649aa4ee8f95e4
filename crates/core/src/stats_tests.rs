// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

use super::*;
use chrono::Utc;

fn usage(duration_sec: f64, memory_mib: f64) -> ResourceUsage {
    ResourceUsage { cpu_percent: 0.0, memory_mib, duration_sec, timestamp: Utc::now() }
}

#[test]
fn empty_snapshot_has_zero_percentiles() {
    let snap = StatisticsSnapshot::default();
    assert_eq!(snap.p90_duration_sec, 0.0);
    assert_eq!(snap.total_jobs_processed, 0);
}

#[test]
fn record_increments_total_and_updates_percentile() {
    let mut snap = StatisticsSnapshot::default();
    for i in 1..=10 {
        snap.record(usage(i as f64, i as f64));
    }
    assert_eq!(snap.total_jobs_processed, 10);
    assert_eq!(snap.p90_duration_sec, 9.0);
}

#[test]
fn ring_buffer_evicts_oldest_beyond_capacity() {
    let mut snap = StatisticsSnapshot::default();
    for i in 0..(RESOURCE_USAGE_RING_CAPACITY + 5) {
        snap.record(usage(i as f64, 1.0));
    }
    assert_eq!(snap.usage_ring.len(), RESOURCE_USAGE_RING_CAPACITY);
    assert_eq!(snap.total_jobs_processed, (RESOURCE_USAGE_RING_CAPACITY + 5) as u64);
}
