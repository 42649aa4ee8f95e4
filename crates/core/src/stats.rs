// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! Real-time statistics snapshot (spec.md §3 "StatisticsSnapshot", §4.3).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default capacity of the resource-usage ring buffer.
pub const RESOURCE_USAGE_RING_CAPACITY: usize = 256;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceUsage {
    pub cpu_percent: f64,
    pub memory_mib: f64,
    pub duration_sec: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatisticsSnapshot {
    pub total_jobs_processed: u64,
    pub usage_ring: VecDeque<ResourceUsage>,
    pub p90_duration_sec: f64,
    pub p90_memory_mib: f64,
    pub capacity_total: u32,
    pub capacity_in_use: u32,
}

impl Default for StatisticsSnapshot {
    fn default() -> Self {
        Self {
            total_jobs_processed: 0,
            usage_ring: VecDeque::new(),
            p90_duration_sec: 0.0,
            p90_memory_mib: 0.0,
            capacity_total: 0,
            capacity_in_use: 0,
        }
    }
}

impl StatisticsSnapshot {
    /// Record a completed job's resource usage and recompute p90 estimates.
    pub fn record(&mut self, usage: ResourceUsage) {
        self.total_jobs_processed += 1;
        self.usage_ring.push_back(usage);
        while self.usage_ring.len() > RESOURCE_USAGE_RING_CAPACITY {
            self.usage_ring.pop_front();
        }
        self.p90_duration_sec = percentile(self.usage_ring.iter().map(|u| u.duration_sec), 0.90);
        self.p90_memory_mib = percentile(self.usage_ring.iter().map(|u| u.memory_mib), 0.90);
    }
}

/// Nearest-rank percentile over an iterator of samples. Returns 0.0 for an
/// empty sample set.
fn percentile(values: impl Iterator<Item = f64>, p: f64) -> f64 {
    let mut sorted: Vec<f64> = values.collect();
    if sorted.is_empty() {
        return 0.0;
    }
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let idx = ((sorted.len() as f64) * p).ceil() as usize;
    let idx = idx.saturating_sub(1).min(sorted.len() - 1);
    sorted[idx]
}

#[cfg(test)]
#[path = "stats_tests.rs"]
mod tests;
