// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! Sentinel heartbeat records (spec.md §3 "Sentinel", §4.4 SentinelMonitor).

use crate::job::JobId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Liveness classification derived from a sentinel's heartbeat age and PID.
///
/// Boundaries (spec.md §3(d), §4.4): age < 120s => Fresh; 120s..=600s (exclusive
/// upper on the Stale side, i.e. exactly 600s is Dead) => Stale; > 600s or a
/// dead PID => Dead regardless of timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentinelStatus {
    Fresh,
    Stale,
    Dead,
}

crate::simple_display! {
    SentinelStatus {
        Fresh => "fresh",
        Stale => "stale",
        Dead => "dead",
    }
}

/// Per-job heartbeat file contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sentinel {
    pub job_id: JobId,
    pub pid: u32,
    pub last_heartbeat_at: DateTime<Utc>,
    pub adaptor_engine: String,
    pub host: String,
}

impl Sentinel {
    pub fn new(job_id: JobId, pid: u32, adaptor_engine: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            job_id,
            pid,
            last_heartbeat_at: Utc::now(),
            adaptor_engine: adaptor_engine.into(),
            host: host.into(),
        }
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_heartbeat_at = now;
    }

    /// Classify liveness per spec.md §3(d) / §4.4, given whether the PID is
    /// alive according to the caller's process lookup. A dead PID always
    /// wins over a fresh timestamp (the tie-break in §4.4).
    pub fn classify(&self, now: DateTime<Utc>, pid_alive: bool) -> SentinelStatus {
        if !pid_alive {
            return SentinelStatus::Dead;
        }
        let age = now.signed_duration_since(self.last_heartbeat_at);
        if age < chrono::Duration::seconds(120) {
            SentinelStatus::Fresh
        } else if age < chrono::Duration::seconds(600) {
            SentinelStatus::Stale
        } else {
            SentinelStatus::Dead
        }
    }
}

#[cfg(test)]
#[path = "sentinel_tests.rs"]
mod tests;
