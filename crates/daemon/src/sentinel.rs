// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! C5 SentinelMonitor: per-job heartbeat file and duplexed output file
//! (spec.md §4.4). Sentinel files are literal JSON on disk — independent of
//! the daemon's event-sourced [`cidx_storage::Store`] — because the
//! authoritative signal ("is this job's process still alive") must survive a
//! daemon crash and be observable by a fresh daemon process that has not yet
//! replayed anything.

use crate::error::{io_err, Result};
use crate::workspace::Layout;
use chrono::{DateTime, Utc};
use cidx_core::{JobId, Sentinel, SentinelStatus};
use cidx_storage::atomic;
use nix::sys::signal::kill;
use nix::unistd::Pid;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

#[derive(Clone)]
pub struct SentinelMonitor {
    layout: Arc<Layout>,
}

impl SentinelMonitor {
    pub fn new(layout: Arc<Layout>) -> Self {
        Self { layout }
    }

    pub fn write(&self, sentinel: &Sentinel) -> Result<()> {
        let path = self.layout.sentinel_path(sentinel.job_id);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err(parent.to_path_buf()))?;
        }
        atomic::write_atomic_json(&path, sentinel)?;
        Ok(())
    }

    pub fn read(&self, job_id: JobId) -> Option<Sentinel> {
        let bytes = std::fs::read(self.layout.sentinel_path(job_id)).ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    pub fn remove(&self, job_id: JobId) {
        let _ = std::fs::remove_file(self.layout.sentinel_path(job_id));
    }

    /// Append a chunk of adaptor output, flushing immediately so the file is
    /// authoritative even if the daemon crashes a moment later.
    pub fn append_output(&self, job_id: JobId, session_id: &str, text: &str) -> Result<()> {
        let path = self.layout.output_path(job_id, session_id);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err(parent.to_path_buf()))?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(&path).map_err(io_err(path.clone()))?;
        file.write_all(text.as_bytes()).map_err(io_err(path.clone()))?;
        file.flush().map_err(io_err(path))?;
        Ok(())
    }

    pub fn read_output(&self, job_id: JobId, session_id: &str) -> Option<String> {
        std::fs::read_to_string(self.layout.output_path(job_id, session_id)).ok()
    }

    /// Scan every `.sentinel.json` under the jobs directory.
    pub fn scan(&self) -> Vec<Sentinel> {
        let mut found = Vec::new();
        let Ok(entries) = std::fs::read_dir(self.layout.jobs_dir()) else {
            return found;
        };
        for entry in entries.flatten() {
            let path = entry.path().join(".sentinel.json");
            if let Ok(bytes) = std::fs::read(&path) {
                if let Ok(sentinel) = serde_json::from_slice::<Sentinel>(&bytes) {
                    found.push(sentinel);
                }
            }
        }
        found
    }

    /// Classify a sentinel's liveness, checking the PID with a zero-signal
    /// probe and letting a dead PID win over a fresh timestamp (spec.md §4.4
    /// tie-break).
    pub fn classify(&self, sentinel: &Sentinel, now: DateTime<Utc>) -> SentinelStatus {
        sentinel.classify(now, pid_alive(sentinel.pid))
    }

    /// Start a background task that rewrites the sentinel file (and touches
    /// the in-memory timestamp) every 30s for as long as the returned handle
    /// is held. Dropping the handle aborts the task.
    pub fn spawn_heartbeat(&self, mut sentinel: Sentinel) -> HeartbeatHandle {
        let monitor = self.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = interval(crate::env::heartbeat_interval());
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                sentinel.touch(Utc::now());
                if monitor.write(&sentinel).is_err() {
                    tracing::warn!(job_id = %sentinel.job_id, "failed to write sentinel heartbeat");
                }
            }
        });
        HeartbeatHandle { handle }
    }
}

/// Probe whether `pid` refers to a live process using a zero-signal kill,
/// which performs existence/permission checks without delivering a signal.
pub fn pid_alive(pid: u32) -> bool {
    kill(Pid::from_raw(pid as i32), None).is_ok()
}

pub struct HeartbeatHandle {
    handle: JoinHandle<()>,
}

impl Drop for HeartbeatHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
#[path = "sentinel_tests.rs"]
mod tests;
