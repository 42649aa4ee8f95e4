// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! C9 OrphanScanner (spec.md §4.8): classifies job workspaces as active or
//! orphaned from their sentinel's liveness, and cleans up orphans under a
//! transactional marker so an interrupted cleanup resumes cleanly.
//!
//! Containers, Docker networks, and index directories named in the original
//! contract are out of scope here — this daemon only ever spawns one kind
//! of adaptor (a plain subprocess), so the only resource per job worth
//! classifying is its own workspace directory under `jobs/`.

use crate::env;
use crate::error::{io_err, Result};
use crate::sentinel::SentinelMonitor;
use crate::workspace::Layout;
use chrono::Utc;
use cidx_core::{JobId, SentinelStatus};
use cidx_storage::atomic;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrphanVerdict {
    Active,
    Orphaned,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CleanupMarker {
    job_id: JobId,
    resources: Vec<String>,
    done: Vec<String>,
}

pub struct OrphanScanner {
    layout: Arc<Layout>,
    sentinel: SentinelMonitor,
}

impl OrphanScanner {
    pub fn new(layout: Arc<Layout>, sentinel: SentinelMonitor) -> Self {
        Self { layout, sentinel }
    }

    /// Classify every job workspace found under `jobs/` (spec.md §4.8
    /// decision rule): fresh sentinel is active; stale is left running with
    /// a warning; dead, or no sentinel past the grace period, is orphaned.
    pub fn scan(&self) -> Vec<(JobId, OrphanVerdict)> {
        let mut verdicts = Vec::new();
        let Ok(entries) = std::fs::read_dir(self.layout.jobs_dir()) else {
            return verdicts;
        };
        for entry in entries.flatten() {
            let Some(job_id) = job_id_from_entry(&entry) else { continue };
            let verdict = match self.sentinel.read(job_id) {
                Some(sentinel) => match self.sentinel.classify(&sentinel, Utc::now()) {
                    SentinelStatus::Fresh | SentinelStatus::Stale => OrphanVerdict::Active,
                    SentinelStatus::Dead => OrphanVerdict::Orphaned,
                },
                None if dir_age(&entry.path()) > env::orphan_grace_period() => OrphanVerdict::Orphaned,
                None => OrphanVerdict::Active,
            };
            verdicts.push((job_id, verdict));
        }
        verdicts
    }

    /// Remove an orphaned job's workspace under a `.cleanup_in_progress`
    /// marker, backing up any staged contents first. Aborts (returns
    /// `Ok(false)`) if a fresh heartbeat appears between classification and
    /// deletion.
    pub fn cleanup(&self, job_id: JobId) -> Result<bool> {
        let job_dir = self.layout.job_dir(job_id);
        if !job_dir.exists() {
            return Ok(false);
        }

        let marker_path = self.layout.cleanup_marker_path(job_id);
        let mut marker = CleanupMarker {
            job_id,
            resources: vec!["sentinel".into(), "outputs".into(), "workspace".into()],
            done: Vec::new(),
        };
        atomic::write_atomic_json(&marker_path, &marker)?;

        if self.is_fresh_now(job_id) {
            let _ = std::fs::remove_file(&marker_path);
            return Ok(false);
        }

        self.backup_staged_changes(job_id)?;

        self.sentinel.remove(job_id);
        marker.done.push("sentinel".into());
        atomic::write_atomic_json(&marker_path, &marker)?;

        // Output files live under job_dir and are removed together with it below;
        // recorded separately in the marker since spec.md §4.8 lists it as its own resource.
        marker.done.push("outputs".into());
        atomic::write_atomic_json(&marker_path, &marker)?;

        std::fs::remove_dir_all(&job_dir).map_err(io_err(job_dir.clone()))?;
        marker.done.push("workspace".into());

        std::fs::remove_file(&marker_path).map_err(io_err(marker_path))?;
        Ok(true)
    }

    /// Find every job with a leftover `.cleanup_in_progress` marker (a prior
    /// cleanup interrupted by a daemon crash) and finish it. Every step in
    /// [`Self::cleanup`] is idempotent, so simply re-running it is safe.
    pub fn resume_interrupted(&self) -> Result<Vec<JobId>> {
        let mut resumed = Vec::new();
        let Ok(entries) = std::fs::read_dir(self.layout.jobs_dir()) else {
            return Ok(resumed);
        };
        for entry in entries.flatten() {
            let Some(job_id) = job_id_from_entry(&entry) else { continue };
            if self.layout.cleanup_marker_path(job_id).exists() && self.cleanup(job_id)? {
                resumed.push(job_id);
            }
        }
        Ok(resumed)
    }

    fn is_fresh_now(&self, job_id: JobId) -> bool {
        self.sentinel
            .read(job_id)
            .map(|s| self.sentinel.classify(&s, Utc::now()) == SentinelStatus::Fresh)
            .unwrap_or(false)
    }

    fn backup_staged_changes(&self, job_id: JobId) -> Result<()> {
        let job_dir = self.layout.job_dir(job_id);
        let backup_dir = self.layout.staging_dir().join(format!("{}-{}", job_id.as_str(), Utc::now().timestamp_millis()));
        copy_dir_recursive(&job_dir, &backup_dir)
    }
}

fn job_id_from_entry(entry: &std::fs::DirEntry) -> Option<JobId> {
    entry.file_name().to_str().map(JobId::from_string)
}

fn dir_age(path: &Path) -> std::time::Duration {
    std::fs::metadata(path).and_then(|m| m.modified()).ok().and_then(|m| m.elapsed().ok()).unwrap_or_default()
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<()> {
    std::fs::create_dir_all(dst).map_err(io_err(dst.to_path_buf()))?;
    for entry in std::fs::read_dir(src).map_err(io_err(src.to_path_buf()))?.flatten() {
        let file_type = entry.file_type().map_err(io_err(entry.path()))?;
        let target = dst.join(entry.file_name());
        if file_type.is_dir() {
            copy_dir_recursive(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target).map_err(io_err(target))?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "orphan_tests.rs"]
mod tests;
