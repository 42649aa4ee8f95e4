// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! Filesystem layout for the daemon's workspace root (spec.md §6).

use cidx_core::JobId;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn store_dir(&self) -> PathBuf {
        self.root.join("store")
    }

    pub fn statistics_path(&self) -> PathBuf {
        self.root.join("statistics.json")
    }

    pub fn startup_log_path(&self) -> PathBuf {
        self.root.join("startup-log.json")
    }

    pub fn startup_marker_path(&self) -> PathBuf {
        self.root.join(".startup_marker.json")
    }

    pub fn repositories_path(&self) -> PathBuf {
        self.root.join("repositories.json")
    }

    pub fn locks_dir(&self) -> PathBuf {
        self.root.join("locks")
    }

    pub fn lock_path(&self, repository: &str) -> PathBuf {
        self.locks_dir().join(format!("{repository}.lock.json"))
    }

    pub fn jobs_dir(&self) -> PathBuf {
        self.root.join("jobs")
    }

    pub fn job_dir(&self, job_id: JobId) -> PathBuf {
        self.jobs_dir().join(job_id.as_str())
    }

    pub fn sentinel_path(&self, job_id: JobId) -> PathBuf {
        self.job_dir(job_id).join(".sentinel.json")
    }

    pub fn output_path(&self, job_id: JobId, session_id: &str) -> PathBuf {
        self.job_dir(job_id).join(format!("{session_id}.output"))
    }

    pub fn cleanup_marker_path(&self, job_id: JobId) -> PathBuf {
        self.job_dir(job_id).join(".cleanup_in_progress")
    }

    pub fn context_repository_dir(&self) -> PathBuf {
        self.root.join("context_repository")
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.root.join(".staging")
    }

    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.root)?;
        std::fs::create_dir_all(self.store_dir())?;
        std::fs::create_dir_all(self.locks_dir())?;
        std::fs::create_dir_all(self.jobs_dir())?;
        std::fs::create_dir_all(self.context_repository_dir())?;
        Ok(())
    }
}
