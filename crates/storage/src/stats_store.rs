// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! C4 StatisticsPersistence: `statistics.json`, written under an exclusive
//! file lock so concurrent daemon workers never interleave writes (spec.md
//! §4.5). A corrupt file is treated as a cold start — parsing failure falls
//! back to a fresh [`StatisticsSnapshot`] rather than propagating an error,
//! since usage counters are advisory and not worth blocking startup over.

use crate::atomic::write_atomic_json;
use crate::error::{io_err, Result};
use cidx_core::{ResourceUsage, StatisticsSnapshot};
use fs2::FileExt;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

pub struct StatisticsStore {
    path: PathBuf,
}

impl StatisticsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> StatisticsSnapshot {
        match std::fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_default(),
            Err(_) => StatisticsSnapshot::default(),
        }
    }

    /// Record a job's resource usage under an exclusive file lock, so a
    /// racing writer from another worker can't interleave partial updates.
    pub fn record(&self, usage: ResourceUsage) -> Result<StatisticsSnapshot> {
        let lock_path = self.path.with_extension("json.lock");
        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .open(&lock_path)
            .map_err(io_err(lock_path.clone()))?;
        lock_file.lock_exclusive().map_err(io_err(lock_path.clone()))?;

        let mut snapshot = self.load();
        snapshot.record(usage);
        write_atomic_json(&self.path, &snapshot)?;

        FileExt::unlock(&lock_file).map_err(io_err(lock_path))?;
        Ok(snapshot)
    }

    /// Reset to a fresh snapshot, used when corruption is detected at
    /// startup so the daemon doesn't keep re-deriving garbage percentiles.
    pub fn reset(&self) -> Result<()> {
        write_atomic_json(&self.path, &StatisticsSnapshot::default())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
#[path = "stats_store_tests.rs"]
mod tests;
