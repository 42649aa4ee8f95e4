// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! Point-in-time snapshot of [`crate::state::MaterializedState`], tagged with
//! the WAL sequence number it reflects so recovery knows which entries still
//! need replaying.

use crate::atomic::write_atomic_json;
use crate::error::{io_err, Result, StorageError};
use crate::state::MaterializedState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CURRENT_SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "v")]
    pub version: u32,
    pub seq: u64,
    pub state: MaterializedState,
    pub created_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(seq: u64, state: MaterializedState, created_at: DateTime<Utc>) -> Self {
        Self { version: CURRENT_SNAPSHOT_VERSION, seq, state, created_at }
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        write_atomic_json(path, self)
    }

    /// Load a snapshot from disk, returning `Ok(None)` if it has never been
    /// written (first startup).
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_err(path.to_path_buf())(e)),
        };
        let snapshot = serde_json::from_slice(&bytes).map_err(StorageError::Serialize)?;
        Ok(Some(snapshot))
    }
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
