// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! Persistence for [`cidx_core::StartupLog`], backing the read-only
//! startup-log API (spec.md §4.18).

use crate::atomic::write_atomic_json;
use crate::error::{io_err, Result, StorageError};
use cidx_core::StartupLog;
use std::path::{Path, PathBuf};

pub struct StartupLogStore {
    path: PathBuf,
}

impl StartupLogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<StartupLog> {
        match std::fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(StorageError::Serialize),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StartupLog::default()),
            Err(e) => Err(io_err(self.path.clone())(e)),
        }
    }

    pub fn save(&self, log: &StartupLog) -> Result<()> {
        write_atomic_json(&self.path, log)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
#[path = "startup_log_store_tests.rs"]
mod tests;
