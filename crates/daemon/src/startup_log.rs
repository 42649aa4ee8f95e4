// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! C19 StartupLogAPI (spec.md §4.18): read-only view of the bounded history
//! [`RecoveryOrchestrator`](crate::orchestrator::RecoveryOrchestrator) writes
//! after each startup attempt.

use crate::error::Result;
use cidx_core::StartupLog;
use cidx_storage::StartupLogStore;
use std::path::PathBuf;

pub struct StartupLogApi {
    store: StartupLogStore,
}

impl StartupLogApi {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { store: StartupLogStore::new(path) }
    }

    pub fn get(&self) -> Result<StartupLog> {
        Ok(self.store.load()?)
    }
}

#[cfg(test)]
#[path = "startup_log_tests.rs"]
mod tests;
