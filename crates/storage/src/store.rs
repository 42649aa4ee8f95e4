// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! Ties the WAL, snapshot, and materialized state together behind a single
//! entry point used by `cidx-daemon`'s lock/queue/callback/batch stores.
//!
//! Every mutation goes through [`Store::record`]: the event is appended to
//! the WAL (flushed to disk before `record` returns, per spec.md §4.2), then
//! applied to the in-memory state for immediate visibility. Once
//! [`crate::wal::Wal::needs_checkpoint`] says the op-count/byte-size/time
//! threshold has been crossed, `record` drives a checkpoint: a snapshot is
//! written and the WAL is truncated to the entries it doesn't yet cover. On
//! restart, [`Store::open`] loads the last snapshot and replays WAL entries
//! after its sequence number to reach the same state.

use crate::error::Result;
use crate::snapshot::Snapshot;
use crate::state::MaterializedState;
use crate::wal::Wal;
use chrono::Utc;
use cidx_core::Event;
use std::path::{Path, PathBuf};

pub struct Store {
    wal: Wal,
    state: MaterializedState,
    snapshot_path: PathBuf,
}

impl Store {
    /// Open the store rooted at `dir`, loading `snapshot.json` and replaying
    /// `state.wal` entries recorded after it.
    pub fn open(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir).map_err(crate::error::io_err(dir.to_path_buf()))?;
        let snapshot_path = dir.join("snapshot.json");
        let wal_path = dir.join("state.wal");

        let (mut state, processed_seq) = match Snapshot::load(&snapshot_path)? {
            Some(snapshot) => (snapshot.state, snapshot.seq),
            None => (MaterializedState::default(), 0),
        };

        let mut wal = Wal::open(&wal_path, processed_seq)?;
        while let Some(entry) = wal.next_unprocessed()? {
            state.apply(&entry.event);
            wal.mark_processed(entry.sequence);
        }

        Ok(Self { wal, state, snapshot_path })
    }

    pub fn state(&self) -> &MaterializedState {
        &self.state
    }

    /// Append `event` (flushed to disk by [`crate::wal::Wal::append`] before
    /// this returns), apply it for immediate visibility, and checkpoint
    /// (snapshot + WAL truncation) if a threshold has been crossed
    /// (spec.md §4.2).
    pub fn record(&mut self, event: Event) -> Result<u64> {
        let seq = self.wal.append(&event)?;
        self.state.apply(&event);
        self.wal.mark_processed(seq);
        if self.wal.needs_checkpoint() {
            self.checkpoint()?;
        }
        Ok(seq)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.wal.flush()
    }

    /// Write a snapshot at the current WAL sequence and truncate entries the
    /// snapshot now makes redundant (spec.md §4.2 checkpoint).
    pub fn checkpoint(&mut self) -> Result<()> {
        self.wal.flush()?;
        let seq = self.wal.processed_seq();
        let snapshot = Snapshot::new(seq, self.state.clone(), Utc::now());
        snapshot.write(&self.snapshot_path)?;
        self.wal.truncate_before(seq)?;
        self.wal.mark_checkpointed();
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
