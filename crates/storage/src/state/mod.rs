// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! Materialized state rebuilt by replaying the WAL (spec.md §4.2, §4.4,
//! §4.6-§4.8).

mod batches;
mod callbacks;
mod jobs;
mod locks;
mod queues;
mod sentinels;

use cidx_core::{
    Batch, BatchId, Callback, CallbackId, Event, Job, JobId, Lock, QueueKey, QueuedOperation,
    Sentinel,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The full durable state derived from the event log: every job, queued
/// operation, lock, sentinel, callback, and batch the daemon currently
/// knows about.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MaterializedState {
    pub jobs: HashMap<JobId, Job>,
    pub waiting_queues: HashMap<QueueKey, Vec<QueuedOperation>>,
    pub locks: HashMap<String, Lock>,
    pub sentinels: HashMap<JobId, Sentinel>,
    pub callbacks: HashMap<CallbackId, Callback>,
    pub failed_callbacks: HashMap<CallbackId, Callback>,
    pub batches: HashMap<BatchId, Batch>,
}

impl MaterializedState {
    pub fn get_job(&self, id: &JobId) -> Option<&Job> {
        self.jobs.get(id)
    }

    pub fn queue_for(&self, key: &QueueKey) -> &[QueuedOperation] {
        self.waiting_queues.get(key).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Apply one event, mutating state in place.
    ///
    /// Every handler MUST be idempotent: replaying the same event twice
    /// (e.g. because a crash landed between `Wal::append` and
    /// `Wal::mark_processed`) must leave state identical to applying it
    /// once. Handlers guard inserts/removals with existence checks instead
    /// of relying on the event stream never repeating.
    pub fn apply(&mut self, event: &Event) {
        match event {
            Event::JobEnqueued { .. }
            | Event::JobStarted { .. }
            | Event::JobFinished { .. }
            | Event::JobCancelled { .. } => jobs::apply(self, event),

            Event::QueueDequeued { .. } | Event::QueuePositionsRenumbered { .. } => {
                queues::apply(self, event)
            }

            Event::LockAcquired { .. } | Event::LockReleased { .. } => locks::apply(self, event),

            Event::SentinelHeartbeat { .. } | Event::SentinelRemoved { .. } => {
                sentinels::apply(self, event)
            }

            Event::CallbackEnqueued { .. }
            | Event::CallbackAttempted { .. }
            | Event::CallbackRemoved { .. } => callbacks::apply(self, event),

            Event::BatchCreated { .. }
            | Event::BatchMemberAdded { .. }
            | Event::BatchPreparationUpdated { .. } => batches::apply(self, event),
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
