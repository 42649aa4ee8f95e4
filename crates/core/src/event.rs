// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! The unifying event type replayed by `cidx-storage`'s write-ahead log and
//! materialized state (spec.md §4.2 WriteAheadLog, §4.4 QueuePersistence,
//! §4.6 LockStore, §4.7 CallbackQueue).
//!
//! Every variant must be safe to apply more than once: recovery replays the
//! WAL from the last durable snapshot, and a crash between `append` and
//! `mark_processed` means the last entry may be seen twice.

use crate::batch::{BatchId, PreparationPhase};
use crate::callback::{Callback, CallbackId, CallbackStatus};
use crate::job::{Job, JobId, JobStatus};
use crate::lock::{Lock, LockOperationId};
use crate::queue::QueuedOperation;
use crate::sentinel::Sentinel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    JobEnqueued { job: Job, queue_entry: QueuedOperation },
    JobStarted { job_id: JobId, started_at_ms: u64 },
    JobFinished { job_id: JobId, status: JobStatus, finished_at_ms: u64, error: Option<String> },
    JobCancelled { job_id: JobId, finished_at_ms: u64 },

    QueueDequeued { job_id: JobId },
    QueuePositionsRenumbered { positions: Vec<(JobId, usize)> },

    LockAcquired { lock: Lock },
    LockReleased { repository: String, operation_id: LockOperationId },

    SentinelHeartbeat { sentinel: Sentinel },
    SentinelRemoved { job_id: JobId },

    CallbackEnqueued { callback: Callback },
    CallbackAttempted {
        callback_id: CallbackId,
        attempts: u32,
        status: CallbackStatus,
        next_retry_at: Option<DateTime<Utc>>,
        last_error: Option<String>,
    },
    CallbackRemoved { callback_id: CallbackId },

    BatchCreated { batch_id: BatchId, repository: String, leader_job_id: JobId },
    BatchMemberAdded { batch_id: BatchId, job_id: JobId },
    BatchPreparationUpdated { batch_id: BatchId, preparation: PreparationPhase },
}

/// An [`Event`] as it sits in the WAL: tagged with the monotonic sequence
/// number assigned at append time and the wall-clock instant it was recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub sequence: u64,
    pub recorded_at: DateTime<Utc>,
    pub event: Event,
}

impl EventRecord {
    pub fn new(sequence: u64, recorded_at: DateTime<Utc>, event: Event) -> Self {
        Self { sequence, recorded_at, event }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
