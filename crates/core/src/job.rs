// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! Job identifier and state machine (spec.md §3 "Job").

use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a job instance.
    pub struct JobId("job-");
}

/// Status of a job. Mutated only by the scheduler and its executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    BatchedWaiting,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled)
    }
}

crate::simple_display! {
    JobStatus {
        Queued => "queued",
        BatchedWaiting => "batched_waiting",
        Running => "running",
        Completed => "completed",
        Failed => "failed",
        Cancelled => "cancelled",
    }
}

/// A job instance: a unit of work against a single (or composite) repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub status: JobStatus,
    /// User that owns the job.
    pub owner: String,
    /// Repository alias this job runs against.
    pub repository: String,
    /// Command arguments as passed by the caller.
    pub args: Vec<String>,
    /// Monotonic FIFO sequence number (assigned by the WAL on enqueue).
    pub sequence: u64,
    /// Batch this job is a member of, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<String>,
    /// Webhook URLs to notify on completion.
    #[serde(default)]
    pub webhooks: Vec<String>,
    pub queued_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Job {
    pub fn new(
        id: JobId,
        owner: impl Into<String>,
        repository: impl Into<String>,
        args: Vec<String>,
        sequence: u64,
        queued_at_ms: u64,
    ) -> Self {
        Self {
            id,
            status: JobStatus::Queued,
            owner: owner.into(),
            repository: repository.into(),
            args,
            sequence,
            batch_id: None,
            webhooks: Vec::new(),
            queued_at_ms,
            started_at_ms: None,
            finished_at_ms: None,
            error: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

crate::builder! {
    pub struct JobBuilder => Job {
        into {
            owner: String = "test-user",
            repository: String = "repo-a",
        }
        set {
            status: JobStatus = JobStatus::Queued,
            args: Vec<String> = Vec::new(),
            sequence: u64 = 1,
            webhooks: Vec<String> = Vec::new(),
            queued_at_ms: u64 = 0,
        }
        option {
            batch_id: String = None,
            started_at_ms: u64 = None,
            finished_at_ms: u64 = None,
            error: String = None,
        }
        computed {
            id: JobId = JobId::new(),
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
