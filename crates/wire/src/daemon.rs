// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! Request/response envelopes exchanged between `cidx` (the CLI) and
//! `cidxd` (the daemon) over the Unix domain socket (spec.md §5 "Unix
//! socket IPC").

use cidx_core::{Job, JobId, OperationKind, QueuedOperation, SentinelStatus, StatisticsSnapshot};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DaemonRequest {
    Enqueue { owner: String, repository: String, operation: OperationKind, args: Vec<String>, webhooks: Vec<String> },
    JobStatus { job_id: JobId },
    CancelJob { job_id: JobId },
    ListQueue { repository: String },
    Statistics,
    StartupLog,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobAccepted {
    pub job: Job,
    pub position: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueListing {
    pub repository: String,
    pub entries: Vec<QueuedOperation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentinelSummary {
    pub job_id: JobId,
    pub status: SentinelStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DaemonResponse {
    Accepted(JobAccepted),
    Job(Job),
    Queue(QueueListing),
    Statistics(StatisticsSnapshot),
    StartupLog(cidx_core::StartupLog),
    Error { code: String, message: String },
}

#[cfg(test)]
#[path = "daemon_tests.rs"]
mod tests;
