// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

use super::MaterializedState;
use cidx_core::{Event, JobStatus, QueueKey};

pub(super) fn apply(state: &mut MaterializedState, event: &Event) {
    match event {
        Event::JobEnqueued { job, queue_entry } => {
            state.jobs.entry(job.id).or_insert_with(|| job.clone());
            let key = QueueKey::single(job.repository.clone());
            let queue = state.waiting_queues.entry(key).or_default();
            if !queue.iter().any(|q| q.job_id == queue_entry.job_id) {
                queue.push(queue_entry.clone());
            }
        }
        Event::JobStarted { job_id, started_at_ms } => {
            if let Some(job) = state.jobs.get_mut(job_id) {
                job.status = JobStatus::Running;
                job.started_at_ms = Some(*started_at_ms);
            }
        }
        Event::JobFinished { job_id, status, finished_at_ms, error } => {
            if let Some(job) = state.jobs.get_mut(job_id) {
                job.status = *status;
                job.finished_at_ms = Some(*finished_at_ms);
                job.error = error.clone();
            }
        }
        Event::JobCancelled { job_id, finished_at_ms } => {
            if let Some(job) = state.jobs.get_mut(job_id) {
                job.status = JobStatus::Cancelled;
                job.finished_at_ms = Some(*finished_at_ms);
            }
        }
        _ => {}
    }
}
