// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

use super::*;
use cidx_core::{
    Callback, CallbackStatus, Job, Lock, OperationKind, QueuedOperation, Sentinel,
};
use chrono::Utc;

fn enqueue_event(job: &Job) -> Event {
    let entry = QueuedOperation {
        job_id: job.id,
        user: job.owner.clone(),
        operation: OperationKind::Query,
        queued_at_ms: job.queued_at_ms,
        position: 0,
        eta_ms: None,
    };
    Event::JobEnqueued { job: job.clone(), queue_entry: entry }
}

#[test]
fn job_enqueued_is_idempotent() {
    let job = Job::new(JobId::new(), "alice", "repo-a", vec![], 1, 0);
    let event = enqueue_event(&job);
    let mut state = MaterializedState::default();
    state.apply(&event);
    state.apply(&event);
    assert_eq!(state.jobs.len(), 1);
    assert_eq!(state.queue_for(&QueueKey::single("repo-a")).len(), 1);
}

#[test]
fn job_lifecycle_transitions_through_start_and_finish() {
    let job = Job::new(JobId::new(), "alice", "repo-a", vec![], 1, 0);
    let job_id = job.id;
    let mut state = MaterializedState::default();
    state.apply(&enqueue_event(&job));
    state.apply(&Event::JobStarted { job_id, started_at_ms: 10 });
    assert_eq!(state.get_job(&job_id).expect("job").status, JobStatus::Running);

    state.apply(&Event::JobFinished {
        job_id,
        status: JobStatus::Completed,
        finished_at_ms: 20,
        error: None,
    });
    assert_eq!(state.get_job(&job_id).expect("job").status, JobStatus::Completed);
}

#[test]
fn queue_dequeued_removes_entry_from_every_queue() {
    let job = Job::new(JobId::new(), "alice", "repo-a", vec![], 1, 0);
    let mut state = MaterializedState::default();
    state.apply(&enqueue_event(&job));
    state.apply(&Event::QueueDequeued { job_id: job.id });
    assert!(state.queue_for(&QueueKey::single("repo-a")).is_empty());
}

#[test]
fn lock_released_is_a_no_op_for_a_stale_operation_id() {
    let lock = Lock::new("repo-a", JobId::new(), OperationKind::Start, Utc::now(), 123);
    let stale_op = lock.operation_id;
    let mut state = MaterializedState::default();
    state.apply(&Event::LockAcquired { lock: lock.clone() });

    let newer = Lock::new("repo-a", JobId::new(), OperationKind::Start, Utc::now(), 456);
    state.apply(&Event::LockAcquired { lock: newer.clone() });

    state.apply(&Event::LockReleased { repository: "repo-a".into(), operation_id: stale_op });
    assert_eq!(state.locks.get("repo-a").expect("lock").operation_id, newer.operation_id);
}

#[test]
fn sentinel_heartbeat_replaces_previous_reading() {
    let job_id = JobId::new();
    let mut sentinel = Sentinel::new(job_id, 999, "qdrant", "host-a");
    let mut state = MaterializedState::default();
    state.apply(&Event::SentinelHeartbeat { sentinel: sentinel.clone() });
    sentinel.touch(Utc::now());
    state.apply(&Event::SentinelHeartbeat { sentinel: sentinel.clone() });
    assert_eq!(state.sentinels.len(), 1);
}

#[test]
fn callback_exhausted_moves_to_failed_callbacks() {
    let callback = Callback::new(JobId::new(), "https://example.com/hook", serde_json::json!({}));
    let callback_id = callback.id;
    let mut state = MaterializedState::default();
    state.apply(&Event::CallbackEnqueued { callback });
    state.apply(&Event::CallbackAttempted {
        callback_id,
        attempts: 4,
        status: CallbackStatus::Failed,
        next_retry_at: None,
        last_error: Some("connection refused".into()),
    });
    assert!(!state.callbacks.contains_key(&callback_id));
    assert!(state.failed_callbacks.contains_key(&callback_id));
}

#[test]
fn batch_member_added_is_idempotent() {
    let leader = JobId::new();
    let batch_id = BatchId::new();
    let mut state = MaterializedState::default();
    state.apply(&Event::BatchCreated { batch_id, repository: "repo-a".into(), leader_job_id: leader });

    let member = JobId::new();
    let event = Event::BatchMemberAdded { batch_id, job_id: member };
    state.apply(&event);
    state.apply(&event);
    assert_eq!(state.batches.get(&batch_id).expect("batch").member_job_ids.len(), 2);
}
