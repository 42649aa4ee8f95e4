// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

use super::*;
use crate::job::Job;
use crate::queue::{OperationKind, QueuedOperation};

#[test]
fn event_record_round_trips_through_json() {
    let job = Job::new(JobId::new(), "alice", "repo-a", vec!["query".into()], 1, 0);
    let entry = QueuedOperation {
        job_id: job.id,
        user: "alice".into(),
        operation: OperationKind::Query,
        queued_at_ms: 0,
        position: 0,
        eta_ms: None,
    };
    let record = EventRecord::new(1, Utc::now(), Event::JobEnqueued { job, queue_entry: entry });
    let json = serde_json::to_string(&record).expect("serialize");
    let restored: EventRecord = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(restored.sequence, 1);
    assert!(matches!(restored.event, Event::JobEnqueued { .. }));
}

#[test]
fn event_kind_tag_is_snake_case() {
    let event = Event::JobStarted { job_id: JobId::new(), started_at_ms: 42 };
    let json = serde_json::to_value(&event).expect("serialize");
    assert_eq!(json["kind"], "job_started");
}
