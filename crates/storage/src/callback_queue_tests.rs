// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

use super::*;
use cidx_core::JobId;
use tempfile::tempdir;

#[test]
fn due_returns_pending_callbacks_without_a_retry_time() {
    let dir = tempdir().expect("tempdir");
    let mut store = Store::open(dir.path()).expect("open");
    let callback = Callback::new(JobId::new(), "https://example.com/hook", serde_json::json!({}));
    let mut queue = CallbackQueue::new(&mut store);
    queue.enqueue(callback).expect("enqueue");
    assert_eq!(queue.due(Utc::now()).len(), 1);
}

#[test]
fn due_excludes_callbacks_with_a_future_retry_time() {
    let dir = tempdir().expect("tempdir");
    let mut store = Store::open(dir.path()).expect("open");
    let callback = Callback::new(JobId::new(), "https://example.com/hook", serde_json::json!({}));
    let callback_id = callback.id;
    let mut queue = CallbackQueue::new(&mut store);
    queue.enqueue(callback).expect("enqueue");
    let future = Utc::now() + chrono::Duration::seconds(120);
    queue
        .record_attempt(callback_id, 1, CallbackStatus::Pending, Some(future), None)
        .expect("record");
    assert!(queue.due(Utc::now()).is_empty());
}

#[test]
fn recover_resets_in_flight_callbacks_to_pending() {
    let dir = tempdir().expect("tempdir");
    let mut store = Store::open(dir.path()).expect("open");
    let callback = Callback::new(JobId::new(), "https://example.com/hook", serde_json::json!({}));
    let callback_id = callback.id;
    let mut queue = CallbackQueue::new(&mut store);
    queue.enqueue(callback).expect("enqueue");
    queue
        .record_attempt(callback_id, 1, CallbackStatus::InFlight, None, None)
        .expect("mark in flight");

    queue.recover().expect("recover");
    let restored = store.state().callbacks.get(&callback_id).expect("callback");
    assert_eq!(restored.status, CallbackStatus::Pending);
}
