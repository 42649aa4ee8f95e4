// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

use super::*;

#[test]
fn new_callback_is_pending_with_zero_attempts() {
    let cb = Callback::new(JobId::new(), "https://example.com/hook", serde_json::json!({}));
    assert_eq!(cb.status, CallbackStatus::Pending);
    assert_eq!(cb.attempts, 0);
    assert!(!cb.is_exhausted());
}

#[test]
fn exhausted_after_four_attempts() {
    let mut cb = Callback::new(JobId::new(), "https://example.com/hook", serde_json::json!({}));
    cb.attempts = 4;
    assert!(cb.is_exhausted());
}

#[test]
fn retry_delays_follow_schedule() {
    let mut cb = Callback::new(JobId::new(), "https://example.com/hook", serde_json::json!({}));
    cb.attempts = 1;
    assert_eq!(cb.next_delay(), Some(chrono::Duration::seconds(30)));
    cb.attempts = 2;
    assert_eq!(cb.next_delay(), Some(chrono::Duration::seconds(120)));
    cb.attempts = 3;
    assert_eq!(cb.next_delay(), Some(chrono::Duration::seconds(600)));
    cb.attempts = 4;
    assert_eq!(cb.next_delay(), None);
}

#[test]
fn non_retryable_4xx_except_408_429() {
    assert!(!Callback::is_retryable_status(404));
    assert!(!Callback::is_retryable_status(400));
    assert!(Callback::is_retryable_status(408));
    assert!(Callback::is_retryable_status(429));
}

#[test]
fn server_errors_are_retryable() {
    assert!(Callback::is_retryable_status(500));
    assert!(Callback::is_retryable_status(503));
}
