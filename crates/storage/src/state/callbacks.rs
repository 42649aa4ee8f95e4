// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

use super::MaterializedState;
use cidx_core::{CallbackStatus, Event, CALLBACK_MAX_ATTEMPTS};

pub(super) fn apply(state: &mut MaterializedState, event: &Event) {
    match event {
        Event::CallbackEnqueued { callback } => {
            if !state.failed_callbacks.contains_key(&callback.id) {
                state.callbacks.entry(callback.id).or_insert_with(|| callback.clone());
            }
        }
        Event::CallbackAttempted { callback_id, attempts, status, next_retry_at, last_error } => {
            if let Some(callback) = state.callbacks.get_mut(callback_id) {
                callback.attempts = *attempts;
                callback.status = *status;
                callback.next_retry_at = *next_retry_at;
                callback.last_error = last_error.clone();
                if matches!(status, CallbackStatus::Completed) {
                    state.callbacks.remove(callback_id);
                } else if *attempts >= CALLBACK_MAX_ATTEMPTS {
                    if let Some(exhausted) = state.callbacks.remove(callback_id) {
                        state.failed_callbacks.insert(*callback_id, exhausted);
                    }
                }
            }
        }
        Event::CallbackRemoved { callback_id } => {
            state.callbacks.remove(callback_id);
            state.failed_callbacks.remove(callback_id);
        }
        _ => {}
    }
}
