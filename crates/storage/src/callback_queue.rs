// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! C8 CallbackQueue: webhook delivery retries (spec.md §4.7).
//!
//! Entries move from `callbacks` (pending/in-flight) to `failed_callbacks`
//! once [`cidx_core::CALLBACK_MAX_ATTEMPTS`] is reached. Any callback left
//! `InFlight` in a reloaded snapshot crashed mid-delivery and must be reset
//! to `Pending` before the retry loop resumes — [`CallbackQueue::recover`]
//! does that reset.

use crate::error::Result;
use crate::store::Store;
use chrono::{DateTime, Utc};
use cidx_core::{Callback, CallbackId, CallbackStatus, Event};

pub struct CallbackQueue<'a> {
    store: &'a mut Store,
}

impl<'a> CallbackQueue<'a> {
    pub fn new(store: &'a mut Store) -> Self {
        Self { store }
    }

    pub fn enqueue(&mut self, callback: Callback) -> Result<()> {
        self.store.record(Event::CallbackEnqueued { callback })?;
        Ok(())
    }

    /// Record the outcome of a delivery attempt. `status` is the terminal
    /// state for this attempt (`Completed`, or `Pending`/`Failed` depending
    /// on whether a retry remains).
    pub fn record_attempt(
        &mut self,
        callback_id: CallbackId,
        attempts: u32,
        status: CallbackStatus,
        next_retry_at: Option<DateTime<Utc>>,
        last_error: Option<String>,
    ) -> Result<()> {
        self.store.record(Event::CallbackAttempted {
            callback_id,
            attempts,
            status,
            next_retry_at,
            last_error,
        })?;
        Ok(())
    }

    pub fn due(&self, now: DateTime<Utc>) -> Vec<&Callback> {
        self.store
            .state()
            .callbacks
            .values()
            .filter(|cb| match cb.next_retry_at {
                Some(at) => at <= now,
                None => matches!(cb.status, CallbackStatus::Pending),
            })
            .collect()
    }

    /// Reset any callback left `InFlight` from a crash back to `Pending` so
    /// it is retried rather than stuck forever.
    pub fn recover(&mut self) -> Result<()> {
        let stuck: Vec<CallbackId> = self
            .store
            .state()
            .callbacks
            .values()
            .filter(|cb| matches!(cb.status, CallbackStatus::InFlight))
            .map(|cb| cb.id)
            .collect();
        for id in stuck {
            if let Some(cb) = self.store.state().callbacks.get(&id).cloned() {
                self.record_attempt(id, cb.attempts, CallbackStatus::Pending, Some(Utc::now()), cb.last_error)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "callback_queue_tests.rs"]
mod tests;
