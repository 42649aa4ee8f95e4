// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! C8 CallbackQueue delivery worker (spec.md §4.7): polls due webhooks and
//! attempts delivery, applying the retry/backoff schedule on failure.

use crate::error::Result;
use chrono::Utc;
use cidx_core::{Callback, CallbackStatus, CALLBACK_MAX_ATTEMPTS};
use cidx_storage::{CallbackQueue, Store};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// How often [`CallbackWorker::run_once`] is polled by the background loop.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

pub struct CallbackWorker {
    store: Arc<Mutex<Store>>,
    client: reqwest::Client,
}

impl CallbackWorker {
    pub fn new(store: Arc<Mutex<Store>>) -> Self {
        let client = reqwest::Client::builder().timeout(Duration::from_secs(30)).build().unwrap_or_default();
        Self { store, client }
    }

    /// Reset any callback stuck `in_flight` from a prior crash back to
    /// `pending`, called once during recovery (spec.md §4.7 crash semantics).
    pub fn recover(&self) -> Result<()> {
        let mut store = self.store.lock();
        CallbackQueue::new(&mut store).recover()?;
        Ok(())
    }

    /// Deliver every callback currently due, one at a time.
    pub async fn run_once(&self) -> Result<usize> {
        let due: Vec<Callback> = {
            let mut store = self.store.lock();
            CallbackQueue::new(&mut store).due(Utc::now()).into_iter().cloned().collect()
        };
        let delivered = due.len();
        for callback in due {
            self.deliver(callback).await;
        }
        Ok(delivered)
    }

    /// Run [`Self::run_once`] on [`POLL_INTERVAL`] forever. Intended to be
    /// spawned as a background task and cancelled via the daemon's
    /// cancellation token.
    pub async fn run_forever(&self) {
        let mut ticker = tokio::time::interval(POLL_INTERVAL);
        loop {
            ticker.tick().await;
            if let Err(e) = self.run_once().await {
                tracing::warn!(error = %e, "callback delivery poll failed");
            }
        }
    }

    async fn deliver(&self, callback: Callback) {
        let attempts = callback.attempts + 1;
        let result = self.client.post(&callback.url).json(&callback.payload).send().await;

        let (status, attempts, last_error) = match result {
            Ok(resp) if resp.status().is_success() => (CallbackStatus::Completed, attempts, None),
            Ok(resp) => {
                let code = resp.status().as_u16();
                let error = Some(format!("upstream returned HTTP {code}"));
                if Callback::is_retryable_status(code) {
                    (CallbackStatus::Pending, attempts, error)
                } else {
                    // Non-retryable: force exhaustion so it moves to failed_callbacks now.
                    (CallbackStatus::Failed, CALLBACK_MAX_ATTEMPTS, error)
                }
            }
            Err(e) => (CallbackStatus::Pending, attempts, Some(e.to_string())),
        };

        let exhausted = attempts >= CALLBACK_MAX_ATTEMPTS;
        let (status, next_retry_at) = if exhausted && status != CallbackStatus::Completed {
            (CallbackStatus::Failed, None)
        } else if status == CallbackStatus::Pending {
            let delay = Callback { attempts, ..callback.clone() }
                .next_delay()
                .unwrap_or_else(|| chrono::Duration::seconds(0));
            (status, Some(Utc::now() + delay))
        } else {
            (status, None)
        };

        let mut store = self.store.lock();
        if let Err(e) = CallbackQueue::new(&mut store).record_attempt(callback.id, attempts, status, next_retry_at, last_error) {
            tracing::warn!(callback_id = %callback.id, error = %e, "failed to record webhook delivery attempt");
        }
    }
}

#[cfg(test)]
#[path = "callbacks_tests.rs"]
mod tests;
