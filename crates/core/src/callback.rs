// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! Webhook callback records (spec.md §3 "Callback", §4.7 CallbackQueue).

use crate::job::JobId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a webhook callback.
    pub struct CallbackId("cbk-");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallbackStatus {
    Pending,
    InFlight,
    Completed,
    Failed,
}

crate::simple_display! {
    CallbackStatus {
        Pending => "pending",
        InFlight => "in_flight",
        Completed => "completed",
        Failed => "failed",
    }
}

/// Retry schedule per spec.md §4.7: immediate, then +30s, +2m, +10m.
/// 3 retries total, 4 attempts maximum.
pub const CALLBACK_RETRY_DELAYS_SECS: [i64; 3] = [30, 120, 600];
pub const CALLBACK_MAX_ATTEMPTS: u32 = 4;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Callback {
    pub id: CallbackId,
    pub job_id: JobId,
    pub url: String,
    pub payload: serde_json::Value,
    pub attempts: u32,
    pub status: CallbackStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_retry_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl Callback {
    pub fn new(job_id: JobId, url: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            id: CallbackId::new(),
            job_id,
            url: url.into(),
            payload,
            attempts: 0,
            status: CallbackStatus::Pending,
            next_retry_at: None,
            last_error: None,
        }
    }

    /// True once `attempts` reaches the maximum and the callback should be
    /// moved to `failed_callbacks.json`.
    pub fn is_exhausted(&self) -> bool {
        self.attempts >= CALLBACK_MAX_ATTEMPTS
    }

    /// Delay before the next attempt, based on the number of attempts already made.
    pub fn next_delay(&self) -> Option<chrono::Duration> {
        let idx = self.attempts.checked_sub(1)? as usize;
        CALLBACK_RETRY_DELAYS_SECS.get(idx).map(|s| chrono::Duration::seconds(*s))
    }

    /// Whether an HTTP status code should be retried (per spec.md §4.7:
    /// 4xx are non-retryable except 408/429; 5xx are always retried).
    pub fn is_retryable_status(status: u16) -> bool {
        match status {
            408 | 429 => true,
            400..=499 => false,
            _ => true,
        }
    }
}

#[cfg(test)]
#[path = "callback_tests.rs"]
mod tests;
