// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! Repository lock records (spec.md §3 "Lock", §4.5 LockStore).

use crate::job::JobId;
use crate::queue::OperationKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a single lock acquisition.
    pub struct LockOperationId("lop-");
}

/// A held lock on a repository (or one member of a composite acquisition).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lock {
    pub repository: String,
    pub holder: JobId,
    pub operation: OperationKind,
    pub acquired_at: DateTime<Utc>,
    pub pid: u32,
    pub operation_id: LockOperationId,
}

impl Lock {
    pub fn new(
        repository: impl Into<String>,
        holder: JobId,
        operation: OperationKind,
        acquired_at: DateTime<Utc>,
        pid: u32,
    ) -> Self {
        Self {
            repository: repository.into(),
            holder,
            operation,
            acquired_at,
            pid,
            operation_id: LockOperationId::new(),
        }
    }

    /// Age of the lock at `now`.
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now.signed_duration_since(self.acquired_at)
    }

    /// Stale by age per spec.md §4.5: exactly 600s is inclusive-stale.
    /// A future-timestamped lock (clock skew) is treated as fresh.
    pub fn is_stale_by_age(&self, now: DateTime<Utc>) -> bool {
        let age = self.age(now);
        age >= chrono::Duration::seconds(600)
    }
}

crate::builder! {
    pub struct LockBuilder => Lock {
        into {
            repository: String = "repo-a",
        }
        set {
            operation: OperationKind = OperationKind::Query,
            pid: u32 = 1234,
        }
        computed {
            holder: JobId = JobId::new(),
            acquired_at: DateTime<Utc> = Utc::now(),
            operation_id: LockOperationId = LockOperationId::new(),
        }
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
