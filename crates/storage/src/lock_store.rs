// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! C6 LockStore: per-repository mutual exclusion backed by the event log
//! (spec.md §4.6). A composite operation (proxy mode, multiple
//! repositories) locks under the sorted `COMPOSITE#a+b` key so it conflicts
//! with any single-repo lock on either member.

use crate::error::{Result, StorageError};
use crate::store::Store;
use chrono::{DateTime, Utc};
use cidx_core::{Event, JobId, Lock, OperationKind};

pub struct LockStore<'a> {
    store: &'a mut Store,
}

impl<'a> LockStore<'a> {
    pub fn new(store: &'a mut Store) -> Self {
        Self { store }
    }

    /// Repository keys that would conflict with acquiring `key`: itself,
    /// every composite lock containing one of its members, and (if `key` is
    /// itself composite) every single-repo lock on a member.
    fn conflicting_keys(&self, key: &str) -> Vec<String> {
        let members: Vec<&str> = if let Some(rest) = key.strip_prefix("COMPOSITE#") {
            rest.split('+').collect()
        } else {
            vec![key]
        };
        self.store
            .state()
            .locks
            .keys()
            .filter(|held| {
                let held_members: Vec<&str> = if let Some(rest) = held.strip_prefix("COMPOSITE#") {
                    rest.split('+').collect()
                } else {
                    vec![held.as_str()]
                };
                held_members.iter().any(|m| members.contains(m))
            })
            .cloned()
            .collect()
    }

    /// Acquire the lock for `repository` (single name or `COMPOSITE#...`
    /// key) on behalf of `holder`. Fails if any conflicting lock is held and
    /// not stale by age.
    pub fn try_acquire(
        &mut self,
        repository: impl Into<String>,
        holder: JobId,
        operation: OperationKind,
        pid: u32,
        now: DateTime<Utc>,
    ) -> Result<Lock> {
        let repository = repository.into();
        for held_key in self.conflicting_keys(&repository) {
            if let Some(existing) = self.store.state().locks.get(&held_key) {
                if !existing.is_stale_by_age(now) {
                    return Err(StorageError::LockHeld {
                        repository: held_key,
                        holder: existing.holder.to_string(),
                    });
                }
            }
        }
        let lock = Lock::new(repository, holder, operation, now, pid);
        self.store.record(Event::LockAcquired { lock: lock.clone() })?;
        Ok(lock)
    }

    pub fn release(&mut self, repository: &str) -> Result<()> {
        if let Some(lock) = self.store.state().locks.get(repository).cloned() {
            self.store.record(Event::LockReleased {
                repository: repository.to_string(),
                operation_id: lock.operation_id,
            })?;
        }
        Ok(())
    }

    pub fn is_held(&self, repository: &str) -> bool {
        self.store.state().locks.contains_key(repository)
    }
}

#[cfg(test)]
#[path = "lock_store_tests.rs"]
mod tests;
