// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! Ties C3 QueuePersistence, C6 LockStore, and C7 WaitingQueueStore together
//! into the daemon's job scheduler (spec.md §4.2, §4.5, §4.6, §5).
//!
//! A repository (or composite alias) has at most one runnable job at a time.
//! [`Scheduler::dispatch`] decides, for a given repository name, which
//! waiting job becomes runnable next: the earliest-queued contender among
//! every queue whose key touches that repository (single-repo queues and
//! composite queues that include it), where a composite contender is only
//! eligible once *all* of its member repositories are simultaneously free
//! (spec.md §9 Open Question (a), resolved: FIFO by `queued_at` across both
//! kinds of waiter).

use crate::error::Result;
use chrono::Utc;
use cidx_core::{
    Job, JobId, JobStatus, OperationKind, QueueKey, QueuedOperation,
};
use cidx_storage::{LockStore, Store};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;

/// Every daemon component that mutates durable state (jobs, locks, queues,
/// callbacks, batches) shares one [`Store`] instance, since it is the event
/// log's single writer. [`Scheduler::store_handle`] hands out clones of
/// this handle to [`crate::callbacks::CallbackWorker`] and friends.
#[derive(Clone)]
pub struct Scheduler {
    store: Arc<Mutex<Store>>,
}

/// Outcome of a successful [`Scheduler::submit`].
pub struct Submission {
    pub job: Job,
    pub position: usize,
}

impl Scheduler {
    pub fn open(store_dir: &Path) -> Result<Self> {
        Ok(Self { store: Arc::new(Mutex::new(Store::open(store_dir)?)) })
    }

    /// Build a scheduler on top of a store another component already opened
    /// (and will keep a handle to via [`Scheduler::store_handle`]).
    pub fn from_store(store: Arc<Mutex<Store>>) -> Self {
        Self { store }
    }

    pub fn store_handle(&self) -> Arc<Mutex<Store>> {
        self.store.clone()
    }

    pub fn checkpoint(&self) -> Result<()> {
        Ok(self.store.lock().checkpoint()?)
    }

    pub fn get_job(&self, job_id: JobId) -> Option<Job> {
        self.store.lock().state().get_job(&job_id).cloned()
    }

    pub fn queue_listing(&self, key: &QueueKey) -> Vec<QueuedOperation> {
        self.store.lock().state().queue_for(key).to_vec()
    }

    /// Enqueue a new job under `key` (single repo or composite alias). The
    /// job starts `Queued`; the caller should follow up with
    /// [`Scheduler::dispatch`] for every repository named by `key`.
    pub fn submit(
        &self,
        owner: impl Into<String>,
        key: QueueKey,
        operation: OperationKind,
        args: Vec<String>,
        webhooks: Vec<String>,
    ) -> Result<Submission> {
        let mut store = self.store.lock();
        let now_ms = now_ms();
        let sequence = next_sequence(&store);
        let owner = owner.into();
        let job_id = JobId::new();
        let mut job = Job::new(job_id, owner.clone(), key.as_str(), args, sequence, now_ms);
        job.webhooks = webhooks;
        let queue_entry = QueuedOperation {
            job_id,
            user: owner,
            operation,
            queued_at_ms: now_ms,
            position: 0,
            eta_ms: None,
        };
        store.record(cidx_core::Event::JobEnqueued { job: job.clone(), queue_entry })?;
        renumber(&mut store, &key)?;
        let position = store
            .state()
            .queue_for(&key)
            .iter()
            .position(|q| q.job_id == job_id)
            .map(|idx| idx + 1)
            .unwrap_or(1);
        Ok(Submission { job, position })
    }

    /// Attempt to start the next eligible job for `repository`, considering
    /// every queue whose key touches it. Returns the job that started, if
    /// any lock could be acquired.
    pub fn dispatch(&self, repository: &str, pid: u32) -> Result<Option<Job>> {
        let mut store = self.store.lock();
        if repo_locked(&store, repository) {
            return Ok(None);
        }
        let candidate_keys = contending_keys(&store, repository);

        let mut best: Option<(QueueKey, QueuedOperation)> = None;
        for key in candidate_keys {
            if key.is_composite() && !all_members_free(&store, &key) {
                continue;
            }
            if let Some(head) = store.state().queue_for(&key).first().cloned() {
                let better = match &best {
                    None => true,
                    Some((_, current)) => {
                        (head.queued_at_ms, head.job_id.as_str())
                            < (current.queued_at_ms, current.job_id.as_str())
                    }
                };
                if better {
                    best = Some((key, head));
                }
            }
        }

        let Some((key, entry)) = best else {
            return Ok(None);
        };

        let lock_result = {
            let mut locks = LockStore::new(&mut store);
            locks.try_acquire(key.as_str(), entry.job_id, entry.operation, pid, Utc::now())
        };
        match lock_result {
            Ok(_lock) => {}
            Err(cidx_storage::StorageError::LockHeld { .. }) => return Ok(None),
            Err(e) => return Err(e.into()),
        }

        store.record(cidx_core::Event::QueueDequeued { job_id: entry.job_id })?;
        renumber(&mut store, &key)?;
        store.record(cidx_core::Event::JobStarted { job_id: entry.job_id, started_at_ms: now_ms() })?;

        Ok(store.state().get_job(&entry.job_id).cloned())
    }

    /// Mark a job finished, release whatever lock it held, and return the
    /// repository names now worth re-dispatching (its own key's members).
    pub fn complete(
        &self,
        job_id: JobId,
        status: JobStatus,
        error: Option<String>,
    ) -> Result<Vec<String>> {
        let mut store = self.store.lock();
        let Some(job) = store.state().get_job(&job_id).cloned() else {
            return Ok(Vec::new());
        };
        store.record(cidx_core::Event::JobFinished {
            job_id,
            status,
            finished_at_ms: now_ms(),
            error,
        })?;
        let key = QueueKey(job.repository.clone());
        let members: Vec<String> = key.members().into_iter().map(str::to_string).collect();
        {
            let mut locks = LockStore::new(&mut store);
            locks.release(key.as_str())?;
        }
        Ok(members)
    }

    /// Cancel a job. If still queued, removes it from its queue; running
    /// jobs are marked cancelled but the caller is responsible for
    /// terminating the underlying process.
    pub fn cancel(&self, job_id: JobId) -> Result<Option<Job>> {
        let mut store = self.store.lock();
        let Some(job) = store.state().get_job(&job_id).cloned() else {
            return Ok(None);
        };
        if job.is_terminal() {
            return Ok(Some(job));
        }
        let key = QueueKey(job.repository.clone());
        let was_queued = job.status == JobStatus::Queued;
        store.record(cidx_core::Event::JobCancelled { job_id, finished_at_ms: now_ms() })?;
        if was_queued {
            store.record(cidx_core::Event::QueueDequeued { job_id })?;
            renumber(&mut store, &key)?;
        }
        Ok(store.state().get_job(&job_id).cloned())
    }

    pub fn is_locked(&self, repository: &str) -> bool {
        repo_locked(&self.store.lock(), repository)
    }

    /// Lock keys (single or composite) stale by age at `now` (spec.md §3(d)
    /// / §4.5), used by recovery to reap locks abandoned by a crashed job.
    pub fn stale_lock_repositories(&self, now: chrono::DateTime<Utc>) -> Vec<String> {
        self.store.lock().state().locks.values().filter(|lock| lock.is_stale_by_age(now)).map(|lock| lock.repository.clone()).collect()
    }

    /// Unconditionally release a lock regardless of staleness, used during
    /// recovery once a lock has already been judged stale.
    pub fn force_release_lock(&self, repository: &str) -> Result<()> {
        let mut store = self.store.lock();
        let mut locks = LockStore::new(&mut store);
        locks.release(repository)?;
        Ok(())
    }

    /// Every repository name named by any non-empty waiting queue,
    /// deduplicated, used by recovery to re-attempt dispatch after replay.
    pub fn waiting_repositories(&self) -> Vec<String> {
        let store = self.store.lock();
        let mut repos: Vec<String> = store
            .state()
            .waiting_queues
            .iter()
            .filter(|(_, entries)| !entries.is_empty())
            .flat_map(|(key, _)| key.members().into_iter().map(str::to_string))
            .collect();
        repos.sort();
        repos.dedup();
        repos
    }
}

fn now_ms() -> u64 {
    std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).unwrap_or_default().as_millis() as u64
}

fn next_sequence(store: &Store) -> u64 {
    store.state().jobs.values().map(|j| j.sequence).max().unwrap_or(0) + 1
}

fn renumber(store: &mut Store, key: &QueueKey) -> Result<()> {
    let positions: Vec<(JobId, usize)> =
        store.state().queue_for(key).iter().enumerate().map(|(idx, q)| (q.job_id, idx + 1)).collect();
    if !positions.is_empty() {
        store.record(cidx_core::Event::QueuePositionsRenumbered { positions })?;
    }
    Ok(())
}

/// Every queue key that includes `repository`: the single-repo key itself
/// plus any composite key with `repository` as a member.
fn contending_keys(store: &Store, repository: &str) -> Vec<QueueKey> {
    store
        .state()
        .waiting_queues
        .keys()
        .filter(|key| key.members().contains(&repository))
        .cloned()
        .collect()
}

fn all_members_free(store: &Store, key: &QueueKey) -> bool {
    key.members().iter().all(|m| !repo_locked(store, m))
}

/// Whether `repo` is covered by any currently-held lock, single or
/// composite (mirrors [`cidx_storage::LockStore`]'s own conflict check).
fn repo_locked(store: &Store, repo: &str) -> bool {
    store.state().locks.keys().any(|held| {
        let members: Vec<&str> =
            held.strip_prefix("COMPOSITE#").map(|rest| rest.split('+').collect()).unwrap_or_else(|| vec![held.as_str()]);
        members.contains(&repo)
    })
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
