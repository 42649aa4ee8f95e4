// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! Job execution worker: spawns the adaptor subprocess for a dispatched job,
//! heartbeats its sentinel, duplexes its output, and on exit completes the
//! job, enqueues any webhook callbacks, and redispatches the repositories it
//! freed (spec.md §2 data flow, §4.4, §4.7).
//!
//! The system shells out to adaptor binaries rather than embedding any
//! indexing engine itself (spec.md §1 "explicitly out of scope"); this
//! worker treats `job.args` as a literal command line (`args[0]` is the
//! program, the rest its arguments) — the single generic subprocess adaptor
//! this daemon supports.

use crate::error::{io_err, DaemonError, Result};
use crate::scheduler::Scheduler;
use crate::sentinel::SentinelMonitor;
use crate::workspace::Layout;
use cidx_core::{Callback, Job, JobId, JobStatus, Sentinel};
use cidx_storage::CallbackQueue;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

const ADAPTOR_ENGINE: &str = "subprocess";

#[derive(Clone)]
pub struct JobExecutor {
    layout: Arc<Layout>,
    scheduler: Scheduler,
    sentinel: SentinelMonitor,
}

impl JobExecutor {
    pub fn new(layout: Arc<Layout>, scheduler: Scheduler, sentinel: SentinelMonitor) -> Self {
        Self { layout, scheduler, sentinel }
    }

    /// Run `job` to completion, then redispatch whatever its lock release
    /// frees up. Meant to be driven with `tokio::spawn` so the caller's
    /// accept/dispatch loop is never blocked on a single child process.
    pub async fn run(self, job: Job) {
        let job_id = job.id;
        let (status, error) = match self.run_adaptor(&job).await {
            Ok(outcome) => outcome,
            Err(e) => (JobStatus::Failed, Some(e.to_string())),
        };
        self.finish(job_id, status, error).await;
    }

    async fn run_adaptor(&self, job: &Job) -> Result<(JobStatus, Option<String>)> {
        let job_dir = self.layout.job_dir(job.id);
        std::fs::create_dir_all(&job_dir).map_err(io_err(job_dir))?;

        let sentinel = Sentinel::new(job.id, std::process::id(), ADAPTOR_ENGINE, hostname());
        self.sentinel.write(&sentinel)?;
        let _heartbeat = self.sentinel.spawn_heartbeat(sentinel);

        let Some(program) = job.args.first() else {
            return Ok((JobStatus::Failed, Some("job has no command to run".to_string())));
        };

        let mut child = Command::new(program)
            .args(&job.args[1..])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| DaemonError::Io { path: program.into(), source: e })?;

        let session_id = job.id.as_str().to_string();
        let stdout_task = self.pipe_to_output(child.stdout.take(), job.id, session_id.clone());
        let stderr_task = self.pipe_to_output(child.stderr.take(), job.id, session_id);

        let exit = child.wait().await.map_err(|e| DaemonError::Io { path: program.into(), source: e })?;
        let _ = stdout_task.await;
        let _ = stderr_task.await;

        if exit.success() {
            Ok((JobStatus::Completed, None))
        } else {
            Ok((JobStatus::Failed, Some(format!("adaptor exited with {exit}"))))
        }
    }

    fn pipe_to_output(
        &self,
        pipe: Option<impl tokio::io::AsyncRead + Unpin + Send + 'static>,
        job_id: JobId,
        session_id: String,
    ) -> tokio::task::JoinHandle<()> {
        let sentinel = self.sentinel.clone();
        tokio::spawn(async move {
            let Some(pipe) = pipe else { return };
            let mut lines = BufReader::new(pipe).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let _ = sentinel.append_output(job_id, &session_id, &format!("{line}\n"));
            }
        })
    }

    async fn finish(&self, job_id: JobId, status: JobStatus, error: Option<String>) {
        let job = self.scheduler.get_job(job_id);

        let freed = match self.scheduler.complete(job_id, status, error.clone()) {
            Ok(freed) => freed,
            Err(e) => {
                tracing::error!(%job_id, error = %e, "failed to record job completion");
                Vec::new()
            }
        };
        self.sentinel.remove(job_id);

        if let Some(job) = &job {
            self.enqueue_callbacks(job, status, error.as_deref());
        }

        for repo in freed {
            self.try_dispatch(&repo);
        }
    }

    /// Attempt to start the next eligible job for `repository` and, if one
    /// starts, run it to completion on a spawned task. A no-op if the
    /// repository is locked or has nothing waiting.
    pub fn try_dispatch(&self, repository: &str) {
        match self.scheduler.dispatch(repository, std::process::id()) {
            Ok(Some(job)) => {
                let worker = self.clone();
                tokio::spawn(async move { worker.run(job).await });
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(repository, error = %e, "redispatch after completion failed"),
        }
    }

    fn enqueue_callbacks(&self, job: &Job, status: JobStatus, error: Option<&str>) {
        if job.webhooks.is_empty() {
            return;
        }
        let payload = serde_json::json!({
            "job_id": job.id,
            "status": status.to_string(),
            "error": error,
        });
        let store_handle = self.scheduler.store_handle();
        let mut store = store_handle.lock();
        let mut queue = CallbackQueue::new(&mut store);
        for url in &job.webhooks {
            if let Err(e) = queue.enqueue(Callback::new(job.id, url.clone(), payload.clone())) {
                tracing::error!(url, error = %e, "failed to enqueue callback");
            }
        }
    }
}

fn hostname() -> String {
    nix::unistd::gethostname().ok().and_then(|h| h.into_string().ok()).unwrap_or_else(|| "unknown-host".to_string())
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
