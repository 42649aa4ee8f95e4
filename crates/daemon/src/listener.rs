// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! Unix socket listener: accepts `cidx` client connections and dispatches
//! each request/response pair against the scheduler, statistics store, and
//! startup log (spec.md §5 "Unix socket IPC").

use crate::executor::JobExecutor;
use crate::protocol;
use crate::scheduler::Scheduler;
use crate::startup_log::StartupLogApi;
use cidx_core::QueueKey;
use cidx_storage::StatisticsStore;
use cidx_wire::daemon::{DaemonRequest, DaemonResponse, JobAccepted, QueueListing};
use std::path::Path;
use std::sync::Arc;
use tokio::net::{UnixListener, UnixStream};

pub struct ListenerContext {
    pub scheduler: Scheduler,
    pub executor: JobExecutor,
    pub statistics: Arc<StatisticsStore>,
    pub startup_log: Arc<StartupLogApi>,
}

pub struct Listener {
    socket: UnixListener,
    ctx: Arc<ListenerContext>,
}

impl Listener {
    pub fn bind(socket_path: &Path, ctx: Arc<ListenerContext>) -> std::io::Result<Self> {
        let _ = std::fs::remove_file(socket_path);
        let socket = UnixListener::bind(socket_path)?;
        Ok(Self { socket, ctx })
    }

    /// Accept connections forever, handling each on its own task.
    pub async fn run(self) {
        loop {
            match self.socket.accept().await {
                Ok((stream, _addr)) => {
                    let ctx = self.ctx.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, &ctx).await {
                            tracing::warn!(error = %e, "client connection ended with a protocol error");
                        }
                    });
                }
                Err(e) => tracing::error!(error = %e, "accept failed"),
            }
        }
    }
}

async fn handle_connection(mut stream: UnixStream, ctx: &ListenerContext) -> Result<(), protocol::ProtocolError> {
    let Some(request) = protocol::read_request(&mut stream).await? else {
        return Ok(());
    };
    let response = handle_request(request, ctx);
    protocol::write_response(&mut stream, &response).await
}

fn handle_request(request: DaemonRequest, ctx: &ListenerContext) -> DaemonResponse {
    match request {
        DaemonRequest::Enqueue { owner, repository, operation, args, webhooks } => {
            let key = QueueKey(repository);
            match ctx.scheduler.submit(owner, key.clone(), operation, args, webhooks) {
                Ok(submission) => {
                    for repo in key.members() {
                        ctx.executor.try_dispatch(repo);
                    }
                    DaemonResponse::Accepted(JobAccepted { job: submission.job, position: submission.position })
                }
                Err(e) => error_response(&e),
            }
        }
        DaemonRequest::JobStatus { job_id } => match ctx.scheduler.get_job(job_id) {
            Some(job) => DaemonResponse::Job(job),
            None => DaemonResponse::Error { code: "job_not_found".to_string(), message: format!("job {job_id} not found") },
        },
        DaemonRequest::CancelJob { job_id } => match ctx.scheduler.cancel(job_id) {
            Ok(Some(job)) => DaemonResponse::Job(job),
            Ok(None) => DaemonResponse::Error { code: "job_not_found".to_string(), message: format!("job {job_id} not found") },
            Err(e) => error_response(&e),
        },
        DaemonRequest::ListQueue { repository } => {
            let key = QueueKey(repository.clone());
            let entries = ctx.scheduler.queue_listing(&key);
            DaemonResponse::Queue(QueueListing { repository, entries })
        }
        DaemonRequest::Statistics => DaemonResponse::Statistics(ctx.statistics.load()),
        DaemonRequest::StartupLog => match ctx.startup_log.get() {
            Ok(log) => DaemonResponse::StartupLog(log),
            Err(e) => error_response(&e),
        },
    }
}

fn error_response(error: &crate::error::DaemonError) -> DaemonResponse {
    DaemonResponse::Error { code: "daemon_error".to_string(), message: error.to_string() }
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
