// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

use super::*;
use crate::sentinel::SentinelMonitor;
use crate::workspace::Layout;
use cidx_core::{JobId, OperationKind};
use cidx_storage::StatisticsStore;
use tempfile::TempDir;

fn listener_ctx() -> (TempDir, Arc<Layout>, Arc<ListenerContext>) {
    let dir = TempDir::new().unwrap();
    let layout = Arc::new(Layout::new(dir.path()));
    layout.ensure_dirs().unwrap();
    let scheduler = Scheduler::open(&layout.store_dir()).unwrap();
    let sentinel = SentinelMonitor::new(layout.clone());
    let executor = JobExecutor::new(layout.clone(), scheduler.clone(), sentinel);
    let ctx = Arc::new(ListenerContext {
        scheduler,
        executor,
        statistics: Arc::new(StatisticsStore::new(layout.statistics_path())),
        startup_log: Arc::new(StartupLogApi::new(layout.startup_log_path())),
    });
    (dir, layout, ctx)
}

#[test]
fn enqueue_accepts_a_job_and_assigns_a_position() {
    let (_dir, _layout, ctx) = listener_ctx();
    let request = DaemonRequest::Enqueue {
        owner: "alice".into(),
        repository: "alpha".into(),
        operation: OperationKind::Query,
        args: vec!["sh".into(), "-c".into(), "true".into()],
        webhooks: vec![],
    };
    let response = handle_request(request, &ctx);
    match response {
        DaemonResponse::Accepted(accepted) => assert_eq!(accepted.position, 1),
        other => panic!("expected Accepted, got {other:?}"),
    }
}

#[test]
fn job_status_reports_not_found_for_an_unknown_job() {
    let (_dir, _layout, ctx) = listener_ctx();
    let response = handle_request(DaemonRequest::JobStatus { job_id: JobId::new() }, &ctx);
    match response {
        DaemonResponse::Error { code, .. } => assert_eq!(code, "job_not_found"),
        other => panic!("expected Error, got {other:?}"),
    }
}

#[test]
fn list_queue_reflects_the_submitted_job() {
    let (_dir, _layout, ctx) = listener_ctx();
    handle_request(
        DaemonRequest::Enqueue {
            owner: "alice".into(),
            repository: "alpha".into(),
            operation: OperationKind::Query,
            args: vec!["sh".into(), "-c".into(), "true".into()],
            webhooks: vec![],
        },
        &ctx,
    );
    let response = handle_request(DaemonRequest::ListQueue { repository: "alpha".into() }, &ctx);
    match response {
        DaemonResponse::Queue(listing) => assert_eq!(listing.repository, "alpha"),
        other => panic!("expected Queue, got {other:?}"),
    }
}

#[test]
fn statistics_returns_a_default_snapshot_when_nothing_was_recorded_yet() {
    let (_dir, _layout, ctx) = listener_ctx();
    let response = handle_request(DaemonRequest::Statistics, &ctx);
    assert!(matches!(response, DaemonResponse::Statistics(_)));
}

#[test]
fn startup_log_returns_an_empty_log_before_any_startup_ran() {
    let (_dir, _layout, ctx) = listener_ctx();
    let response = handle_request(DaemonRequest::StartupLog, &ctx);
    match response {
        DaemonResponse::StartupLog(log) => assert!(log.current.is_none()),
        other => panic!("expected StartupLog, got {other:?}"),
    }
}
