// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! `cidxd`: the code indexer daemon binary. Acquires the workspace PID lock,
//! runs startup recovery (spec.md §4.9), then serves the Unix socket until
//! signalled to stop.

use cidx_daemon::callbacks::CallbackWorker;
use cidx_daemon::env;
use cidx_daemon::executor::JobExecutor;
use cidx_daemon::listener::{Listener, ListenerContext};
use cidx_daemon::orchestrator::{default_phase_graph, PhaseOutcome, RecoveryOrchestrator};
use cidx_daemon::scheduler::Scheduler;
use cidx_daemon::sentinel::SentinelMonitor;
use cidx_daemon::startup_log::StartupLogApi;
use cidx_daemon::workspace::Layout;
use cidx_daemon::DaemonError;
use cidx_storage::StatisticsStore;
use fs2::FileExt;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> std::process::ExitCode {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    match run().await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "cidxd exited with an error");
            std::process::ExitCode::FAILURE
        }
    }
}

async fn run() -> cidx_daemon::Result<()> {
    let root = env::workspace_root();
    let layout = Arc::new(Layout::new(&root));
    layout.ensure_dirs().map_err(cidx_daemon::error::io_err(root.clone()))?;

    let _pid_lock = acquire_pid_lock(&layout)?;

    let scheduler = Scheduler::open(&layout.store_dir())?;
    let sentinel = SentinelMonitor::new(layout.clone());
    let executor = JobExecutor::new(layout.clone(), scheduler.clone(), sentinel.clone());
    let orphan_scanner = cidx_daemon::orphan::OrphanScanner::new(layout.clone(), sentinel.clone());
    let callback_worker = Arc::new(CallbackWorker::new(scheduler.store_handle()));

    run_recovery(&layout, &scheduler, &executor, &orphan_scanner, &callback_worker).await?;

    let statistics = Arc::new(StatisticsStore::new(layout.statistics_path()));
    let startup_log = Arc::new(StartupLogApi::new(layout.startup_log_path()));
    let ctx = Arc::new(ListenerContext { scheduler, executor, statistics, startup_log });

    let socket_path = env::socket_path(&root);
    let listener = Listener::bind(&socket_path, ctx).map_err(cidx_daemon::error::io_err(socket_path.clone()))?;

    tracing::info!(socket = %socket_path.display(), "cidxd listening");

    let callbacks_task = tokio::spawn({
        let worker = callback_worker.clone();
        async move { worker.run_forever().await }
    });

    tokio::select! {
        _ = listener.run() => {}
        _ = wait_for_shutdown_signal() => {
            tracing::info!("shutdown signal received");
        }
    }

    callbacks_task.abort();
    let _ = std::fs::remove_file(&socket_path);
    Ok(())
}

/// Run the fixed recovery phase graph (spec.md §4.9), tying each phase to
/// the concrete daemon component it recovers.
async fn run_recovery(
    layout: &Arc<Layout>,
    scheduler: &Scheduler,
    executor: &JobExecutor,
    orphan_scanner: &cidx_daemon::orphan::OrphanScanner,
    callback_worker: &Arc<CallbackWorker>,
) -> cidx_daemon::Result<()> {
    let orchestrator = RecoveryOrchestrator::new(layout.clone());
    let scheduler = scheduler.clone();
    let executor = executor.clone();
    let orphan_scanner_layout = layout.clone();
    let callback_worker = callback_worker.clone();

    tokio::task::spawn_blocking(move || {
        let orphan_scanner =
            cidx_daemon::orphan::OrphanScanner::new(orphan_scanner_layout.clone(), SentinelMonitor::new(orphan_scanner_layout));
        orchestrator.run(default_phase_graph(), move |phase| match phase {
            "queue" => scheduler.checkpoint().map(|()| PhaseOutcome::Completed).map_err(|e| e.to_string()),
            "locks" => reap_stale_locks(&scheduler).map(|()| PhaseOutcome::Completed).map_err(|e| e.to_string()),
            "jobs" => Ok(PhaseOutcome::Completed),
            "waiting_queues" => {
                for repository in waiting_repositories(&scheduler) {
                    executor.try_dispatch(&repository);
                }
                Ok(PhaseOutcome::Completed)
            }
            "orphans" => {
                orphan_scanner.resume_interrupted().map_err(|e| e.to_string())?;
                for (job_id, verdict) in orphan_scanner.scan() {
                    if verdict == cidx_daemon::orphan::OrphanVerdict::Orphaned {
                        if let Err(e) = orphan_scanner.cleanup(job_id) {
                            return Err(e.to_string());
                        }
                    }
                }
                Ok(PhaseOutcome::Completed)
            }
            "callbacks" => callback_worker.recover().map(|()| PhaseOutcome::Completed).map_err(|e| e.to_string()),
            // Batch preparation (git-pull/indexing staging) is driven by the
            // adaptor, not this daemon; nothing to recover here.
            "batches" => Ok(PhaseOutcome::Completed),
            other => Err(format!("no recovery handler registered for phase {other:?}")),
        })
    })
    .await
    .map_err(|e| DaemonError::PhaseFailed { phase: "recovery".to_string(), reason: e.to_string() })??;
    Ok(())
}

fn reap_stale_locks(scheduler: &Scheduler) -> cidx_daemon::Result<()> {
    let now = chrono::Utc::now();
    for repository in scheduler.stale_lock_repositories(now) {
        scheduler.force_release_lock(&repository)?;
    }
    Ok(())
}

fn waiting_repositories(scheduler: &Scheduler) -> Vec<String> {
    scheduler.waiting_repositories()
}

struct PidLock {
    file: std::fs::File,
    path: std::path::PathBuf,
}

impl Drop for PidLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
        let _ = std::fs::remove_file(&self.path);
    }
}

fn acquire_pid_lock(layout: &Layout) -> cidx_daemon::Result<PidLock> {
    let path = layout.root().join("cidxd.pid.lock");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .open(&path)
        .map_err(cidx_daemon::error::io_err(path.clone()))?;
    file.try_lock_exclusive().map_err(|_| DaemonError::AlreadyRunning(path.clone()))?;
    Ok(PidLock { file, path })
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(sig) => sig,
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = tokio::signal::ctrl_c() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
