// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! Read-only admin surface against the local daemon (`cidxd`): queue
//! statistics and the startup log (spec.md §4.18 StartupLogAPI). Ambient
//! addition alongside the proxy CLI surface — the daemon's Unix socket IPC
//! is already built, so exposing it read-only here is just wiring, not new
//! protocol surface.

use crate::exit_error::{ExitError, EXIT_FAILURE, EXIT_SUCCESS};
use cidx_core::startup::STARTUP_LOG_HISTORY_LIMIT;
use cidx_daemon::{env, protocol};
use cidx_wire::daemon::{DaemonRequest, DaemonResponse};
use tokio::net::UnixStream;

async fn call(request: DaemonRequest) -> Result<DaemonResponse, ExitError> {
    let workspace = env::workspace_root();
    let socket = env::socket_path(&workspace);

    let mut stream = tokio::time::timeout(env::ipc_timeout(), UnixStream::connect(&socket))
        .await
        .map_err(|_| ExitError::failure(format!("timed out connecting to {}", socket.display())))?
        .map_err(|e| ExitError::failure(format!("daemon is not running ({e})")))?;

    protocol::write_request(&mut stream, &request).await.map_err(|e| ExitError::failure(e.to_string()))?;

    let response = tokio::time::timeout(env::ipc_timeout(), protocol::read_response(&mut stream))
        .await
        .map_err(|_| ExitError::failure("timed out waiting for the daemon's response"))?
        .map_err(|e| ExitError::failure(e.to_string()))?
        .ok_or_else(|| ExitError::failure("daemon closed the connection without responding"))?;

    Ok(response)
}

pub async fn status() -> Result<i32, ExitError> {
    match call(DaemonRequest::Statistics).await {
        Ok(DaemonResponse::Statistics(stats)) => {
            println!("{}", serde_json::to_string_pretty(&stats).unwrap_or_default());
            Ok(EXIT_SUCCESS)
        }
        Ok(DaemonResponse::Error { code, message }) => {
            println!("✗ daemon error {code}: {message}");
            Ok(EXIT_FAILURE)
        }
        Ok(other) => Err(ExitError::failure(format!("unexpected daemon response: {other:?}"))),
        Err(e) => {
            println!("Daemon is not running ({e})");
            Ok(EXIT_SUCCESS)
        }
    }
}

pub async fn startup_log(limit: Option<usize>) -> Result<i32, ExitError> {
    let limit = limit.unwrap_or(STARTUP_LOG_HISTORY_LIMIT);
    match call(DaemonRequest::StartupLog).await {
        Ok(DaemonResponse::StartupLog(log)) => {
            if let Some(current) = &log.current {
                println!("Current startup {}:", current.startup_id);
                print_record(current);
            }
            for record in log.history.iter().take(limit) {
                println!("\nPrior startup {}:", record.startup_id);
                print_record(record);
            }
            Ok(EXIT_SUCCESS)
        }
        Ok(DaemonResponse::Error { code, message }) => {
            println!("✗ daemon error {code}: {message}");
            Ok(EXIT_FAILURE)
        }
        Ok(other) => Err(ExitError::failure(format!("unexpected daemon response: {other:?}"))),
        Err(e) => {
            println!("Daemon is not running ({e})");
            Ok(EXIT_SUCCESS)
        }
    }
}

fn print_record(record: &cidx_core::startup::StartupRecord) {
    let duration = record
        .finished_at
        .map(|end| (end - record.started_at).num_milliseconds())
        .map(|ms| format!("{ms}ms"))
        .unwrap_or_else(|| "in progress".to_string());
    println!("  started_at={} duration={duration} degraded_mode={}", record.started_at, record.degraded_mode);
    for phase in &record.phases {
        let corrupted = phase.corrupted_resource.as_deref().unwrap_or("-");
        println!(
            "  phase {:<20} status={:<10} duration_ms={:<6} corrupted={corrupted}",
            phase.name,
            phase.status.to_string(),
            phase.duration_ms.unwrap_or(0),
        );
    }
}
