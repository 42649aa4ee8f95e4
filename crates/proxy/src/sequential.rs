// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! C14 SequentialExecutor: resource-lifecycle commands (`start`, `stop`,
//! `uninstall`) run one repository at a time, printing progress and
//! continuing past per-repo failures (spec.md §4.13).

use crate::parallel::ExecutionResult;
use crate::signal;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

/// One line of progress output, emitted before and after each repo so the
/// caller (the CLI) can print it directly to stdout.
#[derive(Debug, Clone)]
pub enum Progress {
    Starting { index: usize, total: usize, repo: PathBuf },
    Finished { index: usize, total: usize, repo: PathBuf, result: ExecutionResult },
    Interrupted { repo: PathBuf },
}

/// Run `program(args)` once per repo in `repos`, in order, reporting
/// [`Progress`] via `on_progress` as it goes. Stops iterating (but does not
/// discard already-collected results) the moment `cancel` fires, leaving
/// remaining repos untouched (spec.md §5 "Proxy sequential").
pub async fn run(
    root: &Path,
    repos: &[PathBuf],
    program: &str,
    args: &[String],
    cancel: CancellationToken,
    mut on_progress: impl FnMut(Progress),
) -> Vec<ExecutionResult> {
    let total = repos.len();
    let mut results = Vec::with_capacity(total);

    for (i, repo) in repos.iter().enumerate() {
        if cancel.is_cancelled() {
            on_progress(Progress::Interrupted { repo: repo.clone() });
            break;
        }

        let index = i + 1;
        on_progress(Progress::Starting { index, total, repo: repo.clone() });

        let result = run_one(root, repo, program, args, cancel.clone()).await;
        let interrupted = result.cancelled;
        on_progress(Progress::Finished { index, total, repo: repo.clone(), result: result.clone() });
        results.push(result);

        if interrupted {
            break;
        }
    }

    results
}

async fn run_one(root: &Path, repo: &Path, program: &str, args: &[String], cancel: CancellationToken) -> ExecutionResult {
    let started_at = Utc::now();
    let cwd = root.join(repo);
    let spawned = Command::new(program).args(args).current_dir(&cwd).stdout(Stdio::piped()).stderr(Stdio::piped()).spawn();

    let mut child = match spawned {
        Ok(child) => child,
        Err(e) => {
            return ExecutionResult {
                repo: repo.to_path_buf(),
                exit_code: None,
                stdout: String::new(),
                stderr: e.to_string(),
                started_at,
                finished_at: Utc::now(),
                cancelled: false,
            }
        }
    };

    let (Some(mut stdout_pipe), Some(mut stderr_pipe)) = (child.stdout.take(), child.stderr.take()) else {
        return ExecutionResult {
            repo: repo.to_path_buf(),
            exit_code: None,
            stdout: String::new(),
            stderr: "child stdout/stderr was not piped".into(),
            started_at,
            finished_at: Utc::now(),
            cancelled: false,
        };
    };
    let stdout_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        let _ = stdout_pipe.read_to_end(&mut buf).await;
        buf
    });
    let stderr_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        let _ = stderr_pipe.read_to_end(&mut buf).await;
        buf
    });

    let mut cancelled = false;
    let status = tokio::select! {
        status = child.wait() => status,
        _ = cancel.cancelled() => {
            cancelled = true;
            signal::terminate(&mut child).await;
            child.wait().await
        }
    };

    let finished_at = Utc::now();
    let stdout = stdout_task.await.unwrap_or_default();
    let stderr = stderr_task.await.unwrap_or_default();

    ExecutionResult {
        repo: repo.to_path_buf(),
        exit_code: status.ok().and_then(|s| s.code()),
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
        started_at,
        finished_at,
        cancelled,
    }
}

#[cfg(test)]
#[path = "sequential_tests.rs"]
mod tests;
