// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! C13 ParallelExecutor: fan out a command across every discovered
//! repository concurrently, capturing each child's output independently
//! (spec.md §4.12).

use crate::error::{io_err, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub repo: PathBuf,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Set when the child was killed in response to cancellation rather
    /// than exiting on its own.
    pub cancelled: bool,
}

impl ExecutionResult {
    pub fn succeeded(&self) -> bool {
        !self.cancelled && self.exit_code == Some(0)
    }
}

/// Spawn one child per repository under `root`, concurrently, each with its
/// working directory set to `root.join(repo)`. No child's failure affects
/// another; a cancellation token propagates SIGTERM/SIGKILL to every
/// still-running child (spec.md §5 "Proxy parallel").
pub async fn run(
    root: &Path,
    repos: &[PathBuf],
    program: &str,
    args: &[String],
    cancel: CancellationToken,
) -> Vec<ExecutionResult> {
    let mut tasks = Vec::with_capacity(repos.len());
    for repo in repos {
        let repo = repo.clone();
        let cwd = root.join(&repo);
        let program = program.to_string();
        let args = args.to_vec();
        let cancel = cancel.clone();
        tasks.push(tokio::spawn(async move { run_one(repo, cwd, program, args, cancel).await }));
    }

    let mut results = Vec::with_capacity(tasks.len());
    for task in tasks {
        match task.await {
            Ok(result) => results.push(result),
            Err(_) => continue,
        }
    }
    results
}

async fn run_one(repo: PathBuf, cwd: PathBuf, program: String, args: Vec<String>, cancel: CancellationToken) -> ExecutionResult {
    let started_at = Utc::now();
    let spawned = Command::new(&program)
        .args(&args)
        .current_dir(&cwd)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn();

    let mut child = match spawned {
        Ok(child) => child,
        Err(e) => {
            return ExecutionResult {
                repo,
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
            repo,
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
            Ok(wait_after_kill(&mut child).await)
        }
    };

    let finished_at = Utc::now();
    let stdout = stdout_task.await.unwrap_or_default();
    let stderr = stderr_task.await.unwrap_or_default();

    match status {
        Ok(status) => ExecutionResult {
            repo,
            exit_code: status.code(),
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            started_at,
            finished_at,
            cancelled,
        },
        Err(e) => ExecutionResult {
            repo,
            exit_code: None,
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: e.to_string(),
            started_at,
            finished_at,
            cancelled,
        },
    }
}

async fn wait_after_kill(child: &mut tokio::process::Child) -> std::process::ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    crate::signal::terminate(child).await;
    child.wait().await.unwrap_or_else(|_| std::process::ExitStatus::from_raw(-1))
}

/// Write every child's stdout under `dir` for later inspection (used by
/// callers that want durable logs alongside the in-memory results); not
/// required for the happy path but kept separate so tests can exercise
/// `run` without touching the filesystem.
pub fn persist_stdout(dir: &Path, result: &ExecutionResult) -> Result<()> {
    let file_name = result.repo.to_string_lossy().replace(['/', '\\'], "_");
    let path = dir.join(format!("{file_name}.stdout.log"));
    std::fs::write(&path, &result.stdout).map_err(io_err(path))
}

#[cfg(test)]
#[path = "parallel_tests.rs"]
mod tests;
