// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! C16 WatchMultiplexer: parallel long-running children with line-prefixed,
//! arrival-ordered merged output and signal-propagated shutdown (spec.md
//! §4.15).

use crate::signal;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Default bound on the merged output queue; unspecified by spec.md §9
/// ("deliberately implementer's choice"), chosen to absorb a short stdout
/// burst from any one child without unbounded memory growth.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Suggested (non-enforced) ceiling on concurrent watchers, per spec.md §9.
pub const WATCHER_WARNING_THRESHOLD: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildState {
    Spawning,
    Running,
    Terminating,
    Stopped,
}

#[derive(Debug, Clone)]
pub struct WatchLine {
    pub repo: PathBuf,
    pub text: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WatchSummary {
    pub total: usize,
    pub force_killed: usize,
    pub self_exited: usize,
}

/// Spawn one watcher child per repo, merge their stdout+stderr lines
/// (tagged and arrival-ordered) into `on_line`, and run until `cancel`
/// fires. On cancellation: SIGTERM every still-running child, give each up
/// to [`signal::GRACE_PERIOD`], SIGKILL survivors, drain the queue for up to
/// 2s, then return a summary.
pub async fn run(
    root: &Path,
    repos: &[PathBuf],
    program: &str,
    args: &[String],
    queue_capacity: usize,
    cancel: CancellationToken,
    mut on_line: impl FnMut(&WatchLine),
) -> WatchSummary {
    let (tx, mut rx) = mpsc::channel::<WatchLine>(queue_capacity.max(1));
    let force_killed = Arc::new(AtomicUsize::new(0));
    let self_exited = Arc::new(AtomicUsize::new(0));

    let mut child_tasks = Vec::with_capacity(repos.len());
    for repo in repos {
        let repo = repo.clone();
        let cwd = root.join(&repo);
        let program = program.to_string();
        let args = args.to_vec();
        let tx = tx.clone();
        let cancel = cancel.clone();
        let force_killed = force_killed.clone();
        let self_exited = self_exited.clone();
        child_tasks.push(tokio::spawn(async move {
            watch_one(repo, cwd, program, args, tx, cancel, force_killed, self_exited).await
        }));
    }
    drop(tx);

    let writer = tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            on_line(&line);
        }
    });

    for task in child_tasks {
        let _ = task.await;
    }

    // Drain whatever's left for up to 2s; the writer task exits on its own
    // once every producer has dropped its sender (all children have ended).
    let _ = tokio::time::timeout(std::time::Duration::from_secs(2), writer).await;

    WatchSummary {
        total: repos.len(),
        force_killed: force_killed.load(Ordering::Relaxed),
        self_exited: self_exited.load(Ordering::Relaxed),
    }
}

async fn watch_one(
    repo: PathBuf,
    cwd: PathBuf,
    program: String,
    args: Vec<String>,
    tx: mpsc::Sender<WatchLine>,
    cancel: CancellationToken,
    force_killed: Arc<AtomicUsize>,
    self_exited: Arc<AtomicUsize>,
) {
    let spawned = Command::new(&program)
        .args(&args)
        .current_dir(&cwd)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn();

    let mut child = match spawned {
        Ok(child) => child,
        Err(e) => {
            let _ = tx.send(WatchLine { repo, text: format!("failed to start: {e}") }).await;
            return;
        }
    };

    let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
        let _ = tx.send(WatchLine { repo, text: "child stdout/stderr was not piped".into() }).await;
        return;
    };

    let stdout_repo = repo.clone();
    let stdout_tx = tx.clone();
    let stdout_task = tokio::spawn(async move { pump_lines(stdout, stdout_repo, stdout_tx).await });
    let stderr_task = tokio::spawn(async move { pump_lines(stderr, repo.clone(), tx).await });

    tokio::select! {
        status = child.wait() => {
            if !matches!(status, Ok(s) if s.success()) {
                self_exited.fetch_add(1, Ordering::Relaxed);
            }
        }
        _ = cancel.cancelled() => {
            let terminated_quickly = tokio::time::timeout(signal::GRACE_PERIOD, child.wait()).await.is_ok();
            if !terminated_quickly {
                signal::terminate(&mut child).await;
                force_killed.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    let _ = stdout_task.await;
    let _ = stderr_task.await;
}

/// Read `pipe` line by line, tagging and forwarding each to the merged
/// queue. Invalid UTF-8 is coerced with the replacement character rather
/// than failing the watcher (spec.md §9 open question (b)).
async fn pump_lines<R: tokio::io::AsyncRead + Unpin>(pipe: R, repo: PathBuf, tx: mpsc::Sender<WatchLine>) {
    let mut lines = BufReader::new(pipe).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(text)) => {
                if tx.send(WatchLine { repo: repo.clone(), text }).await.is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(_) => break,
        }
    }
}

/// Format one merged line for terminal output: `[<repo>] <line>`, with
/// optional fixed-width padding of the repo tag and optional ANSI color.
pub fn format_line(line: &WatchLine, pad_width: Option<usize>, color: Option<u8>) -> String {
    let repo = line.repo.to_string_lossy();
    let tag = match pad_width {
        Some(width) => format!("{repo:<width$}"),
        None => repo.to_string(),
    };
    match color {
        Some(code) if color_enabled() => format!("\x1b[38;5;{code}m[{tag}]\x1b[0m {}", line.text),
        _ => format!("[{tag}] {}", line.text),
    }
}

/// Deterministically assign a stable ANSI 256-color index to each repo by
/// hashing its path, so the same repo always gets the same color across a
/// run (spec.md §4.15 "stable assignment").
pub fn color_for(repo: &Path, palette: &[u8]) -> u8 {
    if palette.is_empty() {
        return 7;
    }
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in repo.to_string_lossy().bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x100000001b3);
    }
    palette[(hash as usize) % palette.len()]
}

/// Color is auto-disabled when stdout is not a terminal or `NO_COLOR` is
/// set, per spec.md §4.15.
pub fn color_enabled() -> bool {
    use std::io::IsTerminal;
    std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
