// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! `watch`: merged, multiplexed output across every repo's long-running
//! child, with SIGTERM→grace→SIGKILL shutdown and a double-Ctrl-C force
//! exit (spec.md §4.15).

use crate::commands::{child_program, load_rooted_config};
use crate::exit_error::{ExitError, EXIT_INTERRUPTED, EXIT_SUCCESS};
use cidx_proxy::watch::{self, WatchLine, DEFAULT_QUEUE_CAPACITY, WATCHER_WARNING_THRESHOLD};
use tokio_util::sync::CancellationToken;

pub async fn run(start_dir: &std::path::Path, args: &[String]) -> Result<i32, ExitError> {
    let (root, config) = load_rooted_config(start_dir)?;
    if config.discovered_repos.is_empty() {
        println!("No sub-repositories discovered; nothing to do");
        return Ok(EXIT_SUCCESS);
    }
    if config.repo_count() > WATCHER_WARNING_THRESHOLD {
        eprintln!("warning: watching {} repositories at once may be noisy", config.repo_count());
    }

    let cancel = CancellationToken::new();
    let pad_width = config.discovered_repos.iter().map(|r| r.to_string_lossy().len()).max();
    let palette: Vec<u8> = (1..=6).collect();

    let first_ctrl_c_cancel = cancel.clone();
    let sigint_task = tokio::spawn(async move {
        // First Ctrl-C asks for a graceful shutdown; a second forces the
        // process down immediately regardless of in-flight cleanup.
        let _ = tokio::signal::ctrl_c().await;
        first_ctrl_c_cancel.cancel();
        let _ = tokio::signal::ctrl_c().await;
        eprintln!("\nforced exit on second interrupt");
        std::process::exit(1);
    });

    let mut full_args = vec!["watch".to_string()];
    full_args.extend_from_slice(args);
    let program = child_program();

    let summary = watch::run(&root, &config.discovered_repos, &program, &full_args, DEFAULT_QUEUE_CAPACITY, cancel.clone(), |line: &WatchLine| {
        let color = if watch::color_enabled() { Some(watch::color_for(&line.repo, &palette)) } else { None };
        println!("{}", watch::format_line(line, pad_width, color));
    })
    .await;

    sigint_task.abort();

    println!(
        "\n{} watchers, {} force-killed, {} self-exited",
        summary.total, summary.force_killed, summary.self_exited
    );

    if cancel.is_cancelled() {
        Ok(EXIT_INTERRUPTED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}
