// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! `start` / `stop` / `uninstall`: one repository at a time, continuing past
//! failure (spec.md §4.13).

use crate::commands::{child_program, load_rooted_config};
use crate::error_formatter;
use crate::exit_error::{ExitError, EXIT_FAILURE, EXIT_INTERRUPTED, EXIT_SUCCESS};
use cidx_proxy::sequential::Progress;
use tokio_util::sync::CancellationToken;

pub async fn run(start_dir: &std::path::Path, command: &str, args: &[String]) -> Result<i32, ExitError> {
    let (root, config) = load_rooted_config(start_dir)?;
    if config.discovered_repos.is_empty() {
        println!("No sub-repositories discovered; nothing to do");
        return Ok(EXIT_SUCCESS);
    }

    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    let ctrl_c_task = tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        ctrl_c_cancel.cancel();
    });

    let mut full_args = vec![command.to_string()];
    full_args.extend_from_slice(args);
    let program = child_program();

    let results = cidx_proxy::sequential::run(&root, &config.discovered_repos, &program, &full_args, cancel, |progress| match progress {
        Progress::Starting { index, total, repo } => println!("{}", error_formatter::format_progress_line(index, total, &repo, None)),
        Progress::Finished { index, total, repo, result } => println!("{}", error_formatter::format_progress_line(index, total, &repo, Some(&result))),
        Progress::Interrupted { repo } => println!("Interrupted before {}", repo.display()),
    })
    .await;

    ctrl_c_task.abort();

    let interrupted = results.iter().any(|r| r.cancelled);
    println!("\n{}", error_formatter::format_summary(command, &results));

    if interrupted {
        Ok(EXIT_INTERRUPTED)
    } else if results.iter().all(|r| r.succeeded()) {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_FAILURE)
    }
}
