// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! Generic per-repo fan-out with independent outputs (spec.md §4.12),
//! used for every proxy command that is neither sequential, query, nor
//! watch — `status` being the concrete example in spec.md §6.

use crate::commands::{child_program, load_rooted_config};
use crate::error_formatter;
use crate::exit_error::{ExitError, EXIT_FAILURE, EXIT_INTERRUPTED, EXIT_SUCCESS};
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

    let results = cidx_proxy::parallel::run(&root, &config.discovered_repos, &program, &full_args, cancel.clone()).await;
    ctrl_c_task.abort();

    for result in &results {
        if result.succeeded() {
            println!("{}", error_formatter::format_success(&result.repo, command));
            if !result.stdout.is_empty() {
                print!("{}", result.stdout);
            }
        } else {
            let hint = error_formatter::query_hint(command, &result.repo);
            println!("{}", error_formatter::format_failure(&result.repo, command, result, hint.as_deref()));
        }
    }

    if cancel.is_cancelled() {
        Ok(EXIT_INTERRUPTED)
    } else if results.iter().all(|r| r.succeeded()) {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_FAILURE)
    }
}
