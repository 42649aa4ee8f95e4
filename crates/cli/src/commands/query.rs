// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! `query` (and its equivalents `search`, `omni-search`): fan out with a
//! shared `--limit`, then merge by descending score (spec.md §4.14).

use crate::commands::{child_program, load_rooted_config};
use crate::exit_error::{ExitError, EXIT_FAILURE, EXIT_INTERRUPTED, EXIT_SUCCESS};
use cidx_proxy::query::{self, QueryHit};
use tokio_util::sync::CancellationToken;

pub async fn run(start_dir: &std::path::Path, command: &str, limit: Option<usize>, args: &[String]) -> Result<i32, ExitError> {
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
    if let Some(limit) = limit {
        full_args.push("--limit".to_string());
        full_args.push(limit.to_string());
    }
    full_args.extend_from_slice(args);
    let program = child_program();

    let results = cidx_proxy::parallel::run(&root, &config.discovered_repos, &program, &full_args, cancel.clone()).await;
    ctrl_c_task.abort();

    let per_repo = results.iter().map(|result| query::parse_result(&result.repo, result)).collect();
    let outcome = query::merge(per_repo, limit);

    print_hits(&outcome.hits);
    for error in &outcome.errors {
        println!("✗ {} ({command}): {}\n  hint: {}", error.repo.display(), error.message, error.hint);
    }
    println!("\n{} hits, {} repos with errors", outcome.hits.len(), outcome.errors.len());

    if cancel.is_cancelled() {
        Ok(EXIT_INTERRUPTED)
    } else if outcome.errors.is_empty() {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_FAILURE)
    }
}

fn print_hits(hits: &[QueryHit]) {
    let rendered: Vec<serde_json::Value> = hits
        .iter()
        .map(|hit| {
            serde_json::json!({
                "source_repo": hit.source_repo,
                "score": hit.score,
                "payload": hit.payload,
            })
        })
        .collect();
    if let Ok(text) = serde_json::to_string_pretty(&rendered) {
        println!("{text}");
    }
}
