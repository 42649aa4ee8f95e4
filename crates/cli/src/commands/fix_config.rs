// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! `cidx fix-config`: re-run discovery against an existing proxy config
//! (spec.md §6, grounded in C11's `refresh_config`).

use crate::exit_error::{ExitError, EXIT_SUCCESS};
use std::path::Path;

pub fn run(start: &Path) -> Result<i32, ExitError> {
    let root = cidx_proxy::find_proxy_root(start)
        .ok_or_else(|| ExitError::usage(format!("{} is not inside a proxy workspace", start.display())))?;
    let config = cidx_proxy::refresh_config(&root)?;
    println!("Refreshed {} — {} sub-repositories:", root.display(), config.repo_count());
    for repo in &config.discovered_repos {
        println!("  {}", repo.display());
    }
    Ok(EXIT_SUCCESS)
}
