// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! `cidx init --proxy-mode` (spec.md §4.10).

use crate::exit_error::{ExitError, EXIT_SUCCESS};
use std::path::Path;

pub fn run(root: &Path) -> Result<i32, ExitError> {
    let config = cidx_proxy::init_proxy_mode(root, chrono::Utc::now())?;
    println!("Initialized proxy workspace at {}", root.display());
    println!("Discovered {} sub-repositories:", config.repo_count());
    for repo in &config.discovered_repos {
        println!("  {}", repo.display());
    }
    Ok(EXIT_SUCCESS)
}
