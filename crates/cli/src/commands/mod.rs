// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! Proxy-mode command handlers (spec.md §6 "CLI surface (proxy)").

pub mod daemon;
pub mod fix_config;
pub mod init;
pub mod parallel;
pub mod query;
pub mod sequential;
pub mod watch;

use crate::exit_error::ExitError;
use cidx_core::ProxyConfig;
use std::path::{Path, PathBuf};

/// The binary shelled out to once per discovered repository. Overridable so
/// tests (and alternative installs) can point the proxy at a stand-in
/// program instead of a real `cidx` on `PATH`.
pub fn child_program() -> String {
    std::env::var("CIDX_PROXY_CHILD_PROGRAM").unwrap_or_else(|_| "cidx".to_string())
}

/// Resolve the proxy root from `start` (the current directory by default)
/// and load its config, or fail with a usage error pointing at `init
/// --proxy-mode`.
pub fn load_rooted_config(start: &Path) -> Result<(PathBuf, ProxyConfig), ExitError> {
    let root = cidx_proxy::find_proxy_root(start)
        .ok_or_else(|| ExitError::usage(format!("{} is not inside a proxy workspace (run `cidx init --proxy-mode` first)", start.display())))?;
    let config = cidx_proxy::load_config(&root)?;
    Ok((root, config))
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
