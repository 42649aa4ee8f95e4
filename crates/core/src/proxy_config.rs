// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! Proxy mode configuration (spec.md §3 "ProxyConfig", §4.11
//! ProxyInitializer+Discovery).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub proxy_mode: bool,
    /// Relative, sorted paths to discovered sub-repositories.
    pub discovered_repos: Vec<PathBuf>,
    pub version: String,
    pub created_at: DateTime<Utc>,
}

impl ProxyConfig {
    pub fn new(discovered_repos: Vec<PathBuf>, version: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        let mut discovered_repos = discovered_repos;
        discovered_repos.sort();
        Self { proxy_mode: true, discovered_repos, version: version.into(), created_at }
    }

    pub fn repo_count(&self) -> usize {
        self.discovered_repos.len()
    }
}

#[cfg(test)]
#[path = "proxy_config_tests.rs"]
mod tests;
