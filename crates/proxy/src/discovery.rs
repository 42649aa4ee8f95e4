// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! C11 ProxyInitializer + Discovery: `init --proxy-mode` and the subtree
//! scan that finds sub-repositories (spec.md §4.10).
//!
//! A "sub-repository" is any directory, at or below the proxy root, that
//! itself contains a `.code-indexer` directory (its own activation marker).
//! The proxy's own `.code-indexer` is excluded. Symlinks are resolved and a
//! visited-inode set guards against cycles; nested proxies (an ancestor of
//! the root that is itself a proxy) are rejected outright.

use crate::error::{io_err, ProxyError, Result};
use cidx_core::ProxyConfig;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const MARKER_DIR: &str = ".code-indexer";
pub const CONFIG_FILE: &str = "config.json";
const PROXY_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Walk `root`'s subtree for `.code-indexer` markers other than the root's
/// own, returning paths relative to `root` in sorted order.
pub fn discover_repos(root: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut visited = HashSet::new();
    walk(root, root, &mut visited, &mut found)?;
    found.sort();
    found.dedup();
    Ok(found)
}

fn walk(root: &Path, dir: &Path, visited: &mut HashSet<PathBuf>, found: &mut Vec<PathBuf>) -> Result<()> {
    let canonical = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
    if !visited.insert(canonical) {
        return Ok(());
    }

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(io_err(dir.to_path_buf())(e)),
    };

    for entry in entries {
        let entry = entry.map_err(io_err(dir.to_path_buf()))?;
        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(ft) => ft,
            Err(_) => continue,
        };
        let is_dir = if file_type.is_symlink() {
            path.metadata().map(|m| m.is_dir()).unwrap_or(false)
        } else {
            file_type.is_dir()
        };
        if !is_dir {
            continue;
        }

        let name = entry.file_name();
        if name == MARKER_DIR {
            continue;
        }

        if path.join(MARKER_DIR).is_dir() && path != root {
            if let Ok(relative) = path.strip_prefix(root) {
                found.push(relative.to_path_buf());
            }
            // Don't recurse into a discovered repo; nested repos inside a
            // sub-repository are that sub-repository's own business.
            continue;
        }

        walk(root, &path, visited, found)?;
    }

    Ok(())
}

/// Reject initialization if any ancestor of `root` is already a proxy.
pub fn reject_nested_proxy(root: &Path) -> Result<()> {
    let mut current = root.parent();
    while let Some(dir) = current {
        if dir.join(MARKER_DIR).join(CONFIG_FILE).is_file() {
            return Err(ProxyError::NestedProxy(root.to_path_buf(), dir.to_path_buf()));
        }
        current = dir.parent();
    }
    Ok(())
}

/// Run `init --proxy-mode` at `root`: reject nesting, discover sub-repos,
/// write `<root>/.code-indexer/config.json` atomically.
pub fn init_proxy_mode(root: &Path, now: chrono::DateTime<chrono::Utc>) -> Result<ProxyConfig> {
    reject_nested_proxy(root)?;
    let repos = discover_repos(root)?;
    let config = ProxyConfig::new(repos, PROXY_VERSION, now);
    write_config(root, &config)?;
    Ok(config)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(MARKER_DIR).join(CONFIG_FILE)
}

pub fn write_config(root: &Path, config: &ProxyConfig) -> Result<()> {
    let marker_dir = root.join(MARKER_DIR);
    std::fs::create_dir_all(&marker_dir).map_err(io_err(marker_dir.clone()))?;
    cidx_storage::atomic::write_atomic_json(&config_path(root), config)?;
    Ok(())
}

pub fn load_config(root: &Path) -> Result<ProxyConfig> {
    let path = config_path(root);
    let bytes = std::fs::read(&path).map_err(|_| ProxyError::NotAProxy(root.to_path_buf()))?;
    serde_json::from_slice(&bytes).map_err(ProxyError::Serialize)
}

/// Re-run discovery against an existing proxy config, e.g. for `fix-config`,
/// preserving `created_at` and bumping nothing but the repo list.
pub fn refresh_config(root: &Path) -> Result<ProxyConfig> {
    let mut config = load_config(root)?;
    config.discovered_repos = discover_repos(root)?;
    config.discovered_repos.sort();
    write_config(root, &config)?;
    Ok(config)
}

/// Find the nearest proxy root at or above `start`, the same way a VCS finds
/// its repository root: walk ancestors looking for `.code-indexer/config.json`.
pub fn find_proxy_root(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        if config_path(dir).is_file() {
            return Some(dir.to_path_buf());
        }
        current = dir.parent();
    }
    None
}

#[cfg(test)]
#[path = "discovery_tests.rs"]
mod tests;
