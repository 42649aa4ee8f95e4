// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! Centralized environment variable access for the daemon (spec.md §6
//! "Filesystem layout").

use std::path::PathBuf;
use std::time::Duration;

/// Resolve the workspace root: `CIDX_WORKSPACE_DIR` > `XDG_STATE_HOME/cidx` >
/// `~/.local/state/cidx`.
pub fn workspace_root() -> PathBuf {
    if let Ok(dir) = std::env::var("CIDX_WORKSPACE_DIR") {
        return PathBuf::from(dir);
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return PathBuf::from(xdg).join("cidx");
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".local/state/cidx")
}

/// Unix domain socket path for CLI <-> daemon IPC.
pub fn socket_path(workspace: &std::path::Path) -> PathBuf {
    workspace.join("cidxd.sock")
}

/// PID lock file, held for the lifetime of the daemon process.
pub fn pid_lock_path(workspace: &std::path::Path) -> PathBuf {
    workspace.join("cidxd.pid.lock")
}

/// IPC request timeout, matching the CLI's expectation of a responsive daemon.
pub fn ipc_timeout() -> Duration {
    std::env::var("CIDX_IPC_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(30))
}

/// How often the sentinel heartbeat is rewritten while a job runs (spec.md §4.4: 30s).
pub fn heartbeat_interval() -> Duration {
    Duration::from_secs(30)
}

/// Grace period before an un-sentineled workspace is eligible for orphan cleanup.
pub fn orphan_grace_period() -> Duration {
    Duration::from_secs(600)
}

pub const PROTOCOL_VERSION: &str = env!("CARGO_PKG_VERSION");
