// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! Shared child-process termination helper for C13/C14/C16: SIGTERM, a
//! grace period, then SIGKILL (spec.md §4.15, §5 "Cancellation").

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::time::Duration;
use tokio::process::Child;

pub const GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Send SIGTERM to `child`, give it [`GRACE_PERIOD`] to exit on its own,
/// then SIGKILL if it hasn't. Returns once the child has exited.
pub async fn terminate(child: &mut Child) {
    let Some(pid) = child.id() else {
        return;
    };
    let _ = kill(Pid::from_raw(pid as i32), Signal::SIGTERM);

    if tokio::time::timeout(GRACE_PERIOD, child.wait()).await.is_ok() {
        return;
    }

    let _ = kill(Pid::from_raw(pid as i32), Signal::SIGKILL);
    let _ = child.wait().await;
}
