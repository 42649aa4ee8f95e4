// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! C12 CommandRouter: classifies an incoming proxy command into one of the
//! four execution strategies (spec.md §4.11).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandClass {
    /// Resource-lifecycle ops: one repository at a time.
    Sequential,
    /// Fan-out with score-ordered, globally-limited merge.
    Query,
    /// Parallel long-running processes with multiplexed output.
    Watch,
    /// Fan-out, independent per-repo outputs.
    Parallel,
}

const SEQUENTIAL: &[&str] = &["start", "stop", "uninstall"];
const QUERY: &[&str] = &["query", "search", "omni-search"];
const WATCH: &[&str] = &["watch"];

/// Classify `command` (the first positional CLI argument after the proxy's
/// own subcommand dispatch, e.g. `"query"`, `"status"`, `"start"`).
pub fn classify(command: &str) -> CommandClass {
    if SEQUENTIAL.contains(&command) {
        CommandClass::Sequential
    } else if QUERY.contains(&command) {
        CommandClass::Query
    } else if WATCH.contains(&command) {
        CommandClass::Watch
    } else {
        CommandClass::Parallel
    }
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
