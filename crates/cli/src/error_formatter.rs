// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! C18 ErrorFormatter: one canonical layout for every user-visible error,
//! with an actionable hint where one applies (spec.md §4.17).
//!
//! Errors print to stdout (not stderr) so they interleave chronologically
//! with successes, and a final summary groups them by repository.

use cidx_proxy::ExecutionResult;
use std::path::Path;

/// Render one failed execution: `✗ <repo> (<command>): exit <code> — <first
/// stderr line>`, plus a hint line when one is supplied.
pub fn format_failure(repo: &Path, command: &str, result: &ExecutionResult, hint: Option<&str>) -> String {
    let code = result.exit_code.map(|c| c.to_string()).unwrap_or_else(|| "signal".to_string());
    let reason = result.stderr.lines().next().unwrap_or("(no output)");
    let mut out = format!("✗ {} ({command}): exit {code} — {reason}", repo.display());
    if let Some(hint) = hint {
        out.push_str(&format!("\n  hint: {hint}"));
    }
    out
}

pub fn format_success(repo: &Path, command: &str) -> String {
    format!("✓ {} ({command})", repo.display())
}

/// A `[i/N] ✓`/`✗` progress line for the sequential executor.
pub fn format_progress_line(index: usize, total: usize, repo: &Path, outcome: Option<&ExecutionResult>) -> String {
    match outcome {
        None => format!("[{index}/{total}] {}", repo.display()),
        Some(result) if result.succeeded() => format!("[{index}/{total}] ✓ {}", repo.display()),
        Some(result) => {
            let reason = result.stderr.lines().next().unwrap_or("(no output)");
            format!("[{index}/{total}] ✗ {} {reason}", repo.display())
        }
    }
}

/// Final summary block: `N succeeded, M failed`, followed by one error
/// detail line per failing repo (spec.md §4.17 "final summary block").
pub fn format_summary(command: &str, results: &[ExecutionResult]) -> String {
    let succeeded = results.iter().filter(|r| r.succeeded()).count();
    let failed = results.len() - succeeded;
    let mut lines = vec![format!("{succeeded} succeeded, {failed} failed")];
    for result in results.iter().filter(|r| !r.succeeded()) {
        lines.push(format_failure(&result.repo, command, result, query_hint(command, &result.repo).as_deref()));
    }
    lines.join("\n")
}

/// The one concrete hint this spec names: fall back to `grep` within the
/// failing repo for a failed semantic query (spec.md §4.14, §4.17).
pub fn query_hint(command: &str, repo: &Path) -> Option<String> {
    if command == "query" {
        Some(format!("use grep in {}", repo.display()))
    } else {
        None
    }
}

#[cfg(test)]
#[path = "error_formatter_tests.rs"]
mod tests;
