// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! C15 QueryAggregator: score-ordered merge of per-repo query results with a
//! global top-K limit (spec.md §4.14, §8 "round-trip & idempotence laws").
//!
//! Each repo's child process is expected to emit a JSON array of result
//! objects on stdout, each carrying a numeric `score` field; everything
//! else in the object is opaque payload that rides along untouched.

use crate::parallel::ExecutionResult;
use serde_json::Value;
use std::cmp::Ordering;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct QueryHit {
    pub source_repo: PathBuf,
    pub score: f64,
    /// Position within this repo's own result list, used only to break ties
    /// deterministically once score and repo are equal.
    pub ordinal: usize,
    pub payload: Value,
}

#[derive(Debug, Clone)]
pub struct QueryError {
    pub repo: PathBuf,
    pub message: String,
    pub hint: String,
}

#[derive(Debug, Clone, Default)]
pub struct QueryOutcome {
    pub hits: Vec<QueryHit>,
    pub errors: Vec<QueryError>,
}

/// Parse one repo's raw stdout into tagged hits, or a [`QueryError`] with an
/// actionable hint if the child failed or its output could not be parsed.
pub fn parse_result(repo: &PathBuf, result: &ExecutionResult) -> Result<Vec<QueryHit>, QueryError> {
    if !result.succeeded() {
        let first_line = result.stderr.lines().next().unwrap_or("query failed").to_string();
        return Err(QueryError {
            repo: repo.clone(),
            message: first_line,
            hint: format!("use grep in {}", repo.display()),
        });
    }

    let parsed: Vec<Value> = serde_json::from_str(&result.stdout).map_err(|e| QueryError {
        repo: repo.clone(),
        message: format!("malformed query output: {e}"),
        hint: format!("use grep in {}", repo.display()),
    })?;

    Ok(parsed
        .into_iter()
        .enumerate()
        .map(|(ordinal, payload)| {
            let score = payload.get("score").and_then(Value::as_f64).unwrap_or(0.0);
            QueryHit { source_repo: repo.clone(), score, ordinal, payload }
        })
        .collect())
}

/// Merge every repo's parsed hits (or tagged error) into one globally
/// score-ordered list, then truncate to `limit` (0 or `None` ⇒ untruncated).
pub fn merge(per_repo: Vec<Result<Vec<QueryHit>, QueryError>>, limit: Option<usize>) -> QueryOutcome {
    let mut hits = Vec::new();
    let mut errors = Vec::new();

    for result in per_repo {
        match result {
            Ok(mut repo_hits) => hits.append(&mut repo_hits),
            Err(e) => errors.push(e),
        }
    }

    hits.sort_by(|a, b| {
        score_desc(a.score, b.score).then_with(|| a.source_repo.cmp(&b.source_repo)).then_with(|| a.ordinal.cmp(&b.ordinal))
    });

    if let Some(limit) = limit {
        if limit > 0 {
            hits.truncate(limit);
        }
    }

    QueryOutcome { hits, errors }
}

fn score_desc(a: f64, b: f64) -> Ordering {
    // NaN sorts last regardless of direction; total_cmp then reversed gives
    // descending score with NaN at the bottom.
    b.total_cmp(&a)
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
