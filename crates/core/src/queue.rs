// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! Queue keys and queued-operation records (spec.md §3 "QueuedOperation").

use crate::job::JobId;
use serde::{Deserialize, Serialize};

/// Kind of operation a job performs against a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Query,
    Status,
    Start,
    Stop,
    Uninstall,
    Watch,
    Index,
}

crate::simple_display! {
    OperationKind {
        Query => "query",
        Status => "status",
        Start => "start",
        Stop => "stop",
        Uninstall => "uninstall",
        Watch => "watch",
        Index => "index",
    }
}

/// A queue identity: a single repository or a composite (multi-repository) alias.
///
/// Composite keys are rendered `COMPOSITE#repoA+repoB+...` with repository
/// names sorted alphabetically so the same composite alias always maps to
/// the same key regardless of the order repos were named by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueueKey(pub String);

impl QueueKey {
    pub fn single(repository: impl Into<String>) -> Self {
        Self(repository.into())
    }

    pub fn composite<I, S>(repositories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = repositories.into_iter().map(Into::into).collect();
        names.sort();
        Self(format!("COMPOSITE#{}", names.join("+")))
    }

    pub fn is_composite(&self) -> bool {
        self.0.starts_with("COMPOSITE#")
    }

    /// The member repository names, in sorted order. For a single-repo key
    /// this is the one-element slice `[repository]`.
    pub fn members(&self) -> Vec<&str> {
        if let Some(rest) = self.0.strip_prefix("COMPOSITE#") {
            rest.split('+').collect()
        } else {
            vec![self.0.as_str()]
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for QueueKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An entry in a per-repository or composite-repository wait queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuedOperation {
    pub job_id: JobId,
    pub user: String,
    pub operation: OperationKind,
    pub queued_at_ms: u64,
    /// 1-based position within its queue; recalculated on every mutation.
    pub position: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eta_ms: Option<u64>,
}

crate::builder! {
    pub struct QueuedOperationBuilder => QueuedOperation {
        into {
            user: String = "test-user",
        }
        set {
            operation: OperationKind = OperationKind::Query,
            queued_at_ms: u64 = 0,
            position: usize = 1,
        }
        option {
            eta_ms: u64 = None,
        }
        computed {
            job_id: JobId = JobId::new(),
        }
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
