// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("io error at {path}: {source}")]
    Io { path: PathBuf, #[source] source: std::io::Error },

    #[error(transparent)]
    Storage(#[from] cidx_storage::StorageError),

    #[error("another daemon already holds the lock at {0}")]
    AlreadyRunning(PathBuf),

    #[error("recovery phase {0:?} has an unknown or circular dependency")]
    InvalidPhaseGraph(String),

    #[error("recovery phase {phase} failed: {reason}")]
    PhaseFailed { phase: String, reason: String },

    #[error("job {0} not found")]
    JobNotFound(cidx_core::JobId),

    #[error(transparent)]
    Protocol(#[from] crate::protocol::ProtocolError),
}

pub type Result<T> = std::result::Result<T, DaemonError>;

pub fn io_err(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> DaemonError {
    let path = path.into();
    move |source| DaemonError::Io { path, source }
}
