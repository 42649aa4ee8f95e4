// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("io error at {path}: {source}")]
    Io { path: PathBuf, #[source] source: std::io::Error },

    #[error("failed to serialize entry: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("lock {repository} is held by job {holder}")]
    LockHeld { repository: String, holder: String },

    #[error("lock {repository} not found")]
    LockNotFound { repository: String },
}

pub type Result<T> = std::result::Result<T, StorageError>;

pub(crate) fn io_err(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> StorageError {
    let path = path.into();
    move |source| StorageError::Io { path, source }
}
