// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("io error at {path}: {source}")]
    Io { path: PathBuf, #[source] source: std::io::Error },

    #[error(transparent)]
    Serialize(#[from] serde_json::Error),

    #[error("{0} is already inside a proxy workspace rooted at {1}")]
    NestedProxy(PathBuf, PathBuf),

    #[error("{0} is not a proxy workspace (no .code-indexer/config.json)")]
    NotAProxy(PathBuf),

    #[error("unknown command {0:?}")]
    UnknownCommand(String),

    #[error("no sub-repositories discovered under {0}")]
    NoRepositories(PathBuf),
}

pub type Result<T> = std::result::Result<T, ProxyError>;

pub fn io_err(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> ProxyError {
    let path = path.into();
    move |source| ProxyError::Io { path, source }
}
