// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! C17 error taxonomy: every failure mode the bridge can hit maps onto one
//! of the fixed JSON-RPC 2.0 error codes in spec.md §4.16/§7. Messages are
//! single-line and never echo a token.

use cidx_wire::error_code;

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("method not found: {0}")]
    MethodNotFound(String),

    #[error("invalid params: {0}")]
    InvalidParams(String),

    #[error("internal error: {0}")]
    Internal(String),

    /// Transport, auth, and upstream failures all share `-32000`
    /// ("server error") per spec.md §4.16.
    #[error("server error: {0}")]
    Server(String),
}

impl BridgeError {
    pub fn code(&self) -> i64 {
        match self {
            BridgeError::Parse(_) => error_code::PARSE_ERROR,
            BridgeError::InvalidRequest(_) => error_code::INVALID_REQUEST,
            BridgeError::MethodNotFound(_) => error_code::METHOD_NOT_FOUND,
            BridgeError::InvalidParams(_) => error_code::INVALID_PARAMS,
            BridgeError::Internal(_) => error_code::INTERNAL_ERROR,
            BridgeError::Server(_) => error_code::SERVER_ERROR,
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        BridgeError::Server(message.into())
    }

    pub fn transport(message: impl Into<String>) -> Self {
        BridgeError::Server(message.into())
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
