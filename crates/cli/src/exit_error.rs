// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! Carries a process exit code alongside an error message so `main()` is
//! the only place that calls `std::process::exit` (spec.md §6 "Exit
//! codes": 0 success, 1 partial/full failure, 2 invalid usage, 130
//! interrupted).

use std::fmt;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_USAGE: i32 = 2;
pub const EXIT_INTERRUPTED: i32 = 130;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, message)
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(EXIT_FAILURE, message)
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}

impl From<cidx_proxy::ProxyError> for ExitError {
    fn from(e: cidx_proxy::ProxyError) -> Self {
        ExitError::failure(e.to_string())
    }
}
