// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! Shared `.bak` / `.bak.N` rotation used by the WAL's corruption handling
//! and by atomic snapshot writes.

use std::fs;
use std::path::{Path, PathBuf};

pub const MAX_BAK_FILES: u32 = 3;

/// Compute the next `.bak` path for `path`, rotating older backups out of
/// the way first. Keeps at most [`MAX_BAK_FILES`] generations.
pub fn rotate_bak_path(path: &Path) -> PathBuf {
    let bak = |n: u32| {
        if n == 1 {
            path.with_extension("bak")
        } else {
            path.with_extension(format!("bak.{n}"))
        }
    };

    let oldest = bak(MAX_BAK_FILES);
    if oldest.exists() {
        let _ = fs::remove_file(&oldest);
    }

    for n in (1..MAX_BAK_FILES).rev() {
        let src = bak(n);
        if src.exists() {
            let _ = fs::rename(&src, bak(n + 1));
        }
    }

    bak(1)
}

#[cfg(test)]
#[path = "rotate_tests.rs"]
mod tests;
