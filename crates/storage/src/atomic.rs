// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! C1 AtomicWriter: crash-safe replacement of a file's contents.
//!
//! Writes go to a sibling temp file, `fsync`'d and renamed over the target
//! so a reader never observes a partially written file. A startup sweep
//! removes abandoned temp files left behind by a process that crashed
//! between the write and the rename.

use crate::error::{io_err, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Temp files older than this, found during [`sweep_stale_temp_files`], are
/// considered abandoned by a crashed writer and removed.
pub const STALE_TEMP_FILE_AGE: Duration = Duration::from_secs(600);

/// Write `contents` to `path` atomically: write-temp, flush, fsync, rename.
/// On any failure the temp file is removed best-effort (spec.md §4.1)
/// rather than left for the startup sweeper.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let tmp_path = temp_path_for(path);
    if let Err(e) = write_temp(&tmp_path, contents) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }
    if let Err(e) = fs::rename(&tmp_path, path).map_err(io_err(path.to_path_buf())) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }
    Ok(())
}

fn write_temp(tmp_path: &Path, contents: &[u8]) -> Result<()> {
    let mut file = File::create(tmp_path).map_err(io_err(tmp_path.to_path_buf()))?;
    file.write_all(contents).map_err(io_err(tmp_path.to_path_buf()))?;
    file.sync_all().map_err(io_err(tmp_path.to_path_buf()))?;
    Ok(())
}

/// Serialize `value` as JSON and write it atomically to `path`.
pub fn write_atomic_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value).map_err(crate::error::StorageError::Serialize)?;
    write_atomic(path, &bytes)
}

fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("file");
    let pid = std::process::id();
    let nonce = nanoid::nanoid!(8);
    path.with_file_name(format!("{file_name}.tmp.{pid}.{nonce}"))
}

/// Remove `*.tmp.*` siblings of `path`'s pattern in `dir` older than
/// [`STALE_TEMP_FILE_AGE`]. Run once at daemon startup before any durable
/// state is loaded.
pub fn sweep_stale_temp_files(dir: &Path) -> Result<usize> {
    let mut removed = 0;
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(io_err(dir.to_path_buf())(e)),
    };
    for entry in entries {
        let entry = entry.map_err(io_err(dir.to_path_buf()))?;
        let path = entry.path();
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => continue,
        };
        if !name.contains(".tmp.") {
            continue;
        }
        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(_) => continue,
        };
        let age = metadata.modified().ok().and_then(|m| SystemTime::now().duration_since(m).ok());
        if age.map(|a| a >= STALE_TEMP_FILE_AGE).unwrap_or(false) {
            if fs::remove_file(&path).is_ok() {
                removed += 1;
            }
        }
    }
    Ok(removed)
}

#[cfg(test)]
#[path = "atomic_tests.rs"]
mod tests;
