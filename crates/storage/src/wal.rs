// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! C2 WriteAheadLog: append-only JSONL durability log for every domain
//! mutation, replayed on startup to rebuild [`crate::state::MaterializedState`]
//! from the last snapshot (spec.md §4.2).
//!
//! Corrupt or binary trailing data is treated as evidence of a torn write:
//! the offending bytes are archived to a rotated `.bak` file (see
//! [`crate::rotate`]) and the live log is rewritten with only the entries
//! that parsed cleanly.

use crate::error::{io_err, Result, StorageError};
use crate::rotate::rotate_bak_path;
use chrono::Utc;
use cidx_core::{Event, EventRecord};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// spec.md §4.2: a checkpoint (snapshot + WAL truncation) is triggered by
/// 100 appended ops, OR 5 minutes since the last checkpoint, OR the WAL
/// reaching 10 MiB — whichever comes first.
const CHECKPOINT_OP_THRESHOLD: u32 = 100;
const CHECKPOINT_BYTE_THRESHOLD: u64 = 10 * 1024 * 1024;
const CHECKPOINT_INTERVAL: Duration = Duration::from_secs(300);

pub struct Wal {
    path: PathBuf,
    writer: File,
    reader: BufReader<File>,
    write_seq: u64,
    processed_seq: u64,
    ops_since_checkpoint: u32,
    bytes_since_checkpoint: u64,
    last_checkpoint: Instant,
}

/// Parse every line in `bytes` as an [`EventRecord`] up to the first line
/// that fails to decode (invalid UTF-8 or invalid JSON). Returns the valid
/// entries plus whether parsing stopped before reaching the end of input.
fn parse_lines(bytes: &[u8]) -> (Vec<EventRecord>, bool) {
    let mut entries = Vec::new();
    let mut truncated = false;
    for line in bytes.split(|b| *b == b'\n') {
        if line.is_empty() {
            continue;
        }
        match std::str::from_utf8(line) {
            Ok(text) => match serde_json::from_str::<EventRecord>(text) {
                Ok(entry) => entries.push(entry),
                Err(_) => {
                    truncated = true;
                    break;
                }
            },
            Err(_) => {
                truncated = true;
                break;
            }
        }
    }
    (entries, truncated)
}

fn serialize_entries(entries: &[EventRecord]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for entry in entries {
        serde_json::to_writer(&mut out, entry).map_err(StorageError::Serialize)?;
        out.push(b'\n');
    }
    Ok(out)
}

impl Wal {
    /// Open (or create) the log at `path`. `processed_seq` is the WAL
    /// sequence number already folded into the last loaded snapshot;
    /// [`Wal::next_unprocessed`] and [`Wal::entries_after`] skip entries at
    /// or below it.
    pub fn open(path: impl AsRef<Path>, processed_seq: u64) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let raw = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(io_err(path.clone())(e)),
        };

        let (entries, corrupted) = parse_lines(&raw);
        if corrupted {
            let bak_path = rotate_bak_path(&path);
            fs::write(&bak_path, &raw).map_err(io_err(bak_path.clone()))?;
            let clean = serialize_entries(&entries)?;
            fs::write(&path, &clean).map_err(io_err(path.clone()))?;
        } else if !path.exists() {
            fs::write(&path, []).map_err(io_err(path.clone()))?;
        }

        let write_seq = entries.last().map(|e| e.sequence).unwrap_or(0);

        let writer = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(io_err(path.clone()))?;
        let reader = BufReader::new(File::open(&path).map_err(io_err(path.clone()))?);

        Ok(Self {
            path,
            writer,
            reader,
            write_seq,
            processed_seq,
            ops_since_checkpoint: 0,
            bytes_since_checkpoint: 0,
            last_checkpoint: Instant::now(),
        })
    }

    pub fn write_seq(&self) -> u64 {
        self.write_seq
    }

    pub fn processed_seq(&self) -> u64 {
        self.processed_seq
    }

    /// Append an event, assigning it the next sequence number, and flush it
    /// to disk before returning (spec.md §4.2: "every append is flushed
    /// before acknowledgment").
    pub fn append(&mut self, event: &Event) -> Result<u64> {
        self.write_seq += 1;
        let record = EventRecord::new(self.write_seq, Utc::now(), event.clone());
        let mut line = serde_json::to_vec(&record).map_err(StorageError::Serialize)?;
        line.push(b'\n');
        self.writer.write_all(&line).map_err(io_err(self.path.clone()))?;
        self.flush()?;
        self.ops_since_checkpoint += 1;
        self.bytes_since_checkpoint += line.len() as u64;
        Ok(self.write_seq)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(io_err(self.path.clone()))?;
        self.writer.sync_data().map_err(io_err(self.path.clone()))?;
        Ok(())
    }

    /// Whether appends since the last checkpoint have crossed the op-count,
    /// byte-size, or time-since-last-checkpoint threshold (spec.md §4.2).
    pub fn needs_checkpoint(&self) -> bool {
        self.ops_since_checkpoint >= CHECKPOINT_OP_THRESHOLD
            || self.bytes_since_checkpoint >= CHECKPOINT_BYTE_THRESHOLD
            || self.last_checkpoint.elapsed() >= CHECKPOINT_INTERVAL
    }

    /// Reset the checkpoint thresholds' counters. Called once a checkpoint
    /// (snapshot + truncation) has completed.
    pub fn mark_checkpointed(&mut self) {
        self.ops_since_checkpoint = 0;
        self.bytes_since_checkpoint = 0;
        self.last_checkpoint = Instant::now();
    }

    /// Read the next entry after `processed_seq` from the sequential cursor.
    /// Returns `Ok(None)` at end-of-file or when the next line fails to
    /// parse — a corrupt line is consumed (the cursor advances past it) but
    /// never surfaced as an error, matching the WAL's general tolerance for
    /// a single torn write.
    pub fn next_unprocessed(&mut self) -> Result<Option<EventRecord>> {
        loop {
            let mut line = String::new();
            let read = self.reader.read_line(&mut line).map_err(io_err(self.path.clone()))?;
            if read == 0 {
                return Ok(None);
            }
            let trimmed = line.trim_end_matches('\n');
            if trimmed.is_empty() {
                continue;
            }
            let entry: EventRecord = match serde_json::from_str(trimmed) {
                Ok(entry) => entry,
                Err(_) => return Ok(None),
            };
            if entry.sequence <= self.processed_seq {
                continue;
            }
            return Ok(Some(entry));
        }
    }

    pub fn mark_processed(&mut self, seq: u64) {
        if seq > self.processed_seq {
            self.processed_seq = seq;
        }
    }

    /// Entries with sequence greater than `after_seq`, scanned from the
    /// start of the log. Stops (without error) at the first entry that
    /// fails to parse.
    pub fn entries_after(&self, after_seq: u64) -> Result<Vec<EventRecord>> {
        let raw = fs::read(&self.path).map_err(io_err(self.path.clone()))?;
        let (entries, _truncated) = parse_lines(&raw);
        Ok(entries.into_iter().filter(|e| e.sequence > after_seq).collect())
    }

    /// Drop entries with sequence less than `seq`, rewriting the log in
    /// place. Used after a snapshot makes those entries redundant.
    pub fn truncate_before(&mut self, seq: u64) -> Result<()> {
        let kept = self.entries_after(seq.saturating_sub(1))?;
        let bytes = serialize_entries(&kept)?;
        crate::atomic::write_atomic(&self.path, &bytes)?;
        self.writer = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_err(self.path.clone()))?;
        self.reader = BufReader::new(File::open(&self.path).map_err(io_err(self.path.clone()))?);
        Ok(())
    }
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
