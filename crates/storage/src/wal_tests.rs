// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

use super::*;
use cidx_core::JobId;
use std::io::Write as _;
use tempfile::tempdir;

fn test_event(job_id: JobId) -> Event {
    Event::JobStarted { job_id, started_at_ms: 0 }
}

#[test]
fn open_creates_file() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("test.wal");

    let wal = Wal::open(&path, 0).expect("open");

    assert!(path.exists());
    assert_eq!(wal.write_seq(), 0);
    assert_eq!(wal.processed_seq(), 0);
}

#[test]
fn append_assigns_sequential_numbers() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("test.wal");
    let mut wal = Wal::open(&path, 0).expect("open");

    let seq1 = wal.append(&test_event(JobId::new())).expect("append1");
    let seq2 = wal.append(&test_event(JobId::new())).expect("append2");
    assert_eq!(seq1, 1);
    assert_eq!(seq2, 2);

    wal.flush().expect("flush");
    assert!(fs::metadata(&path).expect("metadata").len() > 0);
}

#[test]
fn next_unprocessed_returns_entries_in_order_then_none() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("test.wal");
    let mut wal = Wal::open(&path, 0).expect("open");

    let job1 = JobId::new();
    let job2 = JobId::new();
    wal.append(&test_event(job1)).expect("append1");
    wal.append(&test_event(job2)).expect("append2");

    let entry1 = wal.next_unprocessed().expect("read1").expect("entry1");
    assert_eq!(entry1.sequence, 1);
    let entry2 = wal.next_unprocessed().expect("read2").expect("entry2");
    assert_eq!(entry2.sequence, 2);
    assert!(wal.next_unprocessed().expect("read3").is_none());
}

#[test]
fn mark_processed_updates_processed_seq() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("test.wal");
    let mut wal = Wal::open(&path, 0).expect("open");
    wal.append(&test_event(JobId::new())).expect("append");
    wal.flush().expect("flush");

    let entry = wal.next_unprocessed().expect("read").expect("entry");
    wal.mark_processed(entry.sequence);
    assert_eq!(wal.processed_seq(), 1);
}

#[test]
fn reopen_with_processed_seq_skips_already_processed() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("test.wal");
    {
        let mut wal = Wal::open(&path, 0).expect("open");
        wal.append(&test_event(JobId::new())).expect("append1");
        wal.append(&test_event(JobId::new())).expect("append2");
        wal.append(&test_event(JobId::new())).expect("append3");
        wal.flush().expect("flush");
    }

    let mut wal = Wal::open(&path, 2).expect("reopen");
    let entry = wal.next_unprocessed().expect("read").expect("entry");
    assert_eq!(entry.sequence, 3);
    assert!(wal.next_unprocessed().expect("read2").is_none());
}

#[test]
fn entries_after_returns_only_newer_entries() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("test.wal");
    let mut wal = Wal::open(&path, 0).expect("open");
    wal.append(&test_event(JobId::new())).expect("append1");
    wal.append(&test_event(JobId::new())).expect("append2");
    wal.append(&test_event(JobId::new())).expect("append3");
    wal.flush().expect("flush");

    let entries = wal.entries_after(1).expect("entries_after");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].sequence, 2);
    assert_eq!(entries[1].sequence, 3);
}

#[test]
fn truncate_before_drops_older_entries() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("test.wal");
    let mut wal = Wal::open(&path, 0).expect("open");
    wal.append(&test_event(JobId::new())).expect("append1");
    wal.append(&test_event(JobId::new())).expect("append2");
    wal.append(&test_event(JobId::new())).expect("append3");
    wal.flush().expect("flush");

    wal.truncate_before(2).expect("truncate");

    let entries = wal.entries_after(0).expect("entries_after");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].sequence, 2);
    assert_eq!(entries[1].sequence, 3);
}

#[test]
fn needs_checkpoint_threshold_trips_at_100_ops() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("test.wal");
    let mut wal = Wal::open(&path, 0).expect("open");

    assert!(!wal.needs_checkpoint());
    for _ in 0..50 {
        wal.append(&test_event(JobId::new())).expect("append");
    }
    for _ in 50..101 {
        wal.append(&test_event(JobId::new())).expect("append");
    }
    assert!(wal.needs_checkpoint());
}

#[test]
fn mark_checkpointed_resets_op_threshold() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("test.wal");
    let mut wal = Wal::open(&path, 0).expect("open");

    for _ in 0..100 {
        wal.append(&test_event(JobId::new())).expect("append");
    }
    assert!(wal.needs_checkpoint());
    wal.mark_checkpointed();
    assert!(!wal.needs_checkpoint());
}

#[test]
fn open_corrupt_wal_creates_bak_and_preserves_valid_entries() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("test.wal");
    {
        let mut wal = Wal::open(&path, 0).expect("open");
        wal.append(&test_event(JobId::new())).expect("append1");
        wal.append(&test_event(JobId::new())).expect("append2");
        wal.flush().expect("flush");
    }
    {
        let mut f = fs::OpenOptions::new().append(true).open(&path).expect("reopen");
        f.write_all(b"not-valid-json\n").expect("write garbage");
    }

    let wal = Wal::open(&path, 0).expect("reopen after corruption");
    assert_eq!(wal.write_seq(), 2);
    assert!(path.with_extension("bak").exists());

    let entries = wal.entries_after(0).expect("entries_after");
    assert_eq!(entries.len(), 2);
}

#[test]
fn open_corrupt_wal_rotates_bak_files() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("test.wal");

    for i in 1..=4u8 {
        fs::write(&path, [i; 8]).expect("write corrupt");
        let wal = Wal::open(&path, 0).expect("open");
        assert_eq!(wal.write_seq(), 0);
    }

    assert_eq!(fs::read(path.with_extension("bak")).expect("bak"), vec![4u8; 8]);
    assert_eq!(fs::read(path.with_extension("bak.2")).expect("bak.2"), vec![3u8; 8]);
    assert_eq!(fs::read(path.with_extension("bak.3")).expect("bak.3"), vec![2u8; 8]);
    assert!(!path.with_extension("bak.4").exists());
}

#[test]
fn next_unprocessed_skips_corrupt_entry_without_erroring() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("test.wal");
    let mut wal = Wal::open(&path, 0).expect("open");
    wal.append(&test_event(JobId::new())).expect("append1");
    wal.flush().expect("flush");

    let entry = wal.next_unprocessed().expect("read1").expect("entry1");
    assert_eq!(entry.sequence, 1);

    {
        let mut f = fs::OpenOptions::new().append(true).open(&path).expect("reopen");
        f.write_all(b"corrupt-line\n").expect("write garbage");
    }

    assert!(wal.next_unprocessed().expect("read2").is_none());

    wal.append(&test_event(JobId::new())).expect("append2");
    wal.flush().expect("flush");

    let entry = wal.next_unprocessed().expect("read3").expect("entry2");
    assert_eq!(entry.sequence, 2);
}

#[test]
fn open_with_binary_wal_data_rotates_to_bak() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("test.wal");
    fs::write(&path, b"\x80\x81\x82\xff\xfe\n").expect("write binary");

    let wal = Wal::open(&path, 0).expect("open");
    assert_eq!(wal.write_seq(), 0);
    assert!(path.with_extension("bak").exists());
}
