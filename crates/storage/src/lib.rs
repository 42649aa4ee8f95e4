// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! Durable state for `cidxd`: atomic file writes, the write-ahead log,
//! materialized state, and the typed stores (locks, callbacks, statistics,
//! startup log) built on top of them (spec.md §4.1-§4.8, §4.18).

pub mod atomic;
pub mod callback_queue;
pub mod error;
pub mod lock_store;
pub mod rotate;
pub mod snapshot;
pub mod startup_log_store;
pub mod state;
pub mod stats_store;
pub mod store;
pub mod wal;

pub use callback_queue::CallbackQueue;
pub use error::{StorageError, Result};
pub use lock_store::LockStore;
pub use snapshot::Snapshot;
pub use startup_log_store::StartupLogStore;
pub use state::MaterializedState;
pub use stats_store::StatisticsStore;
pub use store::Store;
pub use wal::Wal;
