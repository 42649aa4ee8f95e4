// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! Domain types shared by every crate in the workspace: identifiers, the
//! job/queue/lock/sentinel/callback/batch records, the event log that ties
//! them together, and small cross-cutting utilities (`Clock`, id macros).

#[macro_use]
pub mod macros;

pub mod batch;
pub mod callback;
pub mod clock;
pub mod event;
pub mod id;
pub mod job;
pub mod lock;
pub mod proxy_config;
pub mod queue;
pub mod sentinel;
pub mod startup;
pub mod stats;

pub use batch::{Batch, BatchId, PreparationPhase, PreparationStepState};
pub use callback::{Callback, CallbackId, CallbackStatus, CALLBACK_MAX_ATTEMPTS, CALLBACK_RETRY_DELAYS_SECS};
pub use clock::{Clock, FakeClock, SystemClock};
pub use event::{Event, EventRecord};
pub use id::IdBuf;
pub use job::{Job, JobId, JobStatus};
pub use lock::{Lock, LockOperationId};
pub use proxy_config::ProxyConfig;
pub use queue::{OperationKind, QueueKey, QueuedOperation};
pub use sentinel::{Sentinel, SentinelStatus};
pub use startup::{PhaseRecord, PhaseStatus, StartupId, StartupLog, StartupMarker, StartupRecord};
pub use stats::{ResourceUsage, StatisticsSnapshot};
