// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! Startup markers and the bounded startup history log (spec.md §3
//! "StartupMarker" / "StartupLog", §4.10 RecoveryOrchestrator, §4.18
//! StartupLogAPI).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for one daemon startup attempt.
    pub struct StartupId("startup-");
}

/// How many prior startups the log retains in addition to the current one.
pub const STARTUP_LOG_HISTORY_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    Pending,
    Running,
    Completed,
    Degraded,
    Failed,
}

crate::simple_display! {
    PhaseStatus {
        Pending => "pending",
        Running => "running",
        Completed => "completed",
        Degraded => "degraded",
        Failed => "failed",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseRecord {
    pub name: String,
    pub status: PhaseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corrupted_resource: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PhaseRecord {
    pub fn pending(name: impl Into<String>) -> Self {
        Self { name: name.into(), status: PhaseStatus::Pending, duration_ms: None, corrupted_resource: None, error: None }
    }
}

/// Written before any recovery phase runs and removed on clean completion.
/// Its presence at the next startup means the previous attempt crashed
/// mid-recovery (spec.md §4.10 "abort detection").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartupMarker {
    pub startup_id: StartupId,
    pub started_at: DateTime<Utc>,
    pub completed_phases: Vec<String>,
    pub current_phase: Option<String>,
}

impl StartupMarker {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self { startup_id: StartupId::new(), started_at, completed_phases: Vec::new(), current_phase: None }
    }

    pub fn enter_phase(&mut self, name: impl Into<String>) {
        self.current_phase = Some(name.into());
    }

    pub fn complete_phase(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.completed_phases.contains(&name) {
            self.completed_phases.push(name.clone());
        }
        if self.current_phase.as_deref() == Some(name.as_str()) {
            self.current_phase = None;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartupRecord {
    pub startup_id: StartupId,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    pub phases: Vec<PhaseRecord>,
    pub degraded_mode: bool,
    pub resumed_from_crash: bool,
}

impl StartupRecord {
    pub fn new(started_at: DateTime<Utc>, resumed_from_crash: bool) -> Self {
        Self {
            startup_id: StartupId::new(),
            started_at,
            finished_at: None,
            phases: Vec::new(),
            degraded_mode: false,
            resumed_from_crash,
        }
    }

    pub fn push_phase(&mut self, phase: PhaseRecord) {
        if matches!(phase.status, PhaseStatus::Degraded) {
            self.degraded_mode = true;
        }
        self.phases.push(phase);
    }
}

/// Current startup plus a bounded ring of prior attempts, exposed read-only
/// via the daemon's startup-log API.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StartupLog {
    pub current: Option<StartupRecord>,
    pub history: std::collections::VecDeque<StartupRecord>,
}

impl StartupLog {
    /// Archive the current record (if any) into history and install `record`
    /// as the new current attempt.
    pub fn begin(&mut self, record: StartupRecord) {
        if let Some(prev) = self.current.take() {
            self.history.push_front(prev);
            while self.history.len() > STARTUP_LOG_HISTORY_LIMIT {
                self.history.pop_back();
            }
        }
        self.current = Some(record);
    }
}

#[cfg(test)]
#[path = "startup_tests.rs"]
mod tests;
