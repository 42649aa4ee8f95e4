// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! C10 RecoveryOrchestrator (spec.md §4.9): runs the fixed startup phase
//! graph under a crash-detectable marker, retrying non-critical failures
//! with backoff before declaring them degraded or failed.
//!
//! Resolution of an ambiguity between spec.md §4.9 steps 4 and 5: step 4
//! says a non-critical, non-degradable failure aborts startup; step 5 says
//! non-critical failures retry with backoff before "declaring failure".
//! Implemented here as: retry applies to every non-critical failure
//! (degradable or not); only after the backoff schedule is exhausted does
//! the phase resolve to `Degraded` (if `allow_degraded`) or `Failed`
//! (otherwise) — and a `Failed` non-critical phase still does not abort the
//! daemon, since aborting is reserved for `critical` phases.

use crate::error::{io_err, DaemonError, Result};
use crate::workspace::Layout;
use chrono::Utc;
use cidx_core::{PhaseRecord, PhaseStatus, StartupMarker, StartupRecord};
use cidx_storage::{atomic, StartupLogStore};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

/// Backoff schedule for retrying a non-critical failing phase (spec.md §4.9 step 5).
pub const RETRY_BACKOFFS: [Duration; 3] = [Duration::from_secs(1), Duration::from_secs(2), Duration::from_secs(4)];

#[derive(Debug, Clone)]
pub struct PhaseSpec {
    pub name: &'static str,
    pub depends_on: Vec<&'static str>,
    pub critical: bool,
    pub allow_degraded: bool,
}

impl PhaseSpec {
    pub fn new(name: &'static str) -> Self {
        Self { name, depends_on: Vec::new(), critical: false, allow_degraded: false }
    }

    pub fn depends_on(mut self, deps: &[&'static str]) -> Self {
        self.depends_on = deps.to_vec();
        self
    }

    pub fn critical(mut self) -> Self {
        self.critical = true;
        self
    }

    pub fn allow_degraded(mut self) -> Self {
        self.allow_degraded = true;
        self
    }
}

/// What one attempt at running a phase's body returned.
pub enum PhaseOutcome {
    Completed,
    /// The phase ran but one resource within it could not be recovered;
    /// only meaningful for phases with `allow_degraded`.
    Degraded { corrupted_resource: String },
}

enum PolicyOutcome {
    Completed,
    Degraded { corrupted_resource: String },
    Failed { reason: String },
}

/// The fixed dependency graph from spec.md §4.9:
/// `Queue(critical) -> Locks(degradable) | Jobs(critical) -> WaitingQueues(degradable)
/// -> Orphans(degradable) -> Callbacks(degradable) [-> Batches(optional, degradable)]`.
pub fn default_phase_graph() -> Vec<PhaseSpec> {
    vec![
        PhaseSpec::new("queue").critical(),
        PhaseSpec::new("locks").depends_on(&["queue"]).allow_degraded(),
        PhaseSpec::new("jobs").depends_on(&["queue"]).critical(),
        PhaseSpec::new("waiting_queues").depends_on(&["locks", "jobs"]).allow_degraded(),
        PhaseSpec::new("orphans").depends_on(&["waiting_queues"]).allow_degraded(),
        PhaseSpec::new("callbacks").depends_on(&["orphans"]).allow_degraded(),
        PhaseSpec::new("batches").depends_on(&["callbacks"]).allow_degraded(),
    ]
}

pub struct RecoveryOrchestrator {
    layout: Arc<Layout>,
    log_store: StartupLogStore,
}

impl RecoveryOrchestrator {
    pub fn new(layout: Arc<Layout>) -> Self {
        let log_store = StartupLogStore::new(layout.startup_log_path());
        Self { layout, log_store }
    }

    /// Run `phases` in dependency order, invoking `execute(phase_name)` for
    /// each. Blocking: retries sleep the calling thread, so callers on an
    /// async runtime should run this via `spawn_blocking`.
    pub fn run(
        &self,
        phases: Vec<PhaseSpec>,
        mut execute: impl FnMut(&str) -> std::result::Result<PhaseOutcome, String>,
    ) -> Result<StartupRecord> {
        let resumed_from_crash = self.reconcile_interrupted_marker()?;

        let started_at = Utc::now();
        let mut marker = StartupMarker::new(started_at);
        atomic::write_atomic_json(&self.layout.startup_marker_path(), &marker)?;

        let order = topological_order(&phases)?;
        let mut record = StartupRecord::new(started_at, resumed_from_crash);

        for name in &order {
            marker.enter_phase(name.clone());
            atomic::write_atomic_json(&self.layout.startup_marker_path(), &marker)?;

            let Some(spec) = phases.iter().find(|p| p.name == name) else {
                return Err(DaemonError::InvalidPhaseGraph(format!("phase {name:?} vanished from its own graph")));
            };
            let phase_started = std::time::Instant::now();
            let outcome = self.execute_with_policy(spec, &mut execute)?;
            let duration_ms = phase_started.elapsed().as_millis() as u64;

            let phase_record = match outcome {
                PolicyOutcome::Completed => {
                    PhaseRecord { status: PhaseStatus::Completed, duration_ms: Some(duration_ms), ..PhaseRecord::pending(name.clone()) }
                }
                PolicyOutcome::Degraded { corrupted_resource } => PhaseRecord {
                    status: PhaseStatus::Degraded,
                    duration_ms: Some(duration_ms),
                    corrupted_resource: Some(corrupted_resource),
                    ..PhaseRecord::pending(name.clone())
                },
                PolicyOutcome::Failed { reason } => PhaseRecord {
                    status: PhaseStatus::Failed,
                    duration_ms: Some(duration_ms),
                    error: Some(reason),
                    ..PhaseRecord::pending(name.clone())
                },
            };
            record.push_phase(phase_record);

            marker.complete_phase(name.clone());
            atomic::write_atomic_json(&self.layout.startup_marker_path(), &marker)?;
        }

        record.finished_at = Some(Utc::now());
        self.finish(record.clone())?;
        std::fs::remove_file(self.layout.startup_marker_path()).ok();
        Ok(record)
    }

    fn execute_with_policy(
        &self,
        spec: &PhaseSpec,
        execute: &mut impl FnMut(&str) -> std::result::Result<PhaseOutcome, String>,
    ) -> Result<PolicyOutcome> {
        match execute(spec.name) {
            Ok(PhaseOutcome::Completed) => Ok(PolicyOutcome::Completed),
            Ok(PhaseOutcome::Degraded { corrupted_resource }) => Ok(PolicyOutcome::Degraded { corrupted_resource }),
            Err(reason) => {
                if spec.critical {
                    return Err(DaemonError::PhaseFailed { phase: spec.name.to_string(), reason });
                }
                let mut last_reason = reason;
                for backoff in RETRY_BACKOFFS {
                    std::thread::sleep(backoff);
                    match execute(spec.name) {
                        Ok(PhaseOutcome::Completed) => return Ok(PolicyOutcome::Completed),
                        Ok(PhaseOutcome::Degraded { corrupted_resource }) => {
                            return Ok(PolicyOutcome::Degraded { corrupted_resource })
                        }
                        Err(reason) => last_reason = reason,
                    }
                }
                if spec.allow_degraded {
                    Ok(PolicyOutcome::Degraded { corrupted_resource: spec.name.to_string() })
                } else {
                    Ok(PolicyOutcome::Failed { reason: last_reason })
                }
            }
        }
    }

    /// If a marker from a prior startup is still present, that startup
    /// crashed mid-recovery. Log what it had completed and remove it.
    fn reconcile_interrupted_marker(&self) -> Result<bool> {
        let marker_path = self.layout.startup_marker_path();
        let Ok(bytes) = std::fs::read(&marker_path) else { return Ok(false) };
        if let Ok(marker) = serde_json::from_slice::<StartupMarker>(&bytes) {
            tracing::warn!(
                startup_id = %marker.startup_id,
                completed_phases = ?marker.completed_phases,
                current_phase = ?marker.current_phase,
                "prior startup was interrupted mid-recovery"
            );
        }
        std::fs::remove_file(&marker_path).map_err(io_err(marker_path))?;
        Ok(true)
    }

    fn finish(&self, record: StartupRecord) -> Result<()> {
        let mut log = self.log_store.load()?;
        log.begin(record);
        self.log_store.save(&log)?;
        Ok(())
    }
}

/// Kahn's algorithm over `depends_on`, breaking ties by declaration order so
/// results are deterministic. Unknown or circular dependencies abort.
fn topological_order(phases: &[PhaseSpec]) -> Result<Vec<String>> {
    let names: HashSet<&str> = phases.iter().map(|p| p.name).collect();
    let declared_index: HashMap<&str, usize> = phases.iter().enumerate().map(|(i, p)| (p.name, i)).collect();
    let mut in_degree: HashMap<&str, usize> = phases.iter().map(|p| (p.name, 0)).collect();
    let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();

    for p in phases {
        for dep in &p.depends_on {
            if !names.contains(dep) {
                return Err(DaemonError::InvalidPhaseGraph(format!(
                    "phase {:?} depends on unknown phase {:?}",
                    p.name, dep
                )));
            }
            *in_degree.entry(p.name).or_insert(0) += 1;
            dependents.entry(dep).or_default().push(p.name);
        }
    }

    let mut ready: Vec<&str> = in_degree.iter().filter(|(_, d)| **d == 0).map(|(n, _)| *n).collect();
    ready.sort_by_key(|n| declared_index[n]);
    let mut queue: VecDeque<&str> = ready.into();

    let mut order = Vec::with_capacity(phases.len());
    while let Some(name) = queue.pop_front() {
        order.push(name.to_string());
        if let Some(deps) = dependents.get(name) {
            let mut newly_ready = Vec::new();
            for &dependent in deps {
                if let Some(degree) = in_degree.get_mut(dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        newly_ready.push(dependent);
                    }
                }
            }
            newly_ready.sort_by_key(|n| declared_index[n]);
            queue.extend(newly_ready);
        }
    }

    if order.len() != phases.len() {
        return Err(DaemonError::InvalidPhaseGraph("circular dependency among recovery phases".to_string()));
    }
    Ok(order)
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
