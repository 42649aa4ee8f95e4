// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! Batch records (spec.md §3 "Batch").

use crate::job::JobId;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a batch of jobs sharing a preparation phase.
    pub struct BatchId("bch-");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreparationStepState {
    NotStarted,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreparationPhase {
    pub git_pull: PreparationStepState,
    pub indexing: PreparationStepState,
}

impl Default for PreparationPhase {
    fn default() -> Self {
        Self { git_pull: PreparationStepState::NotStarted, indexing: PreparationStepState::NotStarted }
    }
}

impl PreparationPhase {
    pub fn is_complete(&self) -> bool {
        matches!(self.git_pull, PreparationStepState::Completed)
            && matches!(self.indexing, PreparationStepState::Completed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    pub id: BatchId,
    pub repository: String,
    pub leader_job_id: JobId,
    pub member_job_ids: Vec<JobId>,
    pub preparation: PreparationPhase,
}

impl Batch {
    pub fn new(repository: impl Into<String>, leader_job_id: JobId) -> Self {
        Self {
            id: BatchId::new(),
            repository: repository.into(),
            leader_job_id,
            member_job_ids: vec![leader_job_id],
            preparation: PreparationPhase::default(),
        }
    }

    pub fn add_member(&mut self, job_id: JobId) {
        if !self.member_job_ids.contains(&job_id) {
            self.member_job_ids.push(job_id);
        }
    }
}

#[cfg(test)]
#[path = "batch_tests.rs"]
mod tests;
