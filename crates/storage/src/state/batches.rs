// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

use super::MaterializedState;
use cidx_core::{Batch, Event, PreparationPhase};

pub(super) fn apply(state: &mut MaterializedState, event: &Event) {
    match event {
        Event::BatchCreated { batch_id, repository, leader_job_id } => {
            state.batches.entry(*batch_id).or_insert_with(|| Batch {
                id: *batch_id,
                repository: repository.clone(),
                leader_job_id: *leader_job_id,
                member_job_ids: vec![*leader_job_id],
                preparation: PreparationPhase::default(),
            });
        }
        Event::BatchMemberAdded { batch_id, job_id } => {
            if let Some(batch) = state.batches.get_mut(batch_id) {
                batch.add_member(*job_id);
            }
        }
        Event::BatchPreparationUpdated { batch_id, preparation } => {
            if let Some(batch) = state.batches.get_mut(batch_id) {
                batch.preparation = preparation.clone();
            }
        }
        _ => {}
    }
}
