// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

use super::MaterializedState;
use cidx_core::Event;

pub(super) fn apply(state: &mut MaterializedState, event: &Event) {
    match event {
        Event::QueueDequeued { job_id } => {
            for queue in state.waiting_queues.values_mut() {
                queue.retain(|entry| entry.job_id != *job_id);
            }
        }
        Event::QueuePositionsRenumbered { positions } => {
            for queue in state.waiting_queues.values_mut() {
                for entry in queue.iter_mut() {
                    if let Some((_, position)) = positions.iter().find(|(id, _)| *id == entry.job_id) {
                        entry.position = *position;
                    }
                }
            }
        }
        _ => {}
    }
}
