// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

use super::MaterializedState;
use cidx_core::Event;

pub(super) fn apply(state: &mut MaterializedState, event: &Event) {
    match event {
        Event::LockAcquired { lock } => {
            state.locks.insert(lock.repository.clone(), lock.clone());
        }
        Event::LockReleased { repository, operation_id } => {
            if let Some(lock) = state.locks.get(repository) {
                if lock.operation_id == *operation_id {
                    state.locks.remove(repository);
                }
            }
        }
        _ => {}
    }
}
