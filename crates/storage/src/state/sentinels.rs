// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

use super::MaterializedState;
use cidx_core::Event;

pub(super) fn apply(state: &mut MaterializedState, event: &Event) {
    match event {
        Event::SentinelHeartbeat { sentinel } => {
            state.sentinels.insert(sentinel.job_id, sentinel.clone());
        }
        Event::SentinelRemoved { job_id } => {
            state.sentinels.remove(job_id);
        }
        _ => {}
    }
}
