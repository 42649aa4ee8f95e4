// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! Wire types shared between the CLI/daemon IPC boundary and the MCP
//! bridge/upstream HTTP boundary.

pub mod bridge;
pub mod daemon;

pub use bridge::{error_code, JsonRpcError, JsonRpcRequest, JsonRpcResponse, SseAssembler, SseChunk};
pub use daemon::{DaemonRequest, DaemonResponse, JobAccepted, QueueListing, SentinelSummary};
