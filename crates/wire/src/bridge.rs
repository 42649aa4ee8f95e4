// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! JSON-RPC 2.0 framing and SSE reassembly types shared by `cidx-bridge`
//! (spec.md §4.16 "MCP Bridge").

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

/// JSON-RPC error codes. `-32000` is the one application-specific code this
/// bridge uses for upstream/auth failures; the rest are the reserved
/// protocol codes.
pub mod error_code {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;
    pub const SERVER_ERROR: i64 = -32000;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Value,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn ok(id: Value, result: Value) -> Self {
        Self { jsonrpc: JSONRPC_VERSION.to_string(), id, result: Some(result), error: None }
    }

    pub fn err(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(JsonRpcError { code, message: message.into(), data: None }),
        }
    }
}

/// A chunk of an SSE-streamed upstream response. `content` accepts either a
/// plain string or a structured object, per the upstream's own
/// inconsistency — the bridge normalizes both to text before forwarding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SseChunk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    #[serde(default)]
    pub done: bool,
}

impl SseChunk {
    /// Flatten `content` to text regardless of whether upstream sent a
    /// string or an object.
    pub fn content_as_text(&self) -> Option<String> {
        match &self.content {
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
            None => None,
        }
    }
}

/// Reassembles a stream of `SseChunk`s into the final text. A `complete`
/// event (`done == true`) wins outright over any partial chunks buffered so
/// far, matching the upstream's "complete supersedes partial" contract.
#[derive(Debug, Default)]
pub struct SseAssembler {
    buffer: String,
    complete: Option<String>,
    raw_chunks: Vec<Value>,
    complete_raw: Option<Value>,
}

impl SseAssembler {
    pub fn push(&mut self, chunk: SseChunk) {
        if self.complete.is_some() {
            return;
        }
        if chunk.done {
            self.complete = chunk.content_as_text().or_else(|| Some(self.buffer.clone()));
            self.complete_raw = chunk.content;
            return;
        }
        if let Some(text) = chunk.content_as_text() {
            self.buffer.push_str(&text);
        }
        if let Some(content) = chunk.content {
            self.raw_chunks.push(content);
        }
    }

    pub fn finish(self) -> String {
        self.complete.unwrap_or(self.buffer)
    }

    /// True once a `done` chunk has been pushed.
    pub fn is_complete(&self) -> bool {
        self.complete.is_some()
    }

    /// Reassemble preserving the original JSON shape rather than flattening
    /// to text (spec.md §9 open question (c)): the `complete` event's raw
    /// content wins outright; otherwise string chunks concatenate and
    /// object chunks collect into an array.
    pub fn finish_value(self) -> Value {
        if let Some(raw) = self.complete_raw {
            return raw;
        }
        if self.raw_chunks.iter().all(Value::is_string) {
            return Value::String(self.buffer);
        }
        Value::Array(self.raw_chunks)
    }
}

#[cfg(test)]
#[path = "bridge_tests.rs"]
mod tests;
