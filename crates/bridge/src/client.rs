// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! C17 upstream HTTPS client: forwards one JSON-RPC request per call,
//! reassembling an SSE response into a single result value (spec.md §4.16
//! "Upstream call", "SSE assembly").
//!
//! The exact upstream route and auth-exchange payload shape are outside
//! this spec's scope (spec.md §1 "authentication token format" is an
//! external collaborator); the paths below are this bridge's own choice of
//! a conventional REST layout and are not dictated by any wire contract
//! this repository owns.

use crate::config::BridgeConfig;
use crate::credentials::Credentials;
use crate::error::{BridgeError, Result};
use cidx_wire::bridge::{JsonRpcRequest, SseAssembler, SseChunk};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

const RPC_PATH: &str = "/api/mcp/rpc";
const LOGIN_PATH: &str = "/api/auth/login";
const REFRESH_PATH: &str = "/api/auth/refresh";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Outcome of one upstream attempt, distinguishing "needs a token refresh"
/// from every other failure so the caller only retries on 401.
pub enum UpstreamOutcome {
    Result(Value),
    Unauthorized,
}

pub struct UpstreamClient {
    http: reqwest::Client,
    server_url: String,
}

impl UpstreamClient {
    pub fn new(config: &BridgeConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BridgeError::Internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http, server_url: config.server_url.trim_end_matches('/').to_string() })
    }

    pub async fn call(&self, request: &JsonRpcRequest, access_token: &str) -> Result<UpstreamOutcome> {
        let response = self
            .http
            .post(format!("{}{RPC_PATH}", self.server_url))
            .bearer_auth(access_token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(reqwest::header::ACCEPT, "text/event-stream, application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| BridgeError::transport(describe_transport_error(&e)))?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Ok(UpstreamOutcome::Unauthorized);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BridgeError::transport(format!("upstream returned {status}: {}", first_line(&body))));
        }

        let is_sse = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("text/event-stream"));

        if is_sse {
            Ok(UpstreamOutcome::Result(assemble_sse(response).await?))
        } else {
            let value: Value = response.json().await.map_err(|e| BridgeError::transport(format!("malformed upstream JSON: {e}")))?;
            Ok(UpstreamOutcome::Result(value))
        }
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        let body = serde_json::json!({ "refresh_token": refresh_token });
        self.exchange(REFRESH_PATH, &body).await
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<TokenPair> {
        self.exchange(LOGIN_PATH, credentials).await
    }

    async fn exchange(&self, path: &str, body: &impl Serialize) -> Result<TokenPair> {
        let response = self
            .http
            .post(format!("{}{path}", self.server_url))
            .json(body)
            .send()
            .await
            .map_err(|e| BridgeError::auth(describe_transport_error(&e)))?;

        if !response.status().is_success() {
            return Err(BridgeError::auth(format!("authentication failed with status {}", response.status())));
        }

        response.json::<TokenPair>().await.map_err(|e| BridgeError::auth(format!("malformed token response: {e}")))
    }
}

/// Read the SSE body to completion, reassembling `data:` lines into chunks
/// and preferring a `complete` event's payload over the accumulated buffer
/// (spec.md §9 open question (c)).
async fn assemble_sse(response: reqwest::Response) -> Result<Value> {
    let mut stream = response.bytes_stream();
    let mut assembler = SseAssembler::default();
    let mut leftover = String::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| BridgeError::transport(format!("SSE stream error: {e}")))?;
        leftover.push_str(&String::from_utf8_lossy(&chunk));

        while let Some(pos) = leftover.find("\n\n") {
            let event = leftover[..pos].to_string();
            leftover.drain(..pos + 2);
            for line in event.lines() {
                if let Some(data) = line.strip_prefix("data:") {
                    if let Ok(parsed) = serde_json::from_str::<RawSseEvent>(data.trim()) {
                        assembler.push(parsed.into_chunk());
                    }
                }
            }
        }
    }

    if !assembler.is_complete() {
        return Err(BridgeError::transport("upstream SSE stream ended without a completion event"));
    }

    Ok(assembler.finish_value())
}

/// The upstream's own SSE envelope: `{"type":"chunk"|"complete","content":...}`.
#[derive(Debug, Deserialize)]
struct RawSseEvent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    content: Option<Value>,
}

impl RawSseEvent {
    fn into_chunk(self) -> SseChunk {
        SseChunk { content: self.content, done: self.kind == "complete" }
    }
}

fn describe_transport_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "upstream request timed out".to_string()
    } else if e.is_connect() {
        "could not connect to upstream server".to_string()
    } else {
        first_line(&e.to_string())
    }
}

fn first_line(s: &str) -> String {
    s.lines().next().unwrap_or(s).to_string()
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
