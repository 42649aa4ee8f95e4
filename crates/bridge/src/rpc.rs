// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! C17 transport core: strict JSON-RPC 2.0 framing over stdio, dispatched
//! to the upstream HTTPS client with one 401-triggered refresh-and-retry
//! (spec.md §4.16 "Framing", "Auto-refresh").

use crate::client::{TokenPair, UpstreamClient, UpstreamOutcome};
use crate::config::{self, BridgeConfig};
use crate::credentials::{self, Credentials};
use crate::error::BridgeError;
use cidx_wire::bridge::{error_code, JsonRpcRequest, JsonRpcResponse, JSONRPC_VERSION};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

pub struct Bridge {
    config: BridgeConfig,
    client: UpstreamClient,
}

impl Bridge {
    pub fn new(config: BridgeConfig) -> crate::error::Result<Self> {
        let client = UpstreamClient::new(&config)?;
        Ok(Self { config, client })
    }

    /// Drive the stdin→stdout JSON-RPC loop until stdin closes. Each line
    /// is one request; each response is written as exactly one line.
    pub async fn run_stdio(&mut self) -> crate::error::Result<()> {
        let stdin = tokio::io::stdin();
        let mut lines = BufReader::new(stdin).lines();
        let mut stdout = tokio::io::stdout();

        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => return Err(BridgeError::Internal(format!("stdin read error: {e}"))),
            };
            if line.trim().is_empty() {
                continue;
            }

            let response = self.handle_line(&line).await;
            let mut encoded = serde_json::to_vec(&response).unwrap_or_default();
            encoded.push(b'\n');
            stdout.write_all(&encoded).await.map_err(|e| BridgeError::Internal(e.to_string()))?;
            stdout.flush().await.map_err(|e| BridgeError::Internal(e.to_string()))?;
        }
        Ok(())
    }

    /// Parse, validate, and dispatch one request line, producing exactly
    /// one response (spec.md §4.16 "Framing").
    pub async fn handle_line(&mut self, line: &str) -> JsonRpcResponse {
        let raw: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => return JsonRpcResponse::err(Value::Null, error_code::PARSE_ERROR, format!("parse error: {e}")),
        };

        let id = raw.get("id").cloned().unwrap_or(Value::Null);

        let request = match parse_envelope(raw) {
            Ok(request) => request,
            Err(message) => return JsonRpcResponse::err(id, error_code::INVALID_REQUEST, message),
        };

        match self.dispatch(&request).await {
            Ok(result) => JsonRpcResponse::ok(request.id, result),
            Err(e) => JsonRpcResponse::err(request.id, e.code(), e.to_string()),
        }
    }

    async fn dispatch(&mut self, request: &JsonRpcRequest) -> crate::error::Result<Value> {
        // `current_tokens`/`reauthenticate` persist any freshly issued pair
        // back into `self.config` so a second 401 in the same process
        // doesn't re-trigger a login the disk already knows about.
        let mut tokens = self.current_tokens().await?;

        match self.client.call(request, &tokens.access_token).await? {
            UpstreamOutcome::Result(value) => Ok(value),
            UpstreamOutcome::Unauthorized => {
                tokens = self.reauthenticate(&tokens).await?;
                match self.client.call(request, &tokens.access_token).await? {
                    UpstreamOutcome::Result(value) => Ok(value),
                    UpstreamOutcome::Unauthorized => Err(BridgeError::auth("upstream rejected credentials after refresh")),
                }
            }
        }
    }

    /// Load the token pair currently in memory, logging in with stored
    /// credentials if none exists yet (spec.md §4.16 "On first request").
    async fn current_tokens(&mut self) -> crate::error::Result<TokenPair> {
        if let (Some(access_token), Some(refresh_token)) = (self.config.token.clone(), self.config.refresh_token.clone()) {
            return Ok(TokenPair { access_token, refresh_token });
        }
        self.login().await
    }

    async fn login(&mut self) -> crate::error::Result<TokenPair> {
        let key = credentials::load_or_create_key()?;
        let creds = credentials::load(&key)?;
        let pair = self.client.login(&creds).await?;
        self.store_tokens(&pair)?;
        Ok(pair)
    }

    /// Attempt a refresh-token exchange; fall back to a full login on
    /// failure (spec.md §4.16 "on failure, auto-login").
    async fn reauthenticate(&mut self, stale: &TokenPair) -> crate::error::Result<TokenPair> {
        let pair = match self.client.refresh(&stale.refresh_token).await {
            Ok(pair) => pair,
            Err(_) => return self.login().await,
        };
        self.store_tokens(&pair)?;
        Ok(pair)
    }

    fn store_tokens(&mut self, pair: &TokenPair) -> crate::error::Result<()> {
        config::write_tokens(&pair.access_token, &pair.refresh_token)?;
        self.config.token = Some(pair.access_token.clone());
        self.config.refresh_token = Some(pair.refresh_token.clone());
        Ok(())
    }
}

/// Require `jsonrpc:"2.0"`, a non-empty `method`, and a non-null `id`
/// (spec.md §4.16 "Reject requests missing jsonrpc/method/id with
/// `-32600`"). Well-formed JSON that merely lacks these fields still
/// reaches here — only truly unparsable input is a parse error.
fn parse_envelope(raw: Value) -> std::result::Result<JsonRpcRequest, String> {
    let Some(obj) = raw.as_object() else {
        return Err("request must be a JSON object".to_string());
    };

    let jsonrpc = obj.get("jsonrpc").and_then(Value::as_str).unwrap_or_default();
    if jsonrpc != JSONRPC_VERSION {
        return Err(format!("missing or invalid jsonrpc version, expected {JSONRPC_VERSION:?}"));
    }

    let method = obj.get("method").and_then(Value::as_str).unwrap_or_default();
    if method.is_empty() {
        return Err("missing method".to_string());
    }

    let id = obj.get("id").cloned().unwrap_or(Value::Null);
    if id.is_null() {
        return Err("missing id".to_string());
    }

    Ok(JsonRpcRequest { jsonrpc: jsonrpc.to_string(), id, method: method.to_string(), params: obj.get("params").cloned() })
}

#[cfg(test)]
#[path = "rpc_tests.rs"]
mod tests;
