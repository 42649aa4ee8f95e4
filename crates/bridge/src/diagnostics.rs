// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! `--diagnose`: prints env, config, effective config with sources, and a
//! reachability probe; tokens masked to their last three characters
//! (spec.md §4.16 "Diagnostics mode").

use crate::config::{self, EffectiveConfig, Source};
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
pub struct Report {
    pub env: Vec<(String, String)>,
    pub config_path: String,
    pub effective: Vec<FieldReport>,
    pub reachable: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct FieldReport {
    pub field: String,
    pub value: String,
    pub source: String,
}

/// Mask everything but the last three characters, e.g. `"abc123" ->
/// "***123"` (spec.md §4.16 "tokens masked to the last three characters").
pub fn mask(secret: &str) -> String {
    if secret.len() <= 3 {
        "*".repeat(secret.len())
    } else {
        let tail = &secret[secret.len() - 3..];
        format!("{}{tail}", "*".repeat(secret.len() - 3))
    }
}

const RELEVANT_ENV_VARS: &[&str] = &[
    "CIDX_SERVER_URL",
    "CIDX_TOKEN",
    "CIDX_TIMEOUT",
    "CIDX_LOG_LEVEL",
    "MCPB_SERVER_URL",
    "MCPB_TOKEN",
    "MCPB_TIMEOUT",
    "MCPB_LOG_LEVEL",
];

pub fn collect_env() -> Vec<(String, String)> {
    RELEVANT_ENV_VARS
        .iter()
        .filter_map(|name| std::env::var(name).ok().map(|v| (name.to_string(), if name.contains("TOKEN") { mask(&v) } else { v })))
        .collect()
}

pub fn render(effective: &EffectiveConfig) -> Vec<FieldReport> {
    let mask_or = |value: &str| mask(value);
    vec![
        FieldReport { field: "server_url".to_string(), value: effective.server_url.value.clone(), source: label(effective.server_url.source) },
        FieldReport {
            field: "token".to_string(),
            value: effective.token.value.as_deref().map(mask_or).unwrap_or_else(|| "<none>".to_string()),
            source: label(effective.token.source),
        },
        FieldReport {
            field: "timeout_secs".to_string(),
            value: effective.timeout_secs.value.to_string(),
            source: label(effective.timeout_secs.source),
        },
        FieldReport { field: "log_level".to_string(), value: effective.log_level.value.clone(), source: label(effective.log_level.source) },
    ]
}

fn label(source: Source) -> String {
    source.label().to_string()
}

/// Probe whether `server_url` is reachable with a short HEAD request; never
/// fails the diagnose command, just reports the boolean.
pub async fn probe_reachable(server_url: &str) -> bool {
    let client = match reqwest::Client::builder().timeout(Duration::from_secs(5)).build() {
        Ok(client) => client,
        Err(_) => return false,
    };
    client.head(server_url).send().await.is_ok()
}

pub async fn run() -> crate::error::Result<Report> {
    let effective = config::resolve(&config::config_path())?;
    let reachable = Some(probe_reachable(&effective.server_url.value).await);
    Ok(Report { env: collect_env(), config_path: config::config_path().display().to_string(), effective: render(&effective), reachable })
}

#[cfg(test)]
#[path = "diagnostics_tests.rs"]
mod tests;
