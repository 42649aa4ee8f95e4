// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! Bridge configuration loading (spec.md §4.16 "Config loading priority").
//!
//! Highest wins: `CIDX_*` environment variables, then `~/.mcpb/config.json`,
//! then the legacy `MCPB_*` environment variables, then hard defaults. The
//! legacy vars exist only for operators migrating an old install and are
//! deliberately weaker than the file so a stale shell profile can't shadow
//! a deliberately-edited config.

use crate::error::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_SERVER_URL: &str = "https://api.code-indexer.example.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    pub server_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Paired with `token` (the access token); populated once the bridge has
    /// exchanged credentials or performed its first refresh. Never read
    /// from the environment — only the config file carries it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub timeout_secs: u64,
    pub log_level: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            token: None,
            refresh_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// One resolved config field plus which layer it came from, for
/// `--diagnose` (spec.md §4.16 "effective config with sources").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Env,
    File,
    LegacyEnv,
    Default,
}

impl Source {
    pub fn label(self) -> &'static str {
        match self {
            Source::Env => "env (CIDX_*)",
            Source::File => "~/.mcpb/config.json",
            Source::LegacyEnv => "env (MCPB_* legacy)",
            Source::Default => "default",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedField<T> {
    pub value: T,
    pub source: Source,
}

#[derive(Debug, Clone)]
pub struct EffectiveConfig {
    pub server_url: ResolvedField<String>,
    pub token: ResolvedField<Option<String>>,
    pub timeout_secs: ResolvedField<u64>,
    pub log_level: ResolvedField<String>,
}

impl EffectiveConfig {
    pub fn into_config(self) -> BridgeConfig {
        BridgeConfig {
            server_url: self.server_url.value,
            token: self.token.value,
            timeout_secs: self.timeout_secs.value,
            log_level: self.log_level.value,
        }
    }
}

pub fn config_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".mcpb")
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

/// Load and merge every config layer, in priority order, and validate the
/// result.
pub fn load() -> Result<BridgeConfig> {
    load_from(&config_path())
}

pub fn load_from(path: &Path) -> Result<BridgeConfig> {
    let effective = resolve(path)?;
    validate(&effective.clone().into_config())?;
    Ok(effective.into_config())
}

/// Resolve each field independently, recording which layer supplied it.
pub fn resolve(path: &Path) -> Result<EffectiveConfig> {
    let file: Option<BridgeConfig> = read_file(path)?;

    let server_url = first_env("CIDX_SERVER_URL")
        .map(|v| ResolvedField { value: v, source: Source::Env })
        .or_else(|| file.as_ref().map(|f| ResolvedField { value: f.server_url.clone(), source: Source::File }))
        .or_else(|| first_env("MCPB_SERVER_URL").map(|v| ResolvedField { value: v, source: Source::LegacyEnv }))
        .unwrap_or_else(|| ResolvedField { value: DEFAULT_SERVER_URL.to_string(), source: Source::Default });

    let token = first_env("CIDX_TOKEN")
        .map(|v| ResolvedField { value: Some(v), source: Source::Env })
        .or_else(|| file.as_ref().and_then(|f| f.token.clone()).map(|v| ResolvedField { value: Some(v), source: Source::File }))
        .or_else(|| first_env("MCPB_TOKEN").map(|v| ResolvedField { value: Some(v), source: Source::LegacyEnv }))
        .unwrap_or(ResolvedField { value: None, source: Source::Default });

    let timeout_secs = first_env("CIDX_TIMEOUT")
        .and_then(|v| v.parse::<u64>().ok())
        .map(|v| ResolvedField { value: v, source: Source::Env })
        .or_else(|| file.as_ref().map(|f| ResolvedField { value: f.timeout_secs, source: Source::File }))
        .or_else(|| {
            first_env("MCPB_TIMEOUT").and_then(|v| v.parse::<u64>().ok()).map(|v| ResolvedField { value: v, source: Source::LegacyEnv })
        })
        .unwrap_or(ResolvedField { value: DEFAULT_TIMEOUT_SECS, source: Source::Default });

    let log_level = first_env("CIDX_LOG_LEVEL")
        .map(|v| ResolvedField { value: v, source: Source::Env })
        .or_else(|| file.as_ref().map(|f| ResolvedField { value: f.log_level.clone(), source: Source::File }))
        .or_else(|| first_env("MCPB_LOG_LEVEL").map(|v| ResolvedField { value: v, source: Source::LegacyEnv }))
        .unwrap_or(ResolvedField { value: DEFAULT_LOG_LEVEL.to_string(), source: Source::Default });

    Ok(EffectiveConfig { server_url, token, timeout_secs, log_level })
}

fn first_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn read_file(path: &Path) -> Result<Option<BridgeConfig>> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(BridgeError::Internal(format!("reading {}: {e}", path.display()))),
    };

    warn_if_world_readable(path);

    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| BridgeError::Internal(format!("malformed config at {}: {e}", path.display())))
}

#[cfg(unix)]
fn warn_if_world_readable(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Ok(meta) = std::fs::metadata(path) {
        if meta.permissions().mode() & 0o077 != 0 {
            tracing::warn!(path = %path.display(), "config file permissions are not 0600");
        }
    }
}

#[cfg(not(unix))]
fn warn_if_world_readable(_path: &Path) {}

pub fn validate(config: &BridgeConfig) -> Result<()> {
    let url = url::Url::parse(&config.server_url)
        .map_err(|e| BridgeError::InvalidParams(format!("server_url is not a valid URL: {e}")))?;
    let is_local = matches!(url.host_str(), Some("localhost") | Some("127.0.0.1") | Some("::1"));
    if url.scheme() != "https" && !is_local {
        return Err(BridgeError::InvalidParams("server_url must be HTTPS unless host is localhost/127.0.0.1".to_string()));
    }

    if !(1..=300).contains(&config.timeout_secs) {
        return Err(BridgeError::InvalidParams("timeout must be between 1 and 300 seconds".to_string()));
    }

    if !matches!(config.log_level.as_str(), "debug" | "info" | "warning" | "error") {
        return Err(BridgeError::InvalidParams(format!("log_level {:?} is not one of debug/info/warning/error", config.log_level)));
    }

    Ok(())
}

/// Atomically persist `config` to `~/.mcpb/config.json` at mode 0600.
pub fn save(config: &BridgeConfig) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir).map_err(|e| BridgeError::Internal(e.to_string()))?;
    let path = config_path();
    cidx_storage::atomic::write_atomic_json(&path, config).map_err(|e| BridgeError::Internal(e.to_string()))?;
    set_owner_only(&path)?;
    Ok(())
}

#[cfg(unix)]
fn set_owner_only(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).map_err(|e| BridgeError::Internal(e.to_string()))
}

#[cfg(not(unix))]
fn set_owner_only(_path: &Path) -> Result<()> {
    Ok(())
}

/// Rewrite just the token pair in the config file, atomically, preserving
/// every other field (spec.md §4.16 "rewrite the tokens file atomically via
/// C1"). Used after a successful login or refresh.
pub fn write_tokens(access_token: &str, refresh_token: &str) -> Result<()> {
    let mut config = match read_file(&config_path())? {
        Some(config) => config,
        None => BridgeConfig::default(),
    };
    config.token = Some(access_token.to_string());
    config.refresh_token = Some(refresh_token.to_string());
    save(&config)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
