// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! Encrypted credential store (spec.md §4.16 "Credential store").
//!
//! `~/.mcpb/credentials.enc` holds the long-lived login credentials,
//! AES-256-GCM encrypted with a key kept alongside it in
//! `~/.mcpb/encryption.key`. Neither file is ever group/world readable.
//! The short-lived access/refresh token pair issued in exchange for these
//! credentials lives in the config file instead (see [`crate::config`]),
//! matching spec.md's "write them to the config file" instruction.

use crate::error::{BridgeError, Result};
use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

pub fn credentials_path() -> PathBuf {
    crate::config::config_dir().join("credentials.enc")
}

pub fn key_path() -> PathBuf {
    crate::config::config_dir().join("encryption.key")
}

/// Generate a fresh encryption key if none exists yet, or load the
/// existing one. Written at mode 0600.
pub fn load_or_create_key() -> Result<[u8; KEY_LEN]> {
    let path = key_path();
    match std::fs::read(&path) {
        Ok(bytes) if bytes.len() == KEY_LEN => {
            let mut key = [0u8; KEY_LEN];
            key.copy_from_slice(&bytes);
            Ok(key)
        }
        Ok(_) => Err(BridgeError::Internal(format!("encryption key at {} has the wrong length", path.display()))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            let mut key = [0u8; KEY_LEN];
            OsRng.fill_bytes(&mut key);
            let dir = crate::config::config_dir();
            std::fs::create_dir_all(&dir).map_err(|e| BridgeError::Internal(e.to_string()))?;
            std::fs::write(&path, key).map_err(|e| BridgeError::Internal(e.to_string()))?;
            set_owner_only(&path)?;
            Ok(key)
        }
        Err(e) => Err(BridgeError::Internal(e.to_string())),
    }
}

/// Encrypt `credentials` with `key` and write the ciphertext to
/// `~/.mcpb/credentials.enc` atomically at mode 0600.
pub fn save(credentials: &Credentials, key: &[u8; KEY_LEN]) -> Result<()> {
    let plaintext = serde_json::to_vec(credentials).map_err(|e| BridgeError::Internal(e.to_string()))?;
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));

    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext =
        cipher.encrypt(nonce, plaintext.as_ref()).map_err(|_| BridgeError::Internal("failed to encrypt credentials".to_string()))?;

    let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(&ciphertext);

    let path = credentials_path();
    let dir = crate::config::config_dir();
    std::fs::create_dir_all(&dir).map_err(|e| BridgeError::Internal(e.to_string()))?;
    cidx_storage::atomic::write_atomic(&path, &blob).map_err(|e| BridgeError::Internal(e.to_string()))?;
    set_owner_only(&path)?;
    Ok(())
}

pub fn load(key: &[u8; KEY_LEN]) -> Result<Credentials> {
    load_from(&credentials_path(), key)
}

fn load_from(path: &Path, key: &[u8; KEY_LEN]) -> Result<Credentials> {
    let blob = std::fs::read(path)
        .map_err(|_| BridgeError::auth(format!("no stored credentials at {}; run --setup-credentials", path.display())))?;
    if blob.len() < NONCE_LEN {
        return Err(BridgeError::Internal("corrupted credentials file".to_string()));
    }
    let (nonce_bytes, ciphertext) = blob.split_at(NONCE_LEN);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let plaintext =
        cipher.decrypt(Nonce::from_slice(nonce_bytes), ciphertext).map_err(|_| BridgeError::auth("failed to decrypt credentials"))?;
    serde_json::from_slice(&plaintext).map_err(|e| BridgeError::Internal(format!("malformed decrypted credentials: {e}")))
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

#[cfg(test)]
#[path = "credentials_tests.rs"]
mod tests;
