// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! IPC protocol for the `cidx` <-> `cidxd` Unix domain socket (spec.md §5).
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload.

use cidx_wire::daemon::{DaemonRequest, DaemonResponse};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Refuse to allocate more than this for a single message's payload.
pub const MAX_MESSAGE_BYTES: u32 = 64 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("message of {len} bytes exceeds the {MAX_MESSAGE_BYTES} byte limit")]
    MessageTooLarge { len: u32 },
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Write `value` as a length-prefixed JSON frame and flush.
pub async fn write_message<W, T>(writer: &mut W, value: &T) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let payload = serde_json::to_vec(value)?;
    let len = u32::try_from(payload.len()).map_err(|_| ProtocolError::MessageTooLarge { len: u32::MAX })?;
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(&payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one length-prefixed JSON frame. Returns `Ok(None)` on a clean EOF
/// before any bytes of the next frame arrive (the peer closed the socket).
pub async fn read_message<R, T>(reader: &mut R) -> Result<Option<T>, ProtocolError>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }
    let len = u32::from_be_bytes(len_buf);
    if len > MAX_MESSAGE_BYTES {
        return Err(ProtocolError::MessageTooLarge { len });
    }
    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload).await?;
    Ok(Some(serde_json::from_slice(&payload)?))
}

pub async fn read_request<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Option<DaemonRequest>, ProtocolError> {
    read_message(reader).await
}

pub async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &DaemonResponse,
) -> Result<(), ProtocolError> {
    write_message(writer, response).await
}

pub async fn write_request<W: AsyncWrite + Unpin>(writer: &mut W, request: &DaemonRequest) -> Result<(), ProtocolError> {
    write_message(writer, request).await
}

pub async fn read_response<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Option<DaemonResponse>, ProtocolError> {
    read_message(reader).await
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
