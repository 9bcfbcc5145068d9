// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin async convenience layer over the sans-IO [`crate::codec`] types, for
//! callers that already hold a whole in-memory payload. `Communicator`
//! drives `Packer`/`Unpacker` directly against a partially-read byte stream
//! instead, so large frames don't need to be buffered whole.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::codec::HEADER_LEN;
use crate::error::WireError;

pub async fn write_message<W: AsyncWrite + Unpin>(
    writer: &mut W,
    payload: &[u8],
) -> Result<(), WireError> {
    writer
        .write_all(&(payload.len() as u64).to_le_bytes())
        .await?;
    writer.write_all(payload).await?;
    writer.flush().await?;
    Ok(())
}

pub async fn read_message<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Vec<u8>, WireError> {
    let mut header = [0u8; HEADER_LEN];
    reader.read_exact(&mut header).await?;
    let len = u64::from_le_bytes(header) as usize;
    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await?;
    Ok(payload)
}

#[cfg(test)]
#[path = "framing_tests.rs"]
mod framing_tests;
