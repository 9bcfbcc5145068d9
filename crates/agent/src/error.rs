// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the OS leaf interfaces and probe loop.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("failed to capture screen region: {0}")]
    Capture(String),

    #[error("failed to launch process: {0}")]
    Launch(String),

    #[error("failed to hash `{path}`: {source}")]
    Hash {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to encode probe message: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to send probe message: {0}")]
    Send(#[from] kpr_wire::WireError),
}
