// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("could not determine state directory")]
    NoStateDir,

    #[error("failed to acquire single-instance lock at {0}: another watchd already running?")]
    LockFailed(PathBuf),

    #[error("failed to bind {0}: {1}")]
    BindFailed(std::net::SocketAddr, std::io::Error),

    #[error("io error at `{path}`: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed message payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("wire error: {0}")]
    Wire(#[from] kpr_wire::WireError),

    #[error("usage error: {0}")]
    Usage(String),
}
