// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for deletion strategies and the review workflow.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("failed to delete `{path}`: {source}")]
    Delete {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to move `{path}` into backup directory: {source}")]
    Backup {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to open journal `{path}`: {source}")]
    Journal {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to persist path list `{path}`: {source}")]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },
}
