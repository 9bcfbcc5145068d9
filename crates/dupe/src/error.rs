// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the path trie and duplicate detector.

use std::path::PathBuf;

/// Errors surfaced by [`crate::PathArena`] and [`crate::DuplicateDetector`].
#[derive(Debug, thiserror::Error)]
pub enum DupeError {
    #[error("failed to stat `{path}`: {source}")]
    Stat {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to hash `{path}`: {source}")]
    Hash {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("node {0} is not a leaf")]
    NotALeaf(crate::NodeId),
}
