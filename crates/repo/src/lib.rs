// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! kpr-repo: the repository sink the daemon's `DataHandler` writes observed
//! entries through, and the filesystem-backed implementation that persists
//! them as per-user JSON-lines reports plus separately-stored snapshots.
//!
//! The reports/aggregation tool that would read these back for analysis is
//! out of scope; `query_users`/`query_entries` exist only because the
//! daemon's own status surface needs to enumerate known users.

mod error;
mod fs_repository;
mod repository;
mod types;

pub use error::RepoError;
pub use fs_repository::FileSystemRepository;
pub use repository::Repository;
pub use types::{Entry, Filter};
