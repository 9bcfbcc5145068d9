// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Repository-level entry and query types. An `Entry` pairs a username with
//! the wire observation; the username lives only here (and in the on-disk
//! directory layout) — it is never repeated inside the stored JSON line,
//! matching the agent's own wire shape.

use std::time::SystemTime;

/// One stored observation, scoped to the user it was collected for.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub username: String,
    pub entry: kpr_wire::Entry,
}

/// A query over the repository's stored entries for a single user.
#[derive(Debug, Clone)]
pub struct Filter {
    pub username: String,
    pub from: SystemTime,
    pub to: SystemTime,
}

impl Filter {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            from: SystemTime::UNIX_EPOCH,
            to: SystemTime::now(),
        }
    }

    pub fn with_range(mut self, from: SystemTime, to: SystemTime) -> Self {
        self.from = from;
        self.to = to;
        self
    }
}
