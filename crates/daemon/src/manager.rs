// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `AgentManager`: the single-slot arbiter deciding which connection, if
//! any, is the one authorized agent.

use parking_lot::Mutex;

use crate::agent_connection::ConnId;

pub struct AgentManager {
    slot: Mutex<Option<ConnId>>,
}

impl AgentManager {
    pub fn new() -> Self {
        Self { slot: Mutex::new(None) }
    }

    /// The auth callback arbiter (spec §4.9): accepts the first `true`,
    /// releases on its own holder's `false`, rejects everyone else.
    /// Returns whether the caller's requested transition was accepted.
    pub fn on_auth_result(&self, conn_id: ConnId, authorized: bool) -> bool {
        let mut slot = self.slot.lock();
        match (*slot, authorized) {
            (None, true) => {
                *slot = Some(conn_id);
                true
            }
            (Some(held), false) if held == conn_id => {
                *slot = None;
                true
            }
            _ => false,
        }
    }

    pub fn has_authorized_agent(&self) -> bool {
        self.slot.lock().is_some()
    }
}

impl Default for AgentManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod manager_tests;
