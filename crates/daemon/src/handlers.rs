// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Message handlers. `AuthorizationHandler` and `DataHandler` each implement
//! `MsgHandler` over the JSON `message` payload already unwrapped from its
//! `{"name": ..., "message": ...}` envelope by `AgentConnection`.

use std::sync::Arc;

use parking_lot::Mutex;

use kpr_repo::Repository;
use kpr_wire::{AuthRequest, DataRequest, Response};

use crate::error::DaemonError;

pub enum HandlerOutcome {
    Response(Response),
}

pub trait MsgHandler: Send {
    fn handle(&mut self, payload: &serde_json::Value) -> Result<HandlerOutcome, DaemonError>;
}

/// Checks the inbound token against whatever the spawn/health loop last
/// installed. Success is reported as `{status:0, answer:{authorized:bool}}`
/// per spec — a mismatch is not a transport-level error.
pub struct AuthorizationHandler {
    expected_token: Arc<Mutex<Option<String>>>,
    authorized_username: Option<String>,
}

impl AuthorizationHandler {
    pub fn new(expected_token: Arc<Mutex<Option<String>>>) -> Self {
        Self {
            expected_token,
            authorized_username: None,
        }
    }

    pub fn authorized_username(&self) -> Option<&str> {
        self.authorized_username.as_deref()
    }
}

impl MsgHandler for AuthorizationHandler {
    fn handle(&mut self, payload: &serde_json::Value) -> Result<HandlerOutcome, DaemonError> {
        let request: AuthRequest = serde_json::from_value(payload.clone())?;

        let mut expected = self.expected_token.lock();
        let authorized = !request.username.is_empty() && expected.as_deref() == Some(request.token.as_str());

        if authorized {
            self.authorized_username = Some(request.username);
            // Cleared after first successful auth so a leaked token is only
            // ever good for one handshake.
            *expected = None;
        }
        drop(expected);

        Ok(HandlerOutcome::Response(Response::ok(Some(serde_json::json!({
            "authorized": authorized,
        })))))
    }
}

/// Forwards parsed `Entry` values to the repository sink.
pub struct DataHandler {
    repo: Arc<Mutex<dyn Repository + Send>>,
}

impl DataHandler {
    pub fn new(repo: Arc<Mutex<dyn Repository + Send>>) -> Self {
        Self { repo }
    }
}

impl MsgHandler for DataHandler {
    fn handle(&mut self, payload: &serde_json::Value) -> Result<HandlerOutcome, DaemonError> {
        let request: DataRequest = serde_json::from_value(payload.clone())?;
        let entry = kpr_repo::Entry {
            username: request.username,
            entry: request.entry,
        };

        match self.repo.lock().add(&entry) {
            Ok(()) => Ok(HandlerOutcome::Response(Response::ok(None))),
            Err(err) => Ok(HandlerOutcome::Response(Response::error(1, err.to_string()))),
        }
    }
}

#[cfg(test)]
#[path = "handlers_tests.rs"]
mod handlers_tests;
