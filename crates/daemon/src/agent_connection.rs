// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-connection state machine: `Connected -> Authorized ->
//! Disconnected`, exactly per spec §4.8. Driven by the `ConnEvent` stream
//! from a `Connection` task; the only other communication with the rest of
//! the daemon is through `AgentManager::on_auth_result`.

use std::sync::Arc;

use kpr_agent::ActiveUserProbe;

use crate::communicator::Communicator;
use crate::connection::ConnEvent;
use crate::handlers::{AuthorizationHandler, DataHandler, HandlerOutcome, MsgHandler};
use crate::manager::AgentManager;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnId(u64);

impl ConnId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    Authorized,
    Disconnected,
}

pub struct AgentConnection<U: ActiveUserProbe> {
    id: ConnId,
    communicator: Communicator,
    auth_handler: AuthorizationHandler,
    data_handler: DataHandler,
    state: ConnectionState,
    manager: Arc<AgentManager>,
    active_user_probe: U,
}

/// Notifies the manager with `(conn_id, false)` exactly once, on every exit
/// path out of `run` — normal close, handler error, or task cancellation.
struct DisconnectGuard {
    manager: Arc<AgentManager>,
    id: ConnId,
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        self.manager.on_auth_result(self.id, false);
    }
}

impl<U: ActiveUserProbe> AgentConnection<U> {
    pub fn new(
        id: ConnId,
        communicator: Communicator,
        auth_handler: AuthorizationHandler,
        data_handler: DataHandler,
        manager: Arc<AgentManager>,
        active_user_probe: U,
    ) -> Self {
        Self {
            id,
            communicator,
            auth_handler,
            data_handler,
            state: ConnectionState::Connected,
            manager,
            active_user_probe,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Drives the state machine from `events` until the connection closes.
    pub async fn run(mut self, mut events: tokio::sync::mpsc::Receiver<ConnEvent>) {
        let _guard = DisconnectGuard {
            manager: Arc::clone(&self.manager),
            id: self.id,
        };

        while let Some(event) = events.recv().await {
            match event {
                ConnEvent::Data(bytes) => {
                    let messages = self.communicator.feed(&bytes);
                    let mut should_close = false;
                    for message in messages {
                        if !self.dispatch(&message).await {
                            should_close = true;
                            break;
                        }
                    }
                    if should_close {
                        self.state = ConnectionState::Disconnected;
                        break;
                    }
                }
                ConnEvent::Timeout => {
                    if self.state == ConnectionState::Authorized && self.user_mismatch() {
                        tracing::info!(conn = ?self.id, "active user changed; disconnecting agent");
                        self.state = ConnectionState::Disconnected;
                        break;
                    }
                }
                ConnEvent::Error(err) => {
                    tracing::warn!(conn = ?self.id, error = %err, "connection error");
                    self.state = ConnectionState::Disconnected;
                    break;
                }
                ConnEvent::Disconnected => {
                    self.state = ConnectionState::Disconnected;
                    break;
                }
            }
        }
    }

    fn user_mismatch(&self) -> bool {
        let Some(authorized) = self.auth_handler.authorized_username() else {
            return false;
        };
        if authorized.is_empty() {
            return false;
        }
        match self.active_user_probe.current_user() {
            Some(active) => active != authorized,
            None => false,
        }
    }

    /// Returns `false` if this message should close the connection.
    async fn dispatch(&mut self, raw: &[u8]) -> bool {
        let value: serde_json::Value = match serde_json::from_slice(raw) {
            Ok(v) => v,
            Err(err) => {
                tracing::warn!(conn = ?self.id, error = %err, "malformed payload");
                return false;
            }
        };
        let name = value.get("name").and_then(|v| v.as_str()).unwrap_or("");
        let message = value.get("message").cloned().unwrap_or(serde_json::Value::Null);

        match (self.state, name) {
            (ConnectionState::Connected, "auth") => self.handle_auth(&message).await,
            (ConnectionState::Authorized, "data") => self.handle_data(&message).await,
            _ => {
                tracing::warn!(conn = ?self.id, state = ?self.state, name, "unexpected message for state");
                false
            }
        }
    }

    async fn handle_auth(&mut self, message: &serde_json::Value) -> bool {
        match self.auth_handler.handle(message) {
            Ok(HandlerOutcome::Response(resp)) => {
                let handler_authorized = resp
                    .answer
                    .as_ref()
                    .and_then(|a| a.get("authorized"))
                    .and_then(|v| v.as_bool())
                    .unwrap_or(false);

                // The handler only checks the token; the manager is the
                // actual arbiter of the single authorized slot. Consult it
                // before telling the client anything succeeded.
                let granted = handler_authorized && self.manager.on_auth_result(self.id, true);

                let resp = if granted {
                    resp
                } else {
                    kpr_wire::Response::ok(Some(serde_json::json!({ "authorized": false })))
                };
                self.send(&resp).await;
                if granted {
                    self.state = ConnectionState::Authorized;
                }
                true
            }
            Err(err) => {
                tracing::warn!(conn = ?self.id, error = %err, "auth handler failed");
                false
            }
        }
    }

    async fn handle_data(&mut self, message: &serde_json::Value) -> bool {
        match self.data_handler.handle(message) {
            Ok(HandlerOutcome::Response(resp)) => {
                self.send(&resp).await;
                true
            }
            Err(err) => {
                tracing::warn!(conn = ?self.id, error = %err, "data handler failed");
                false
            }
        }
    }

    async fn send(&self, response: &kpr_wire::Response) {
        match serde_json::to_vec(response) {
            Ok(bytes) => {
                let _ = self.communicator.send_async(bytes).await;
            }
            Err(err) => tracing::warn!(conn = ?self.id, error = %err, "failed to encode response"),
        }
    }
}

#[cfg(test)]
#[path = "agent_connection_tests.rs"]
mod agent_connection_tests;
