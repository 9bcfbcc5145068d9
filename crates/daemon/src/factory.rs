// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Production `ConnectionFactory`: wires a freshly-accepted socket into a
//! `Connection` + `Communicator` + `AgentConnection` triple and spawns the
//! state-machine task. Kept separate from `server.rs` so the accept loop
//! stays testable against the plain `CountingFactory` double.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use kpr_agent::ActiveUserProbe;
use kpr_repo::Repository;

use crate::agent_connection::{AgentConnection, ConnId};
use crate::communicator::Communicator;
use crate::connection::Connection;
use crate::handlers::{AuthorizationHandler, DataHandler};
use crate::manager::AgentManager;
use crate::server::ConnectionFactory;

pub struct DaemonConnectionFactory<U: ActiveUserProbe + Clone + Send + 'static> {
    manager: Arc<AgentManager>,
    shared_token: Arc<Mutex<Option<String>>>,
    repo: Arc<Mutex<dyn Repository + Send>>,
    active_user_probe: U,
    read_buf_size: usize,
    idle_timeout: Duration,
}

impl<U: ActiveUserProbe + Clone + Send + 'static> DaemonConnectionFactory<U> {
    pub fn new(
        manager: Arc<AgentManager>,
        shared_token: Arc<Mutex<Option<String>>>,
        repo: Arc<Mutex<dyn Repository + Send>>,
        active_user_probe: U,
        read_buf_size: usize,
        idle_timeout: Duration,
    ) -> Self {
        Self {
            manager,
            shared_token,
            repo,
            active_user_probe,
            read_buf_size,
            idle_timeout,
        }
    }
}

impl<U: ActiveUserProbe + Clone + Send + 'static> ConnectionFactory for DaemonConnectionFactory<U> {
    fn create(&self, conn_id: ConnId, stream: TcpStream) -> JoinHandle<()> {
        let (events_tx, events_rx) = mpsc::channel(32);
        let (writes_tx, writes_rx) = mpsc::channel(32);

        Connection::new(stream, self.read_buf_size, Some(self.idle_timeout)).run(events_tx, writes_rx);

        let communicator = Communicator::new(writes_tx);
        let auth_handler = AuthorizationHandler::new(Arc::clone(&self.shared_token));
        let data_handler = DataHandler::new(Arc::clone(&self.repo));
        let agent_connection = AgentConnection::new(
            conn_id,
            communicator,
            auth_handler,
            data_handler,
            Arc::clone(&self.manager),
            self.active_user_probe.clone(),
        );

        tokio::spawn(agent_connection.run(events_rx))
    }
}
