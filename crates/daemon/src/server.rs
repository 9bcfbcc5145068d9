// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Loopback-only TCP acceptor. Spec §4.9: `create_connection` is pluggable
//! so `AgentManager`-backed production wiring and a plain test double share
//! the same accept loop.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use crate::agent_connection::ConnId;
use crate::error::DaemonError;

pub trait ConnectionFactory: Send + Sync {
    /// Spawns whatever task drives this peer and returns its handle.
    fn create(&self, conn_id: ConnId, stream: TcpStream) -> JoinHandle<()>;
}

pub struct Server {
    listener: TcpListener,
    factory: Arc<dyn ConnectionFactory>,
    next_conn_id: AtomicU64,
}

impl Server {
    pub async fn bind(port: u16, factory: Arc<dyn ConnectionFactory>) -> Result<Self, DaemonError> {
        let addr: SocketAddr = ([127, 0, 0, 1], port).into();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|err| DaemonError::BindFailed(addr, err))?;
        Ok(Self {
            listener,
            factory,
            next_conn_id: AtomicU64::new(1),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections until `shutdown` resolves, spawning one task per
    /// peer via the connection factory.
    pub async fn serve(&self, shutdown: impl std::future::Future<Output = ()>) {
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            let conn_id = ConnId::new(self.next_conn_id.fetch_add(1, Ordering::Relaxed));
                            tracing::debug!(conn = ?conn_id, %peer, "accepted connection");
                            self.factory.create(conn_id, stream);
                        }
                        Err(err) => {
                            tracing::warn!(error = %err, "accept failed");
                        }
                    }
                }
                _ = &mut shutdown => break,
            }
        }
    }
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod server_tests;
