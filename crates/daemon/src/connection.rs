// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-peer socket handling. One `Connection::run` task owns a TCP socket
//! end to end: reads are pushed up the `ConnEvent` channel, writes are
//! drained from a queue fed by `Communicator`, and the idle timer (if armed)
//! resets itself on every fire. Modelled on the `tokio::select!` bridge in
//! the agent-attach proxy, generalized from a WebSocket pair to a raw TCP
//! stream plus a length-prefixed frame queue.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use kpr_wire::Packer;

/// Events pushed from the connection task to whatever drives the
/// per-connection state machine (`AgentConnection`, or a plain echo in tests).
#[derive(Debug)]
pub enum ConnEvent {
    /// Raw bytes read off the socket; not yet deframed.
    Data(Vec<u8>),
    /// The idle timer fired with no re-arm in between.
    Timeout,
    Error(String),
    Disconnected,
}

/// One queued outbound message: the unframed payload plus an ack channel
/// fired once the framed bytes are fully written.
pub type OutboundFrame = (Vec<u8>, oneshot::Sender<()>);

pub struct Connection {
    stream: TcpStream,
    read_buf_size: usize,
    idle_timeout: Option<Duration>,
}

impl Connection {
    pub fn new(stream: TcpStream, read_buf_size: usize, idle_timeout: Option<Duration>) -> Self {
        Self {
            stream,
            read_buf_size,
            idle_timeout,
        }
    }

    /// Spawns the event loop task. `events` receives raw reads and control
    /// events; `writes` is drained here so frame ordering is structural
    /// (a single task owns the socket) rather than lock-guarded.
    pub fn run(self, events: mpsc::Sender<ConnEvent>, mut writes: mpsc::Receiver<OutboundFrame>) -> JoinHandle<()> {
        let Connection {
            stream,
            read_buf_size,
            idle_timeout,
        } = self;

        tokio::spawn(async move {
            let (mut read_half, mut write_half) = stream.into_split();
            let mut buf = vec![0u8; read_buf_size];

            loop {
                let idle = async {
                    match idle_timeout {
                        Some(d) => tokio::time::sleep(d).await,
                        None => std::future::pending::<()>().await,
                    }
                };

                tokio::select! {
                    result = read_half.read(&mut buf) => {
                        match result {
                            Ok(0) => {
                                let _ = events.send(ConnEvent::Disconnected).await;
                                break;
                            }
                            Ok(n) => {
                                if events.send(ConnEvent::Data(buf[..n].to_vec())).await.is_err() {
                                    break;
                                }
                            }
                            Err(err) => {
                                let _ = events.send(ConnEvent::Error(err.to_string())).await;
                                break;
                            }
                        }
                    }
                    frame = writes.recv() => {
                        let Some((payload, ack)) = frame else {
                            // Communicator dropped; keep reading until the peer closes.
                            continue;
                        };
                        let mut packer = Packer::new(&payload);
                        let mut framed = Vec::new();
                        let mut chunk = Vec::new();
                        loop {
                            chunk.clear();
                            let n = packer.get(&mut chunk, 64 * 1024);
                            if n == 0 {
                                break;
                            }
                            framed.extend_from_slice(&chunk);
                        }
                        if let Err(err) = write_half.write_all(&framed).await {
                            let _ = events.send(ConnEvent::Error(err.to_string())).await;
                            break;
                        }
                        let _ = ack.send(());
                    }
                    _ = idle => {
                        if events.send(ConnEvent::Timeout).await.is_err() {
                            break;
                        }
                    }
                }
            }
        })
    }
}

#[cfg(test)]
#[path = "connection_tests.rs"]
mod connection_tests;
