// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `Communicator`: deframes inbound bytes through an `Unpacker` and queues
//! outbound payloads so `send_async` returns immediately while acks fire in
//! submission order. The write queue's receiving half is drained by
//! `Connection::run`, never a second writer, so FIFO ordering falls out of
//! there being exactly one task touching the socket.

use tokio::sync::{mpsc, oneshot};

use kpr_wire::{Unpacker, UnpackerState};

use crate::connection::OutboundFrame;

pub struct Communicator {
    unpacker: Unpacker,
    writes: mpsc::Sender<OutboundFrame>,
    /// Bytes drained for the message currently being assembled, in case a
    /// single frame's payload is larger than one `get()` scratch cap.
    current: Vec<u8>,
}

impl Communicator {
    pub fn new(writes: mpsc::Sender<OutboundFrame>) -> Self {
        Self {
            unpacker: Unpacker::default(),
            writes,
            current: Vec::new(),
        }
    }

    /// Enqueues `payload` for framing and writing. The returned receiver
    /// resolves once the frame has been fully written to the socket;
    /// callers that don't care about the ack may drop it.
    pub async fn send_async(&self, payload: Vec<u8>) -> oneshot::Receiver<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        // A closed receiver just means the connection task already exited;
        // the caller's close path handles that via ConnEvent::Disconnected.
        let _ = self.writes.send((payload, ack_tx)).await;
        ack_rx
    }

    /// Feeds raw bytes read off the socket into the deframer and returns
    /// every complete message payload drained as a result. May return zero,
    /// one, or several messages for a single read.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Vec<u8>> {
        self.unpacker.put(bytes);
        let mut messages = Vec::new();
        loop {
            let mut scratch = Vec::new();
            match self.unpacker.get(&mut scratch, 64 * 1024) {
                UnpackerState::Ready => {
                    self.current.extend_from_slice(&scratch);
                    messages.push(std::mem::take(&mut self.current));
                }
                UnpackerState::HasMore => {
                    self.current.extend_from_slice(&scratch);
                }
                UnpackerState::NeedMore => break,
            }
        }
        messages
    }
}

#[cfg(test)]
#[path = "communicator_tests.rs"]
mod communicator_tests;
