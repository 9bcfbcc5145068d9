// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Frame codec, wire message types, and the async framing convenience layer
//! shared by the agent and daemon.
//!
//! Wire format: 8-byte length prefix (little-endian) + UTF-8 JSON payload.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod codec;
mod error;
mod framing;
mod message;

pub use codec::{Packer, Unpacker, UnpackerState, HEADER_LEN};
pub use error::WireError;
pub use framing::{read_message, write_message};
pub use message::{
    AuthRequest, DataRequest, Entry, Image, ProcessInfo, Response, Timestamp, WindowInfo,
    WireMessage,
};
