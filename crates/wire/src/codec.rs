// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sans-IO frame codec: an 8-byte little-endian length prefix followed by
//! exactly that many payload bytes. `Packer`/`Unpacker` never touch a
//! socket directly — callers drive them with whatever bytes they have on
//! hand, in whatever chunks arrive.

pub const HEADER_LEN: usize = 8;

/// Single-use framer over one message. Construct, then call [`get`](Packer::get)
/// repeatedly until it returns `0`.
pub struct Packer {
    framed: Vec<u8>,
    offset: usize,
}

impl Packer {
    pub fn new(payload: &[u8]) -> Self {
        let mut framed = Vec::with_capacity(HEADER_LEN + payload.len());
        framed.extend_from_slice(&(payload.len() as u64).to_le_bytes());
        framed.extend_from_slice(payload);
        Self { framed, offset: 0 }
    }

    /// Appends up to `max` bytes to `out`, returning the count appended.
    /// `0` means the frame (header + payload) is exhausted.
    pub fn get(&mut self, out: &mut Vec<u8>, max: usize) -> usize {
        let remaining = self.framed.len() - self.offset;
        let n = remaining.min(max);
        out.extend_from_slice(&self.framed[self.offset..self.offset + n]);
        self.offset += n;
        n
    }
}

/// Where a streaming [`Unpacker`] is in deframing the current message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnpackerState {
    /// Fewer than 8 buffered bytes, or payload not fully buffered yet.
    NeedMore,
    /// Header is known and there is buffered payload left to drain via `get`.
    HasMore,
    /// The current message's payload has been fully drained.
    Ready,
}

/// Streaming deframer. Feed it arbitrary byte chunks via [`put`](Unpacker::put);
/// drain complete messages via [`get`](Unpacker::get) in a loop until it
/// stops returning `Ready`.
pub struct Unpacker {
    buf: Vec<u8>,
    offset: usize,
    payload_len: Option<u64>,
    remaining: u64,
    compact_threshold: usize,
}

impl Unpacker {
    /// `compact_threshold` bounds how far `offset` is allowed to drift
    /// before the consumed prefix is dropped from `buf`.
    pub fn new(compact_threshold: usize) -> Self {
        Self {
            buf: Vec::new(),
            offset: 0,
            payload_len: None,
            remaining: 0,
            compact_threshold,
        }
    }

    pub fn put(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
        self.try_read_header();
    }

    /// The current frame's declared payload length, once the 8-byte header
    /// has been consumed.
    pub fn size(&self) -> Option<u64> {
        self.payload_len
    }

    pub fn status(&self) -> UnpackerState {
        match self.payload_len {
            None => UnpackerState::NeedMore,
            Some(_) if self.remaining == 0 => UnpackerState::Ready,
            Some(_) if self.buffered() > 0 => UnpackerState::HasMore,
            Some(_) => UnpackerState::NeedMore,
        }
    }

    /// Copies `min(max, remaining_payload, buffered)` bytes into `out`.
    pub fn get(&mut self, out: &mut Vec<u8>, max: usize) -> UnpackerState {
        let n = (max as u64).min(self.remaining).min(self.buffered() as u64) as usize;
        out.extend_from_slice(&self.buf[self.offset..self.offset + n]);
        self.offset += n;
        self.remaining -= n as u64;
        self.compact();

        if self.remaining == 0 {
            self.payload_len = None;
            self.try_read_header();
            UnpackerState::Ready
        } else if self.buffered() > 0 {
            UnpackerState::HasMore
        } else {
            UnpackerState::NeedMore
        }
    }

    fn buffered(&self) -> usize {
        self.buf.len() - self.offset
    }

    fn try_read_header(&mut self) {
        if self.payload_len.is_some() || self.buffered() < HEADER_LEN {
            return;
        }
        let mut len_bytes = [0u8; HEADER_LEN];
        len_bytes.copy_from_slice(&self.buf[self.offset..self.offset + HEADER_LEN]);
        self.offset += HEADER_LEN;
        let len = u64::from_le_bytes(len_bytes);
        self.payload_len = Some(len);
        self.remaining = len;
        self.compact();
    }

    fn compact(&mut self) {
        if self.offset > self.compact_threshold {
            self.buf.drain(0..self.offset);
            self.offset = 0;
        }
    }
}

impl Default for Unpacker {
    fn default() -> Self {
        Self::new(64 * 1024)
    }
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod codec_tests;
