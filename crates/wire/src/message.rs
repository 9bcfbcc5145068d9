// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire message types. Field names and tag/content shapes are part of the
//! wire contract (spec §3.2/§6.1) — do not rename without a protocol
//! version bump.

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::WireError;

/// `{"name":"auth"|"data","message":{...}}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "name", content = "message", rename_all = "snake_case")]
pub enum WireMessage {
    Auth(AuthRequest),
    Data(DataRequest),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthRequest {
    pub username: String,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataRequest {
    pub username: String,
    pub entry: Entry,
}

/// `{"status":int, "error":"<str?>", "answer":{...?}}`; status `0` means ok.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Response {
    pub status: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<serde_json::Value>,
}

impl Response {
    pub fn ok(answer: Option<serde_json::Value>) -> Self {
        Self {
            status: 0,
            error: None,
            answer,
        }
    }

    pub fn error(status: i32, message: impl Into<String>) -> Self {
        Self {
            status,
            error: Some(message.into()),
            answer: None,
        }
    }
}

/// One probe-loop observation: the foreground process, window, and capture
/// timestamp. Field names (`proc`/`wnd`/`ts`/`lt`/`wh`) mirror spec §6.1
/// exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entry {
    pub proc: ProcessInfo,
    pub wnd: WindowInfo,
    pub ts: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessInfo {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WindowInfo {
    pub title: String,
    /// Top-left corner, `[x, y]`.
    pub lt: (i32, i32),
    /// Width/height, `[w, h]`.
    pub wh: (u32, u32),
    pub img: Image,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Image {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes: Option<String>,
    pub encoded: bool,
}

impl Image {
    /// No snapshot attached.
    pub fn none() -> Self {
        Self {
            name: None,
            bytes: None,
            encoded: false,
        }
    }

    /// Base64-decodes `bytes` when `encoded` is set. Decode length comes
    /// entirely from the base64 input, never a trailing-NUL heuristic.
    pub fn decode_bytes(&self) -> Result<Option<Vec<u8>>, WireError> {
        match (&self.bytes, self.encoded) {
            (Some(encoded), true) => {
                let decoded = base64::engine::general_purpose::STANDARD.decode(encoded)?;
                Ok(Some(decoded))
            }
            _ => Ok(None),
        }
    }

    pub fn encode_bytes(name: impl Into<String>, raw: &[u8]) -> Self {
        Self {
            name: Some(name.into()),
            bytes: Some(base64::engine::general_purpose::STANDARD.encode(raw)),
            encoded: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Timestamp {
    /// Milliseconds since the Unix epoch.
    pub when: i64,
    /// Capture duration in milliseconds.
    pub dur: u64,
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod message_tests;
