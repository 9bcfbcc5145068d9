// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The foreground probe loop. One call to [`ProbeLoop::tick`] corresponds to
//! one `collectData` pass of the original agent: read the foreground
//! window, hash its owner executable, optionally grab a snapshot, and send
//! the observation as a `data` message.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use kpr_core::Clock;
use kpr_wire::{DataRequest, Entry, Image, ProcessInfo, Timestamp, WindowInfo, WireMessage};
use tokio::io::AsyncWrite;

use crate::error::AgentError;
use crate::hash::CachedFileSha256;
use crate::os::{ForegroundWindowProbe, Rect, ScreenCapture};

/// Drives one polling cycle of the agent: read the foreground window,
/// optionally snapshot it, and emit a [`WireMessage::Data`].
pub struct ProbeLoop<C: Clock, F: ForegroundWindowProbe, S: ScreenCapture> {
    clock: C,
    window_probe: F,
    screen: S,
    hasher: CachedFileSha256,
    username: String,
    take_snapshots: bool,
    snapshot_interval: Duration,
    next_capture_time: Option<Instant>,
}

impl<C: Clock, F: ForegroundWindowProbe, S: ScreenCapture> ProbeLoop<C, F, S> {
    pub fn new(
        clock: C,
        window_probe: F,
        screen: S,
        username: impl Into<String>,
        take_snapshots: bool,
        snapshot_interval: Duration,
    ) -> Self {
        Self {
            clock,
            window_probe,
            screen,
            hasher: CachedFileSha256::new(),
            username: username.into(),
            take_snapshots,
            snapshot_interval,
            next_capture_time: None,
        }
    }

    /// Runs one tick. A failure anywhere in the pass is logged at `warn` and
    /// swallowed — the caller schedules the next tick regardless.
    pub async fn tick<W: AsyncWrite + Unpin>(&mut self, writer: &mut W) {
        if let Err(err) = self.try_tick(writer).await {
            tracing::warn!(error = %err, "probe tick failed");
        }
    }

    async fn try_tick<W: AsyncWrite + Unpin>(&mut self, writer: &mut W) -> Result<(), AgentError> {
        let Some(window) = self.window_probe.current() else {
            tracing::warn!("unable to detect foreground window");
            return Ok(());
        };

        if window.owner_path.as_os_str().is_empty() {
            tracing::warn!(pid = window.owner_pid, "unable to retrieve owner process path");
            return Ok(());
        }

        let sha256 = self.hasher.get(&window.owner_path).ok();
        let when = self.clock.epoch_ms() as i64;

        let mut img = Image::none();
        let now = self.clock.now();
        let due = self.next_capture_time.map(|next| now >= next).unwrap_or(true);
        if self.take_snapshots && due {
            self.next_capture_time = Some(now + self.snapshot_interval);
            match self.screen.capture(window.rect) {
                Ok(bytes) => {
                    let name = snapshot_name(when);
                    img = Image::encode_bytes(name, &bytes);
                }
                Err(err) => {
                    tracing::warn!(error = %err, "snapshot capture failed");
                }
            }
        }

        let entry = Entry {
            proc: ProcessInfo {
                path: window.owner_path.display().to_string(),
                sha256,
            },
            wnd: WindowInfo {
                title: window.title,
                lt: (window.rect.x, window.rect.y),
                wh: (window.rect.w, window.rect.h),
                img,
            },
            ts: Timestamp { when, dur: 0 },
        };

        let message = WireMessage::Data(DataRequest {
            username: self.username.clone(),
            entry,
        });
        let payload = serde_json::to_vec(&message)?;
        kpr_wire::write_message(writer, &payload).await?;
        Ok(())
    }
}

/// `img-MMDD-HHMMSS.jpg`, matching the on-disk naming convention the
/// repository expects.
fn snapshot_name(epoch_ms: i64) -> String {
    let datetime: DateTime<Utc> =
        DateTime::from_timestamp_millis(epoch_ms).unwrap_or_else(|| DateTime::from_timestamp(0, 0).unwrap());
    format!("img-{}.jpg", datetime.format("%m%d-%H%M%S"))
}

#[cfg(test)]
#[path = "tick_tests.rs"]
mod tick_tests;
