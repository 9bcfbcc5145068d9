// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! kpr-agent: the OS leaf-interface contracts (foreground window, screen
//! capture, process launch, active-user probe) and the foreground probe
//! loop built on top of them. No platform backend ships here — see
//! `kpr-agent::os` for the scope carve-out.

pub mod error;
pub mod hash;
pub mod os;
pub mod tick;

pub use error::AgentError;
pub use hash::CachedFileSha256;
pub use os::{
    ActiveUserProbe, ForegroundWindow, ForegroundWindowProbe, LocalActiveUserProbe,
    NullForegroundWindowProbe, NullProcessLauncher, NullScreenCapture, ProcessLauncher, Rect,
    ScreenCapture,
};
pub use tick::ProbeLoop;
