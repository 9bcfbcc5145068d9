// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! OS leaf interfaces. These are contracts only — no platform backend ships
//! here, per the workspace's explicit scope carve-out. Every trait the
//! daemon and probe loop call through is defined so the rest of the
//! workspace compiles and tests against a deterministic fake.

use std::path::{Path, PathBuf};

use crate::error::AgentError;

/// Screen-space rectangle, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForegroundWindow {
    pub title: String,
    pub rect: Rect,
    pub owner_pid: u32,
    pub owner_path: PathBuf,
}

pub trait ForegroundWindowProbe {
    fn current(&self) -> Option<ForegroundWindow>;
}

pub trait ScreenCapture {
    /// Captures `rect` and returns JPEG-encoded bytes.
    fn capture(&self, rect: Rect) -> Result<Vec<u8>, AgentError>;
}

pub trait ProcessLauncher {
    fn launch_as_interactive_user(&self, exe: &Path, args: &[String]) -> Result<u32, AgentError>;
}

pub trait ActiveUserProbe {
    fn current_user(&self) -> Option<String>;
}

/// Reads the interactive user from the environment. Needs no OS-specific
/// crate, so it's the one leaf interface shipped with a real backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalActiveUserProbe;

impl ActiveUserProbe for LocalActiveUserProbe {
    fn current_user(&self) -> Option<String> {
        std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .ok()
            .filter(|s| !s.is_empty())
    }
}

/// Test double: never reports a foreground window.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullForegroundWindowProbe;

impl ForegroundWindowProbe for NullForegroundWindowProbe {
    fn current(&self) -> Option<ForegroundWindow> {
        None
    }
}

/// Test double: captures always fail.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullScreenCapture;

impl ScreenCapture for NullScreenCapture {
    fn capture(&self, _rect: Rect) -> Result<Vec<u8>, AgentError> {
        Err(AgentError::Capture(
            "no screen capture backend configured".to_string(),
        ))
    }
}

/// Test double: launches never succeed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProcessLauncher;

impl ProcessLauncher for NullProcessLauncher {
    fn launch_as_interactive_user(
        &self,
        _exe: &Path,
        _args: &[String],
    ) -> Result<u32, AgentError> {
        Err(AgentError::Launch(
            "no process launcher backend configured".to_string(),
        ))
    }
}

#[cfg(test)]
#[path = "os_tests.rs"]
mod os_tests;
