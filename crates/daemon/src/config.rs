// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration and the `fs2`-based single-instance guard that
//! implements the named-mutex contract of spec §6.3
//! (`kmuid-<role>[-<user>]`).

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::Duration;

use fs2::FileExt;
use serde::Deserialize;

use crate::error::DaemonError;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub port: u16,
    pub activity_check_interval_ms: u64,
    pub spawn_agent: bool,
    pub passive: bool,
    pub read_buffer_size: usize,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            port: 7890,
            activity_check_interval_ms: 5_000,
            spawn_agent: true,
            passive: false,
            read_buffer_size: 4096,
        }
    }
}

impl WatchConfig {
    pub fn load(path: &Path) -> Result<Self, DaemonError> {
        let text = std::fs::read_to_string(path).map_err(|source| DaemonError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|err| DaemonError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, err),
        })
    }

    pub fn activity_check_interval(&self) -> Duration {
        Duration::from_millis(self.activity_check_interval_ms)
    }

    /// `activityCheckInterval + 2s` default per spec §5 — the idle timer
    /// fires even on a busy connection; its job is the active-user check.
    pub fn peer_drop_timeout(&self) -> Duration {
        self.activity_check_interval() + Duration::from_secs(2)
    }
}

pub struct Config {
    pub state_dir: PathBuf,
    pub reports_dir: PathBuf,
    pub log_path: PathBuf,
    pub watch: WatchConfig,
}

impl Config {
    pub fn load(config_path: Option<&Path>) -> Result<Self, DaemonError> {
        let state_dir = state_dir()?;
        let watch = match config_path {
            Some(path) => WatchConfig::load(path)?,
            None => WatchConfig::default(),
        };
        Ok(Self {
            reports_dir: state_dir.join("reports"),
            log_path: state_dir.join("watchd.log"),
            state_dir,
            watch,
        })
    }
}

/// `KPR_STATE_DIR` > `XDG_STATE_HOME/kidmon` > platform app-data dir /
/// `kidmon`, mirroring the original `<data>/kidmon/...` layout.
pub fn state_dir() -> Result<PathBuf, DaemonError> {
    if let Ok(dir) = std::env::var("KPR_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("kidmon"));
    }
    dirs::data_dir().map(|dir| dir.join("kidmon")).ok_or(DaemonError::NoStateDir)
}

/// Acquires the named-mutex equivalent: an advisory exclusive lock on
/// `<runtime_dir>/kmuid-<role>[-<user>].lock`. Held for the process
/// lifetime; dropping the returned `File` releases it.
pub fn acquire_single_instance_lock(runtime_dir: &Path, role: &str, user: Option<&str>) -> Result<File, DaemonError> {
    std::fs::create_dir_all(runtime_dir).map_err(|source| DaemonError::Io {
        path: runtime_dir.to_path_buf(),
        source,
    })?;

    let file_name = match user {
        Some(user) => format!("kmuid-{role}-{user}.lock"),
        None => format!("kmuid-{role}.lock"),
    };
    let lock_path = runtime_dir.join(file_name);

    let lock_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&lock_path)
        .map_err(|source| DaemonError::Io {
            path: lock_path.clone(),
            source,
        })?;
    lock_file
        .try_lock_exclusive()
        .map_err(|_| DaemonError::LockFailed(lock_path))?;
    Ok(lock_file)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
