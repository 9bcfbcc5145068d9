// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! TOML configuration for `dups`. Mirrors spec §6.4's key set; unknown keys
//! are ignored (`serde`'s default struct behavior) and every key has a
//! sensible default so a missing or partial config file is never fatal.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::CliError;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DupeConfig {
    pub scan_directories: Vec<PathBuf>,
    pub exclusion_patterns: Vec<String>,
    pub preferred_deletion_dirs: Vec<String>,
    pub min_file_size_bytes: u64,
    pub max_file_size_bytes: u64,
    pub update_freq_ms: u64,
    pub all_files: String,
    pub dup_files: String,
    pub ign_files: String,
    pub dry_run: bool,
}

impl Default for DupeConfig {
    fn default() -> Self {
        Self {
            scan_directories: Vec::new(),
            exclusion_patterns: Vec::new(),
            preferred_deletion_dirs: Vec::new(),
            min_file_size_bytes: 1024,
            max_file_size_bytes: 10 * 1024 * 1024 * 1024,
            update_freq_ms: 100,
            all_files: "all.txt".to_string(),
            dup_files: "duplicates.txt".to_string(),
            ign_files: "ignored.txt".to_string(),
            dry_run: false,
        }
    }
}

impl DupeConfig {
    /// A missing config file is not an error — a fresh run with no config
    /// yet should still work from defaults, same as the original's
    /// `applyOverrides` treating a missing file as a no-op.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| CliError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Relative `all_files`/`dup_files`/`ign_files` paths are rebased under
    /// the platform application data directory (spec §6.4); absolute paths
    /// pass through untouched.
    pub fn rebase_output_paths(&self, data_dir: &Path) -> (PathBuf, PathBuf, PathBuf) {
        (
            rebase(data_dir, &self.all_files),
            rebase(data_dir, &self.dup_files),
            rebase(data_dir, &self.ign_files),
        )
    }
}

fn rebase(data_dir: &Path, relpath: &str) -> PathBuf {
    let path = PathBuf::from(relpath);
    if path.is_absolute() {
        path
    } else {
        data_dir.join(path)
    }
}

/// `DUPS_DATA_DIR` > platform application data dir / `dups`, same
/// env-override-first shape as `kpr_daemon::config::state_dir` so specs can
/// point a run at a scratch directory instead of the real home directory.
pub fn data_dir() -> Result<PathBuf, CliError> {
    if let Ok(dir) = std::env::var("DUPS_DATA_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::data_dir().map(|dir| dir.join("dups")).ok_or(CliError::NoDataDir)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
