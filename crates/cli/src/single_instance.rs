// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The same `kmuid-<role>[-<user>]` named-mutex contract as
//! `kpr_daemon::config::acquire_single_instance_lock` (spec §6.3), kept as
//! its own ~20 lines here rather than pulling in the daemon crate for one
//! function — `kpr-cli` has no other reason to depend on `kpr-daemon`.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::CliError;

pub fn acquire(runtime_dir: &Path, role: &str) -> Result<File, CliError> {
    std::fs::create_dir_all(runtime_dir).map_err(|source| CliError::Io {
        path: runtime_dir.to_path_buf(),
        source,
    })?;

    let lock_path: PathBuf = runtime_dir.join(format!("kmuid-{role}.lock"));
    let lock_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&lock_path)
        .map_err(|source| CliError::Io {
            path: lock_path.clone(),
            source,
        })?;
    lock_file
        .try_lock_exclusive()
        .map_err(|_| CliError::AlreadyRunning(lock_path))?;
    Ok(lock_file)
}

#[cfg(test)]
#[path = "single_instance_tests.rs"]
mod single_instance_tests;
