// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deletion strategies: the one polymorphic seam the review workflow calls
//! through once it has decided which files go.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use md5::{Digest, Md5};
use tracing::info;

use crate::error::WorkflowError;

/// Applies a deletion decision to one file. Implementations must not panic;
/// a single file's failure is logged by the caller and does not abort the
/// group.
pub trait DeletionStrategy: Send + Sync {
    fn apply(&self, path: &Path) -> Result<(), WorkflowError>;
}

/// Unlinks the file outright.
#[derive(Debug, Default)]
pub struct Permanent;

impl DeletionStrategy for Permanent {
    fn apply(&self, path: &Path) -> Result<(), WorkflowError> {
        fs::remove_file(path).map_err(|source| WorkflowError::Delete {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "deleted");
        Ok(())
    }
}

/// Moves the file into `backup_dir/<md5(parent_dir)>/<filename>` and appends
/// `<orig>|<backup>\n` to a per-session journal created lazily on first move.
pub struct BackupAndDelete {
    backup_dir: PathBuf,
    journal_path: PathBuf,
    journal: Mutex<Option<File>>,
}

impl BackupAndDelete {
    /// `session_stamp` is the `YYYYMMDD_HHMMSS` token used to name the
    /// journal file; callers derive it from the current time so this type
    /// stays free of a `Clock` dependency.
    pub fn new(backup_dir: impl Into<PathBuf>, session_stamp: &str) -> std::io::Result<Self> {
        let backup_dir = backup_dir.into();
        fs::create_dir_all(&backup_dir)?;
        let journal_path = backup_dir.join(format!("deleted_files_{session_stamp}.log"));
        Ok(Self {
            backup_dir,
            journal_path,
            journal: Mutex::new(None),
        })
    }

    pub fn journal_file(&self) -> &Path {
        &self.journal_path
    }

    fn bucket_for(&self, parent: &Path) -> String {
        let mut hasher = Md5::new();
        hasher.update(parent.to_string_lossy().as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl DeletionStrategy for BackupAndDelete {
    fn apply(&self, path: &Path) -> Result<(), WorkflowError> {
        if !path.exists() {
            return Ok(());
        }

        let abs = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(path))
                .unwrap_or_else(|_| path.to_path_buf())
        };

        let parent = abs.parent().unwrap_or_else(|| Path::new(""));
        let bucket = self.bucket_for(parent);
        let bucket_dir = self.backup_dir.join(&bucket);
        fs::create_dir_all(&bucket_dir).map_err(|source| WorkflowError::Backup {
            path: abs.clone(),
            source,
        })?;

        let filename = abs.file_name().ok_or_else(|| WorkflowError::Backup {
            path: abs.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no filename"),
        })?;
        let backup_path = bucket_dir.join(filename);

        {
            let mut guard = self.journal.lock().unwrap_or_else(|e| e.into_inner());
            if guard.is_none() {
                let file = std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&self.journal_path)
                    .map_err(|source| WorkflowError::Journal {
                        path: self.journal_path.clone(),
                        source,
                    })?;
                *guard = Some(file);
            }
            if let Some(file) = guard.as_mut() {
                writeln!(file, "{}|{}", abs.display(), backup_path.display()).map_err(
                    |source| WorkflowError::Journal {
                        path: self.journal_path.clone(),
                        source,
                    },
                )?;
            }
        }

        fs::rename(&abs, &backup_path).map_err(|source| WorkflowError::Backup {
            path: abs.clone(),
            source,
        })?;
        info!(from = %abs.display(), to = %backup_path.display(), "moved to backup");
        Ok(())
    }
}

/// Logs what would happen without touching the filesystem.
#[derive(Debug, Default)]
pub struct DryRun;

impl DeletionStrategy for DryRun {
    fn apply(&self, path: &Path) -> Result<(), WorkflowError> {
        info!(path = %path.display(), "would delete");
        Ok(())
    }
}

#[cfg(test)]
#[path = "strategy_tests.rs"]
mod strategy_tests;
