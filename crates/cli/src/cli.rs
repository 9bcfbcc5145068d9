// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command-line surface for `dups` and the merge of its flags over a
//! loaded [`DupeConfig`] (spec §6.3).

use std::path::PathBuf;

use clap::Parser;

use crate::config::DupeConfig;

#[derive(Parser, Debug)]
#[command(name = "dups", about = "Scan for and interactively resolve duplicate files")]
pub struct Cli {
    /// TOML config file; a missing file falls back to built-in defaults.
    #[arg(long, default_value = "dups.toml")]
    pub cfg_file: PathBuf,

    /// Directory to scan. Repeatable; extends `scan_directories`.
    #[arg(long = "scan-dir")]
    pub scan_dir: Vec<PathBuf>,

    /// Exclude regex pattern. Repeatable; extends `exclusion_patterns`.
    #[arg(long)]
    pub exclude: Vec<String>,

    /// Path substring to keep from, for this run only.
    #[arg(long = "keep-path")]
    pub keep_path: Vec<String>,

    /// Path substring to delete from, for this run only.
    #[arg(long = "delete-path")]
    pub delete_path: Vec<String>,

    /// Ignore files smaller than this (bytes).
    #[arg(long = "min-size")]
    pub min_size: Option<u64>,

    /// Ignore files larger than this (bytes); 0 means unbounded.
    #[arg(long = "max-size")]
    pub max_size: Option<u64>,

    /// Progress update frequency (ms, 0 disables).
    #[arg(long = "update-freq")]
    pub update_freq: Option<u64>,

    /// File to dump every scanned path to.
    #[arg(long = "all-files")]
    pub all_files: Option<PathBuf>,

    /// File to dump duplicate groups to.
    #[arg(long = "dup-files")]
    pub dup_files: Option<PathBuf>,

    /// File backing the persisted ignored-group list.
    #[arg(long = "ign-files")]
    pub ign_files: Option<PathBuf>,

    /// Emulate deletion instead of performing it.
    #[arg(long)]
    pub dry_run: bool,
}

/// `DupeConfig` plus this run's CLI-only keep/delete-path overlays, after
/// flags have been merged over the loaded config (repeatable list flags
/// extend the config's lists; scalar flags replace the config's value when
/// present).
pub struct ResolvedConfig {
    pub config: DupeConfig,
    pub keep_path: Vec<String>,
    pub delete_path: Vec<String>,
}

impl Cli {
    pub fn merge(self, mut config: DupeConfig) -> ResolvedConfig {
        config.scan_directories.extend(self.scan_dir);
        config.exclusion_patterns.extend(self.exclude);

        if let Some(min_size) = self.min_size {
            config.min_file_size_bytes = min_size;
        }
        if let Some(max_size) = self.max_size {
            config.max_file_size_bytes = max_size;
        }
        if let Some(update_freq) = self.update_freq {
            config.update_freq_ms = update_freq;
        }
        if let Some(all_files) = self.all_files {
            config.all_files = all_files.to_string_lossy().into_owned();
        }
        if let Some(dup_files) = self.dup_files {
            config.dup_files = dup_files.to_string_lossy().into_owned();
        }
        if let Some(ign_files) = self.ign_files {
            config.ign_files = ign_files.to_string_lossy().into_owned();
        }
        if self.dry_run {
            config.dry_run = true;
        }

        ResolvedConfig {
            config,
            keep_path: self.keep_path,
            delete_path: self.delete_path,
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod cli_tests;
