// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `dups`: scans a set of directories, groups files that share size and
//! sha256, then walks the operator through resolving each group (spec
//! §4.3-§4.5, §6.3).

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod cli;
mod config;
mod error;
mod exit_error;
mod output;
mod single_instance;

use std::io::{stdin, stdout};
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use regex::Regex;
use tracing_subscriber::EnvFilter;

use kpr_dupe::{DetectorOptions, DuplicateDetector, PathArena, Scanner};
use kpr_workflow::{BackupAndDelete, DeletionStrategy, DeletionWorkflow, DryRun, NullDirectoryOpener, PathList, StreamIo};

use cli::Cli;
use config::DupeConfig;
use error::CliError;
use exit_error::ExitError;

fn main() -> std::process::ExitCode {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    match run() {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            let exit_err = to_exit_error(err);
            eprintln!("dups: {}", exit_err.message);
            std::process::ExitCode::from(exit_err.code as u8)
        }
    }
}

fn to_exit_error(err: CliError) -> ExitError {
    let code = err.exit_code();
    ExitError::new(code, err.to_string())
}

fn run() -> Result<(), CliError> {
    let cli = Cli::parse();
    let data_dir = config::data_dir()?;
    std::fs::create_dir_all(&data_dir).map_err(|source| CliError::Io {
        path: data_dir.clone(),
        source,
    })?;

    let _lock = single_instance::acquire(&data_dir, "dups")?;

    let config = DupeConfig::load(&cli.cfg_file)?;
    let resolved = cli.merge(config);
    let config = resolved.config;

    let (all_files_path, dup_files_path, ign_files_path) = config.rebase_output_paths(&data_dir);

    let exclude: Vec<Regex> = config
        .exclusion_patterns
        .iter()
        .map(|pattern| Regex::new(pattern).map_err(|err| CliError::BadPattern(pattern.clone(), err)))
        .collect::<Result<_, _>>()?;

    let roots: Vec<PathBuf> = config.scan_directories.clone();

    let mut arena = PathArena::new();
    let scan_started = Instant::now();
    let update_freq = config.update_freq_ms;
    let mut last_logged = Instant::now();
    let report = Scanner::new().scan(&roots, &exclude, &mut arena, &mut |count| {
        if update_freq > 0 && last_logged.elapsed().as_millis() as u64 >= update_freq {
            tracing::info!(files = count, "scanning");
            last_logged = Instant::now();
        }
    });
    tracing::info!(
        files_added = report.files_added,
        errors = report.errors.len(),
        elapsed_ms = scan_started.elapsed().as_millis() as u64,
        "scan complete"
    );
    for (path, err) in &report.errors {
        tracing::warn!(path = %path.display(), error = %err, "scan error");
    }

    output::write_all_files(&arena, &all_files_path)?;
    tracing::info!(path = %all_files_path.display(), files = arena.len(), "dumped scanned tree");

    let opts = DetectorOptions {
        min_size_bytes: config.min_file_size_bytes,
        max_size_bytes: config.max_file_size_bytes,
    };
    let mut detector = DuplicateDetector::new();
    let detect_started = Instant::now();
    let mut last_logged = Instant::now();
    detector.detect(&mut arena, &opts, &mut |progress| {
        if update_freq > 0 && last_logged.elapsed().as_millis() as u64 >= update_freq {
            tracing::info!(
                processed_bytes = progress.processed_bytes,
                total_bytes = progress.total_bytes,
                "detecting duplicates"
            );
            last_logged = Instant::now();
        }
    })?;
    tracing::info!(
        groups = detector.groups().len(),
        elapsed_ms = detect_started.elapsed().as_millis() as u64,
        "detection complete"
    );

    output::write_dup_files(detector.groups(), &dup_files_path)?;

    let ignored = PathList::load(&ign_files_path)?;
    let mut keep_from = PathList::new();
    for path in &resolved.keep_path {
        keep_from.add(path.clone());
    }
    let mut delete_from = PathList::new();
    for path in &config.preferred_deletion_dirs {
        delete_from.add(path.clone());
    }
    for path in &resolved.delete_path {
        delete_from.add(path.clone());
    }

    let session_stamp = session_stamp();
    let strategy: Box<dyn DeletionStrategy> = if config.dry_run {
        Box::new(DryRun)
    } else {
        Box::new(
            BackupAndDelete::new(data_dir.join("backup"), &session_stamp).map_err(|source| CliError::Io {
                path: data_dir.join("backup"),
                source,
            })?,
        )
    };
    let opener = NullDirectoryOpener;

    let mut workflow = DeletionWorkflow::new(strategy.as_ref(), &opener)
        .with_keep_from(keep_from)
        .with_delete_from(delete_from)
        .with_ignored(ignored);

    let mut io = StreamIo::new(stdin().lock(), stdout());
    let mut progress = LoggingProgress;
    let completed = workflow.run(detector.groups(), &mut io, &mut progress);
    if !completed {
        tracing::info!("review stopped early by user quit");
    }

    workflow.ignored().save(&ign_files_path)?;

    Ok(())
}

/// Seconds-since-epoch at process start, used to name this run's backup
/// journal (`BackupAndDelete` stays `Clock`-free).
fn session_stamp() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let secs = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0);
    format!("{secs}")
}

struct LoggingProgress;

impl kpr_workflow::ProgressReporter for LoggingProgress {
    fn update(&mut self, current: u64, total: u64, message: &str) {
        tracing::info!(current, total, step = message, "reviewing duplicate groups");
    }
}
