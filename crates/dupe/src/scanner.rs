// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recursive filesystem walk that feeds a [`PathArena`].

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::warn;

use crate::arena::PathArena;

/// Outcome of a [`Scanner::scan`] run: how many files were added and any
/// per-path IO errors encountered along the way (never fatal).
#[derive(Debug, Default)]
pub struct ScanReport {
    pub files_added: u64,
    pub errors: Vec<(PathBuf, std::io::Error)>,
}

/// Walks a set of root directories, excluding any path component that
/// matches one of `exclude`, following symlinks to regular files only and
/// never into a cycle.
#[derive(Debug, Default)]
pub struct Scanner;

impl Scanner {
    pub fn new() -> Self {
        Self
    }

    pub fn scan(
        &self,
        roots: &[PathBuf],
        exclude: &[Regex],
        arena: &mut PathArena,
        progress: &mut dyn FnMut(u64),
    ) -> ScanReport {
        let mut report = ScanReport::default();
        let mut visited_dirs = HashSet::new();

        for root in roots {
            self.walk(root, exclude, arena, &mut visited_dirs, &mut report, progress);
        }

        report
    }

    fn walk(
        &self,
        dir: &Path,
        exclude: &[Regex],
        arena: &mut PathArena,
        visited_dirs: &mut HashSet<PathBuf>,
        report: &mut ScanReport,
        progress: &mut dyn FnMut(u64),
    ) {
        let canonical = match fs::canonicalize(dir) {
            Ok(c) => c,
            Err(err) => {
                warn!(path = %dir.display(), error = %err, "failed to canonicalize directory");
                report.errors.push((dir.to_path_buf(), err));
                return;
            }
        };

        if !visited_dirs.insert(canonical) {
            return; // already visited: symlink cycle
        }

        let entries = match fs::read_dir(dir) {
            Ok(e) => e,
            Err(err) => {
                warn!(path = %dir.display(), error = %err, "failed to read directory");
                report.errors.push((dir.to_path_buf(), err));
                return;
            }
        };

        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    warn!(path = %dir.display(), error = %err, "failed to read directory entry");
                    report.errors.push((dir.to_path_buf(), err));
                    continue;
                }
            };

            let path = entry.path();
            if is_excluded(&path, exclude) {
                continue;
            }

            let file_type = match entry.file_type() {
                Ok(ft) => ft,
                Err(err) => {
                    report.errors.push((path, err));
                    continue;
                }
            };

            if file_type.is_dir() {
                self.walk(&path, exclude, arena, visited_dirs, report, progress);
            } else if file_type.is_symlink() {
                match fs::metadata(&path) {
                    Ok(meta) if meta.is_file() => {
                        arena.add_file(&path);
                        report.files_added += 1;
                        progress(report.files_added);
                    }
                    Ok(meta) if meta.is_dir() => {
                        self.walk(&path, exclude, arena, visited_dirs, report, progress);
                    }
                    Ok(_) => {}
                    Err(err) => report.errors.push((path, err)),
                }
            } else {
                arena.add_file(&path);
                report.files_added += 1;
                progress(report.files_added);
            }
        }
    }
}

fn is_excluded(path: &Path, exclude: &[Regex]) -> bool {
    let name = match path.file_name().and_then(|n| n.to_str()) {
        Some(n) => n,
        None => return false,
    };
    exclude.iter().any(|re| re.is_match(name))
}

#[cfg(test)]
#[path = "scanner_tests.rs"]
mod scanner_tests;
