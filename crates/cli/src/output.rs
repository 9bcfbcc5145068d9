// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Writes the two report files `dups` produces alongside the interactive
//! review: the full scanned tree and the duplicate groups. The ignored-group
//! set is persisted separately via `kpr_workflow::PathList`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use kpr_dupe::{DupGroup, PathArena};

use crate::error::CliError;

/// Dumps the whole scanned tree, indented by depth, to `path`.
pub fn write_all_files(arena: &PathArena, path: &Path) -> Result<(), CliError> {
    let file = File::create(path).map_err(|source| io_err(path, source))?;
    let mut writer = BufWriter::new(file);
    arena.dump(&mut writer).map_err(|source| io_err(path, source))
}

/// Writes every duplicate group as `group_id|sha256_16|size|path` lines,
/// sorted within the group, one blank line between groups.
pub fn write_dup_files(groups: &[DupGroup], path: &Path) -> Result<(), CliError> {
    let file = File::create(path).map_err(|source| io_err(path, source))?;
    let mut writer = BufWriter::new(file);

    for (i, group) in groups.iter().enumerate() {
        if i > 0 {
            writeln!(writer).map_err(|source| io_err(path, source))?;
        }
        for entry in &group.entries {
            let short_hash = &entry.sha256_hex[..entry.sha256_hex.len().min(16)];
            writeln!(
                writer,
                "{}|{}|{}|{}",
                group.group_id,
                short_hash,
                entry.size,
                entry.path.display()
            )
            .map_err(|source| io_err(path, source))?;
        }
    }
    Ok(())
}

fn io_err(path: &Path, source: std::io::Error) -> CliError {
    CliError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod output_tests;
