// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Two-phase (bucket-by-size, confirm-by-hash) duplicate detection over a
//! [`PathArena`].

use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::warn;

use crate::arena::{NodeId, PathArena};
use crate::error::DupeError;

/// Size range to consider during grouping; files outside `[min, max]` are
/// ignored by `detect` but remain visible to tree walks. `max_size_bytes ==
/// 0` means unbounded.
#[derive(Debug, Clone, Copy)]
pub struct DetectorOptions {
    pub min_size_bytes: u64,
    pub max_size_bytes: u64,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            min_size_bytes: 0,
            max_size_bytes: 0,
        }
    }
}

impl DetectorOptions {
    fn in_range(&self, size: u64) -> bool {
        size >= self.min_size_bytes && (self.max_size_bytes == 0 || size <= self.max_size_bytes)
    }
}

/// One duplicate file within a [`DupGroup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DupEntry {
    pub path: PathBuf,
    pub size: u64,
    pub sha256_hex: String,
}

/// A set of files sharing identical size and content hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DupGroup {
    pub group_id: u64,
    pub entries: Vec<DupEntry>,
}

/// Progress callback payload for [`DuplicateDetector::detect`], weighted by
/// bytes rather than file count.
#[derive(Debug, Clone, Copy)]
pub struct Progress {
    pub processed_bytes: u64,
    pub total_bytes: u64,
}

/// Turns an updated [`PathArena`] into a list of duplicate groups.
#[derive(Debug, Default)]
pub struct DuplicateDetector {
    groups: Vec<DupGroup>,
}

impl DuplicateDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn groups(&self) -> &[DupGroup] {
        &self.groups
    }

    /// Run the two-phase detection algorithm: `update` the arena, bucket
    /// leaves by size, then within each surviving bucket group by hash.
    pub fn detect(
        &mut self,
        arena: &mut PathArena,
        opts: &DetectorOptions,
        progress: &mut dyn FnMut(Progress),
    ) -> Result<(), DupeError> {
        self.groups.clear();

        arena.update(&mut |_current, _total| {});

        let mut by_size: BTreeMap<u64, Vec<NodeId>> = BTreeMap::new();
        arena.enum_leaves(|leaf| {
            let size = arena.node(leaf).size;
            if opts.in_range(size) {
                by_size.entry(size).or_default().push(leaf);
            }
        });
        by_size.retain(|_, leaves| leaves.len() >= 2);

        let total_bytes: u64 = by_size
            .iter()
            .map(|(size, leaves)| size * leaves.len() as u64)
            .sum();
        let mut processed_bytes = 0u64;

        let mut group_id = 0u64;
        // descending size order
        for (&size, leaves) in by_size.iter().rev() {
            let mut by_hash: BTreeMap<[u8; 32], Vec<NodeId>> = BTreeMap::new();

            for &leaf in &leaves {
                match arena.sha256(leaf) {
                    Ok(hash) => by_hash.entry(hash).or_default().push(leaf),
                    Err(err) => {
                        warn!(error = %err, "failed to hash candidate duplicate, skipping");
                    }
                }
                processed_bytes += size;
                progress(Progress {
                    processed_bytes,
                    total_bytes,
                });
            }

            by_hash.retain(|_, nodes| nodes.len() >= 2);

            for nodes in by_hash.into_values() {
                group_id += 1;
                let mut entries: Vec<DupEntry> = nodes
                    .into_iter()
                    .map(|leaf| DupEntry {
                        path: arena.full_path(leaf),
                        size,
                        sha256_hex: hex::encode(arena.node(leaf).sha256.unwrap_or_default()),
                    })
                    .collect();
                entries.sort_by(|a, b| a.path.cmp(&b.path));
                self.groups.push(DupGroup { group_id, entries });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "detector_tests.rs"]
mod detector_tests;
