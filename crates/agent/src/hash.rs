// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sha256 of the foreground window's owner executable, cached by mtime so a
//! tick that observes the same process repeatedly doesn't re-read the file.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use sha2::{Digest, Sha256};

use crate::error::AgentError;

const HASH_CHUNK: usize = 4096;

/// Caches a file's hex-encoded sha256, keyed by `(path, mtime)` so an
/// unchanged file never needs rehashing and a modified one is picked up the
/// next time it's probed.
#[derive(Debug, Default)]
pub struct CachedFileSha256 {
    cache: HashMap<PathBuf, (SystemTime, String)>,
}

impl CachedFileSha256 {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, path: &Path) -> Result<String, AgentError> {
        let modified = path
            .metadata()
            .and_then(|meta| meta.modified())
            .map_err(|source| AgentError::Hash {
                path: path.to_path_buf(),
                source,
            })?;

        if let Some((cached_mtime, hex)) = self.cache.get(path) {
            if *cached_mtime == modified {
                return Ok(hex.clone());
            }
        }

        let hex = hash_file(path).map_err(|source| AgentError::Hash {
            path: path.to_path_buf(),
            source,
        })?;
        self.cache
            .insert(path.to_path_buf(), (modified, hex.clone()));
        Ok(hex)
    }
}

fn hash_file(path: &Path) -> std::io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; HASH_CHUNK];

    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
#[path = "hash_tests.rs"]
mod hash_tests;
