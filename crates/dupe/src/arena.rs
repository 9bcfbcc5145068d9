// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Arena-backed path trie.
//!
//! Parent-pointer, owned-subtree tries borrow poorly once a scan wants to
//! hold multiple references into the same subtree (the detector's size/hash
//! buckets, progress callbacks, etc). This arena stores every node in a flat
//! `Vec`, indexed by [`NodeId`], with `parent`/`children` expressed as
//! indices rather than borrows or owning pointers.

use kpr_core::{InternedRef, Interner};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::DupeError;

/// Index into [`PathArena`]'s node vector. Node `0` is always the synthetic
/// root (the empty scan anchor).
pub type NodeId = u32;

const ROOT: NodeId = 0;
const HASH_CHUNK: usize = 4096;

/// One node in the trie: a path segment, its parent, its children, and the
/// stats that only make sense once [`PathArena::update`] has run.
#[derive(Debug, Clone)]
pub struct TrieNodeData {
    pub name: InternedRef,
    pub parent: Option<NodeId>,
    pub children: HashMap<InternedRef, NodeId>,
    pub depth: u32,
    pub size: u64,
    pub sha256: Option<[u8; 32]>,
}

impl TrieNodeData {
    fn new(name: InternedRef, parent: Option<NodeId>, depth: u32) -> Self {
        Self {
            name,
            parent,
            children: HashMap::new(),
            depth,
            size: 0,
            sha256: None,
        }
    }

    fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// The path trie: an arena of [`TrieNodeData`] plus the [`Interner`] that
/// owns every segment string they reference.
#[derive(Debug)]
pub struct PathArena {
    nodes: Vec<TrieNodeData>,
    interner: Interner,
}

impl Default for PathArena {
    fn default() -> Self {
        Self::new()
    }
}

impl PathArena {
    pub fn new() -> Self {
        let mut interner = Interner::new();
        let root_name = interner.intern("");
        Self {
            nodes: vec![TrieNodeData::new(root_name, None, 0)],
            interner,
        }
    }

    pub fn root(&self) -> NodeId {
        ROOT
    }

    pub fn node(&self, id: NodeId) -> &TrieNodeData {
        &self.nodes[id as usize]
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.nodes[id as usize].is_leaf()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Insert `path`, interning each segment once and descending/creating
    /// child nodes along the way. Idempotent: re-adding the same path
    /// returns the same leaf `NodeId`. O(depth).
    pub fn add_file(&mut self, path: &Path) -> NodeId {
        let mut current = ROOT;

        for component in path.components() {
            let segment = component.as_os_str().to_string_lossy();
            let name = self.interner.intern(&segment);

            current = if let Some(&child) = self.nodes[current as usize].children.get(&name) {
                child
            } else {
                let depth = self.nodes[current as usize].depth + 1;
                let id = self.nodes.len() as NodeId;
                self.nodes.push(TrieNodeData::new(name, Some(current), depth));
                self.nodes[current as usize].children.insert(name, id);
                id
            };
        }

        current
    }

    /// Reconstruct the full path of `node` by walking `parent` links. O(depth).
    pub fn full_path(&self, node: NodeId) -> PathBuf {
        let mut segments = Vec::new();
        let mut current = Some(node);

        while let Some(id) = current {
            if id == ROOT {
                break;
            }
            let data = &self.nodes[id as usize];
            segments.push(self.interner.resolve(data.name));
            current = data.parent;
        }

        segments.reverse();
        segments.into_iter().collect()
    }

    fn sorted_children(&self, id: NodeId) -> Vec<NodeId> {
        let data = &self.nodes[id as usize];
        let mut internal = Vec::new();
        let mut leaves = Vec::new();

        for &child in data.children.values() {
            if self.nodes[child as usize].is_leaf() {
                leaves.push(child);
            } else {
                internal.push(child);
            }
        }

        let key = |id: &NodeId| self.interner.resolve(self.nodes[*id as usize].name).to_owned();
        internal.sort_by_key(key);
        leaves.sort_by_key(key);

        internal.into_iter().chain(leaves).collect()
    }

    /// Depth-first walk calling `f` on every leaf (file) node. Internal
    /// children are visited before leaf children at the same level.
    pub fn enum_leaves(&self, mut f: impl FnMut(NodeId)) {
        self.enum_leaves_from(ROOT, &mut f);
    }

    fn enum_leaves_from(&self, id: NodeId, f: &mut impl FnMut(NodeId)) {
        if id != ROOT && self.nodes[id as usize].is_leaf() {
            f(id);
            return;
        }
        for child in self.sorted_children(id) {
            self.enum_leaves_from(child, f);
        }
    }

    /// Depth-first walk calling `f` on every node, root included, internal
    /// children before leaf children at the same level.
    pub fn enum_nodes(&self, mut f: impl FnMut(NodeId)) {
        self.enum_nodes_from(ROOT, &mut f);
    }

    fn enum_nodes_from(&self, id: NodeId, f: &mut impl FnMut(NodeId)) {
        f(id);
        for child in self.sorted_children(id) {
            self.enum_nodes_from(child, f);
        }
    }

    /// Post-scan materialization: stat every leaf to set its `size`, clear
    /// cached hashes on interior nodes, and bubble sizes upward. `progress`
    /// is called once per leaf as `(processed, total_leaves)`.
    pub fn update(&mut self, progress: &mut dyn FnMut(u64, u64)) {
        let mut leaves = Vec::new();
        self.enum_leaves(|id| leaves.push(id));
        let total = leaves.len() as u64;

        for (i, &leaf) in leaves.iter().enumerate() {
            let path = self.full_path(leaf);
            let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
            self.nodes[leaf as usize].size = size;
            progress(i as u64 + 1, total);
        }

        self.bubble_sizes(ROOT);
    }

    fn bubble_sizes(&mut self, id: NodeId) -> u64 {
        if self.nodes[id as usize].is_leaf() {
            return self.nodes[id as usize].size;
        }

        self.nodes[id as usize].sha256 = None;
        let children: Vec<NodeId> = self.nodes[id as usize].children.values().copied().collect();
        let mut total = 0u64;
        for child in children {
            total += self.bubble_sizes(child);
        }
        self.nodes[id as usize].size = total;
        total
    }

    /// Compute (or return the cached) sha256 of a leaf, streaming the file
    /// in 4 KiB chunks.
    pub fn sha256(&mut self, leaf: NodeId) -> Result<[u8; 32], DupeError> {
        if !self.nodes[leaf as usize].is_leaf() {
            return Err(DupeError::NotALeaf(leaf));
        }

        if let Some(cached) = self.nodes[leaf as usize].sha256 {
            return Ok(cached);
        }

        let path = self.full_path(leaf);
        let digest = hash_file(&path).map_err(|source| DupeError::Hash {
            path: path.clone(),
            source,
        })?;
        self.nodes[leaf as usize].sha256 = Some(digest);
        Ok(digest)
    }

    /// Clear a leaf's cached hash, forcing recomputation on next access.
    pub fn reset_hash(&mut self, node: NodeId) {
        self.nodes[node as usize].sha256 = None;
    }

    /// Print an indented tree listing: internal nodes before leaf children at
    /// the same level, one entry per line, two spaces of indent per depth.
    pub fn dump(&self, w: &mut impl Write) -> io::Result<()> {
        self.dump_from(ROOT, w)
    }

    fn dump_from(&self, id: NodeId, w: &mut impl Write) -> io::Result<()> {
        if id != ROOT {
            let data = &self.nodes[id as usize];
            let indent = "  ".repeat(data.depth.saturating_sub(1) as usize);
            writeln!(w, "{indent}{}", self.interner.resolve(data.name))?;
        }
        for child in self.sorted_children(id) {
            self.dump_from(child, w)?;
        }
        Ok(())
    }
}

fn hash_file(path: &Path) -> io::Result<[u8; 32]> {
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

    Ok(hasher.finalize().into())
}

#[cfg(test)]
#[path = "arena_tests.rs"]
mod arena_tests;
