// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Path-segment interning.
//!
//! A trie built from raw `String` path segments pays for an allocation at
//! every node and borrows poorly across arena-indexed structures. [`Interner`]
//! hands out small `Copy` handles instead, so a trie (or anything else that
//! wants stable, cheap-to-compare name references) can store [`InternedRef`]
//! values rather than strings.

use smol_str::SmolStr;
use std::collections::HashMap;

/// A handle to an interned string. Cheap to copy and compare; meaningless
/// outside the [`Interner`] that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InternedRef(u32);

/// An arena of interned path segments.
///
/// Interning the same string twice returns the same [`InternedRef`].
#[derive(Debug, Default)]
pub struct Interner {
    segments: Vec<SmolStr>,
    lookup: HashMap<SmolStr, InternedRef>,
}

impl Interner {
    /// Create an empty interner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `s`, returning its handle. Returns the existing handle if `s`
    /// was interned before.
    pub fn intern(&mut self, s: &str) -> InternedRef {
        if let Some(existing) = self.lookup.get(s) {
            return *existing;
        }
        let idx = self.segments.len() as u32;
        let interned = SmolStr::new(s);
        self.segments.push(interned.clone());
        let handle = InternedRef(idx);
        self.lookup.insert(interned, handle);
        handle
    }

    /// Resolve a handle back to its string.
    ///
    /// # Panics
    ///
    /// Panics if `r` was not produced by this interner.
    pub fn resolve(&self, r: InternedRef) -> &str {
        &self.segments[r.0 as usize]
    }

    /// Number of distinct strings interned so far.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// `true` if nothing has been interned yet.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

#[cfg(test)]
#[path = "intern_tests.rs"]
mod intern_tests;
