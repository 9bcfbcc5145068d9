// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The duplicate-group review workflow: categorize each group's entries,
//! try the automatic resolutions in order, and fall back to an interactive
//! menu only when none of them apply.

use std::cell::RefCell;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::info;

use kpr_dupe::DupGroup;

use crate::menu::{Matchers, Menu, Navigation, UserIo};
use crate::paths::PathList;
use crate::strategy::DeletionStrategy;

/// Reports review progress. The detector itself weighs by bytes; here a
/// group is the natural unit of user interaction.
pub trait ProgressReporter {
    fn update(&mut self, current: u64, total: u64, message: &str);
}

/// Opens a directory in the OS file browser. Headless/test runs use the
/// no-op [`NullDirectoryOpener`]; a real one is an out-of-scope OS leaf
/// interface, the same way `kpr-agent`'s OS probes are.
pub trait DirectoryOpener {
    fn open(&self, dir: &Path);
}

#[derive(Debug, Default)]
pub struct NullDirectoryOpener;

impl DirectoryOpener for NullDirectoryOpener {
    fn open(&self, _dir: &Path) {}
}

fn duplicate_naming_suffix() -> Regex {
    Regex::new(r"(\(\d+\)|_copy|copy)$").expect("static pattern")
}

/// Whether review should keep going after this group, or stop entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Done,
    Quit,
}

/// Drives review of every duplicate group produced by `kpr-dupe` against one
/// [`DeletionStrategy`] and a set of keep-from / delete-from / ignored path
/// lists.
pub struct DeletionWorkflow<'a> {
    strategy: &'a dyn DeletionStrategy,
    opener: &'a dyn DirectoryOpener,
    keep_from: PathList,
    delete_from: PathList,
    ignored: PathList,
}

impl<'a> DeletionWorkflow<'a> {
    pub fn new(strategy: &'a dyn DeletionStrategy, opener: &'a dyn DirectoryOpener) -> Self {
        Self {
            strategy,
            opener,
            keep_from: PathList::new(),
            delete_from: PathList::new(),
            ignored: PathList::new(),
        }
    }

    pub fn with_keep_from(mut self, list: PathList) -> Self {
        self.keep_from = list;
        self
    }

    pub fn with_delete_from(mut self, list: PathList) -> Self {
        self.delete_from = list;
        self
    }

    pub fn with_ignored(mut self, list: PathList) -> Self {
        self.ignored = list;
        self
    }

    pub fn ignored(&self) -> &PathList {
        &self.ignored
    }

    pub fn keep_from(&self) -> &PathList {
        &self.keep_from
    }

    pub fn delete_from(&self) -> &PathList {
        &self.delete_from
    }

    /// Review every group in order, stopping early if the user quits.
    /// Returns `true` if every group was processed, `false` on early quit.
    pub fn run(
        &mut self,
        groups: &[DupGroup],
        io: &mut dyn UserIo,
        progress: &mut dyn ProgressReporter,
    ) -> bool {
        let total = groups.len() as u64;
        for (i, group) in groups.iter().enumerate() {
            progress.update(
                i as u64 + 1,
                total,
                &format!("Processing group {} of {total}", i + 1),
            );
            if self.process_group(group, io) == Flow::Quit {
                return false;
            }
        }
        true
    }

    fn delete_all(&self, files: &[PathBuf]) {
        for file in files {
            if let Err(err) = self.strategy.apply(file) {
                tracing::error!(path = %file.display(), error = %err, "failed to delete file");
            }
        }
    }

    fn process_group(&mut self, group: &DupGroup, io: &mut dyn UserIo) -> Flow {
        let mut auto_delete = Vec::new();
        let mut selective = Vec::new();

        for entry in &group.entries {
            if self.ignored.contains_exact(&entry.path) {
                continue;
            }
            let parent = entry.path.parent().unwrap_or_else(|| Path::new(""));
            if self.delete_from.matches(parent) {
                auto_delete.push(entry.path.clone());
            } else {
                selective.push(entry.path.clone());
            }
        }

        if selective.is_empty() {
            // Safety flip: never let the last copies fall into automatic
            // deletion just because every parent matched delete-from.
            selective = auto_delete;
        } else {
            self.delete_all(&auto_delete);
        }

        if selective.len() <= 1 {
            return Flow::Done;
        }

        selective.sort();

        if self.auto_resolve_by_keep_path(&mut selective) {
            return Flow::Done;
        }
        if self.auto_resolve_by_filename_pattern(&mut selective) {
            return Flow::Done;
        }

        self.interactive(group, selective, io)
    }

    /// If exactly one entry's parent matches a `keep-from` substring, keep
    /// it and delete the rest. More than one match is an ambiguity that
    /// blocks auto-resolution.
    fn auto_resolve_by_keep_path(&self, files: &mut Vec<PathBuf>) -> bool {
        let matches: Vec<usize> = files
            .iter()
            .enumerate()
            .filter(|(_, f)| {
                let parent = f.parent().unwrap_or_else(|| Path::new(""));
                self.keep_from.matches(parent)
            })
            .map(|(i, _)| i)
            .collect();

        if matches.len() != 1 {
            return false;
        }

        let keep = files.remove(matches[0]);
        self.delete_all(files);
        info!(kept = %keep.display(), "auto-resolved by keep-path");
        true
    }

    /// If every stem beyond the shortest one is the shortest stem plus a
    /// trailing `(N)`, `_copy`, or `copy` token, keep the shortest and
    /// delete the rest.
    fn auto_resolve_by_filename_pattern(&self, files: &mut Vec<PathBuf>) -> bool {
        if files.len() < 2 {
            return false;
        }

        let stems: Vec<String> = files
            .iter()
            .map(|f| {
                f.file_stem()
                    .unwrap_or_default()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();

        let (shortest_idx, shortest) = stems
            .iter()
            .enumerate()
            .min_by_key(|(_, s)| s.len())
            .map(|(i, s)| (i, s.clone()))
            .unwrap_or((0, String::new()));

        let suffix_re = duplicate_naming_suffix();

        for (i, stem) in stems.iter().enumerate() {
            if i == shortest_idx {
                continue;
            }
            if !stem.starts_with(shortest.as_str()) {
                return false;
            }
            let remainder = stem[shortest.len()..].trim();
            if remainder.len() < 2 {
                return false;
            }
            if !suffix_re.is_match(remainder) {
                return false;
            }
        }

        let keep = files.remove(shortest_idx);
        self.delete_all(files);
        info!(kept = %keep.display(), "auto-resolved by filename pattern");
        true
    }

    /// Presents the sorted list, accepting `1..N` (keep that index, delete
    /// the rest), `i` (ignore the group), `o` (open containing
    /// directories), `k`/`d` (edit the keep-from / delete-from lists), `v`
    /// (print them). `b`/`q` are handled by `UserIo::run` itself.
    fn interactive(&mut self, group: &DupGroup, files: Vec<PathBuf>, io: &mut dyn UserIo) -> Flow {
        io.print_text(&format!(
            "Size: {} SHA256: {}\n",
            group.entries.first().map(|e| e.size).unwrap_or(0),
            group
                .entries
                .first()
                .map(|e| e.sha256_hex.as_str())
                .unwrap_or("")
        ));
        for (i, f) in files.iter().enumerate() {
            io.print_text(&format!("{:3}: {}\n", i + 1, f.display()));
        }

        let files = RefCell::new(files);
        let ignored = RefCell::new(std::mem::take(&mut self.ignored));
        let keep_from = RefCell::new(std::mem::take(&mut self.keep_from));
        let delete_from = RefCell::new(std::mem::take(&mut self.delete_from));
        let strategy = self.strategy;
        let opener = self.opener;

        let count = files.borrow().len();
        let mut menu = Menu::new("Enter a number to keep, or select an action");

        menu.add(
            format!("[?] Number from 1 to {count}"),
            Matchers::range(1, count as i64),
            |_io: &mut dyn UserIo, input: &str| {
                let Ok(index) = input.parse::<usize>() else {
                    return Navigation::Continue;
                };
                let mut files = files.borrow_mut();
                if index == 0 || index > files.len() {
                    return Navigation::Continue;
                }
                let keep = files.remove(index - 1);
                for f in files.iter() {
                    if let Err(err) = strategy.apply(f) {
                        tracing::error!(path = %f.display(), error = %err, "failed to delete file");
                    }
                }
                info!(kept = %keep.display(), "kept by user choice");
                Navigation::Done
            },
        );

        menu.add("[i] Ignore", Matchers::key('i'), |_io, _| {
            for f in files.borrow().iter() {
                ignored.borrow_mut().add(f.clone());
            }
            info!("group ignored by user choice");
            Navigation::Done
        });

        menu.add("[o] Open directories", Matchers::key('o'), |_io, _| {
            let mut seen = HashSet::new();
            for f in files.borrow().iter() {
                if let Some(parent) = f.parent() {
                    if seen.insert(parent.to_path_buf()) {
                        opener.open(parent);
                    }
                }
            }
            Navigation::Continue
        });

        menu.add(
            "[k] Edit keep-from list",
            Matchers::key('k'),
            |io: &mut dyn UserIo, _| {
                let snapshot: Vec<PathBuf> = files.borrow().clone();
                edit_path_list(io, &keep_from, &snapshot, "keep-from list");
                Navigation::Continue
            },
        );

        menu.add(
            "[d] Edit delete-from list",
            Matchers::key('d'),
            |io: &mut dyn UserIo, _| {
                let snapshot: Vec<PathBuf> = files.borrow().clone();
                edit_path_list(io, &delete_from, &snapshot, "delete-from list");
                Navigation::Continue
            },
        );

        menu.add(
            "[v] View keep/delete list",
            Matchers::key('v'),
            |io: &mut dyn UserIo, _| {
                print_path_list(io, "Keep from paths:", &keep_from.borrow());
                print_path_list(io, "Delete from paths:", &delete_from.borrow());
                Navigation::Continue
            },
        );

        let navigation = io.run(&menu, false);

        self.ignored = ignored.into_inner();
        self.keep_from = keep_from.into_inner();
        self.delete_from = delete_from.into_inner();

        if navigation == Navigation::Quit {
            Flow::Quit
        } else {
            Flow::Done
        }
    }
}

/// Opens the add/delete sub-menu for `list`, mirroring the original's
/// `editConfig`: `[a]` walks into [`add_to_path_list`], `[d]` into
/// [`delete_from_path_list`], `[b]` pops back to the group menu.
fn edit_path_list(io: &mut dyn UserIo, list: &RefCell<PathList>, files: &[PathBuf], list_name: &str) {
    let mut menu = Menu::new(format!("Edit {list_name}"));

    menu.add(
        "[a] Add to list",
        Matchers::key('a'),
        |io: &mut dyn UserIo, _| {
            add_to_path_list(io, list, files, list_name);
            Navigation::Continue
        },
    );

    menu.add(
        "[d] Delete from list",
        Matchers::key('d'),
        |io: &mut dyn UserIo, _| {
            delete_from_path_list(io, list, list_name);
            Navigation::Continue
        },
    );

    io.run(&menu, true);
}

/// Numbered list of candidate directories (the parents of the group's
/// files, sorted and deduped) to add to `list` by index, grounded on the
/// original's `addPaths`.
fn add_to_path_list(io: &mut dyn UserIo, list: &RefCell<PathList>, files: &[PathBuf], list_name: &str) {
    let mut dirs: Vec<PathBuf> = files
        .iter()
        .filter_map(|f| f.parent().map(|p| p.to_path_buf()))
        .collect();
    dirs.sort();
    dirs.dedup();

    if dirs.is_empty() {
        io.print_text("  No candidate directories to add.\n");
        return;
    }

    io.print_text("  Candidate directories:\n");
    for (i, dir) in dirs.iter().enumerate() {
        io.print_text(&format!("  {:3}: {}\n", i + 1, dir.display()));
    }

    let count = dirs.len();
    let mut menu = Menu::new(format!("Add to {list_name}"));
    menu.add(
        format!("[?] Number from 1 to {count}"),
        Matchers::range(1, count as i64),
        |_io: &mut dyn UserIo, input: &str| {
            let Ok(index) = input.parse::<usize>() else {
                return Navigation::Continue;
            };
            if index == 0 || index > dirs.len() {
                return Navigation::Continue;
            }
            list.borrow_mut().add(dirs[index - 1].clone());
            Navigation::Continue
        },
    );

    io.run(&menu, true);
}

/// Numbered list of `list`'s current entries so the user can remove one by
/// index, grounded on the original's `deletePaths` — removing pops back to
/// the parent edit menu immediately, same as the original.
fn delete_from_path_list(io: &mut dyn UserIo, list: &RefCell<PathList>, list_name: &str) {
    let dirs: Vec<PathBuf> = list.borrow().entries().to_vec();

    if dirs.is_empty() {
        io.print_text("  Path list is empty.\n");
        return;
    }

    io.print_text("  Currently listed:\n");
    for (i, entry) in dirs.iter().enumerate() {
        io.print_text(&format!("  {:3}: {}\n", i + 1, entry.display()));
    }

    let count = dirs.len();
    let mut menu = Menu::new(format!("Delete from {list_name}"));
    menu.add(
        format!("[?] Number from 1 to {count}"),
        Matchers::range(1, count as i64),
        |_io: &mut dyn UserIo, input: &str| {
            let Ok(index) = input.parse::<usize>() else {
                return Navigation::Back;
            };
            if index == 0 || index > dirs.len() {
                return Navigation::Back;
            }
            list.borrow_mut().remove(&dirs[index - 1]);
            Navigation::Back
        },
    );

    io.run(&menu, true);
}

fn print_path_list(io: &mut dyn UserIo, label: &str, list: &PathList) {
    io.print_text(&format!("{label}\n"));
    if list.is_empty() {
        io.print_text("    Path list is empty\n");
        return;
    }
    for (i, entry) in list.entries().iter().enumerate() {
        io.print_text(&format!("    {:2}. {}\n", i + 1, entry.display()));
    }
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod workflow_tests;
