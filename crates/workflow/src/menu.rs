// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A small closed-set text menu: a list of `(title, matcher, action)`
//! entries plus a [`UserIo`] that reads input and dispatches to the first
//! matching entry.

use std::cell::RefCell;
use std::io::{BufRead, Write};

kpr_core::simple_display! {
    Navigation {
        Done => "done",
        Continue => "continue",
        Back => "back",
        Quit => "quit",
    }
}

/// Where a menu loop should go next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// The group/operation this menu was reviewing is resolved.
    Done,
    /// Stay in the current menu loop.
    Continue,
    /// Pop back to the parent menu (only honored for non-root menus).
    Back,
    /// Abort the whole workflow.
    Quit,
}

/// Matches raw user input against one menu entry.
pub type Matcher = Box<dyn Fn(&str) -> bool>;

/// Runs when a [`Matcher`] matches, given the raw input that matched (e.g.
/// to recover which number was picked out of a numeric range). Boxed in a
/// `RefCell` so entries can be called through a shared `&Menu` while still
/// mutating captured state (the group under review, the keep/delete path
/// lists, ...).
pub type Action<'a> = RefCell<Box<dyn FnMut(&mut dyn UserIo, &str) -> Navigation + 'a>>;

pub struct MenuEntry<'a> {
    title: String,
    matcher: Matcher,
    action: Action<'a>,
}

impl<'a> MenuEntry<'a> {
    pub fn title(&self) -> &str {
        &self.title
    }
}

/// A set of mutually exclusive options presented to the user at once.
#[derive(Default)]
pub struct Menu<'a> {
    title: String,
    entries: Vec<MenuEntry<'a>>,
}

impl<'a> Menu<'a> {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            entries: Vec::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn entries(&self) -> &[MenuEntry<'a>] {
        &self.entries
    }

    pub fn add(
        &mut self,
        title: impl Into<String>,
        matcher: Matcher,
        action: impl FnMut(&mut dyn UserIo, &str) -> Navigation + 'a,
    ) {
        self.entries.push(MenuEntry {
            title: title.into(),
            matcher,
            action: RefCell::new(Box::new(action)),
        });
    }
}

/// Ready-made matchers for the two shapes every menu entry needs: a numeric
/// range ("pick 1..N") or a single letter key.
pub struct Matchers;

impl Matchers {
    pub fn range(min: i64, max: i64) -> Matcher {
        Box::new(move |s: &str| match s.parse::<i64>() {
            Ok(v) => v >= min && v <= max,
            Err(_) => false,
        })
    }

    pub fn key(c: char) -> Matcher {
        let target = c.to_ascii_lowercase();
        Box::new(move |s: &str| {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(first), None) => first.to_ascii_lowercase() == target,
                _ => false,
            }
        })
    }
}

/// Drives a [`Menu`] loop: print it, read input, dispatch to whichever
/// entry matches, and report text back to the user.
pub trait UserIo {
    fn run(&mut self, menu: &Menu<'_>, is_child: bool) -> Navigation;
    fn print_text(&mut self, text: &str);
}

/// A [`UserIo`] backed by a reader/writer pair — a terminal in production,
/// an in-memory buffer in tests.
pub struct StreamIo<R, W> {
    reader: R,
    writer: W,
    prev_input: String,
}

impl<R: BufRead, W: Write> StreamIo<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            prev_input: String::new(),
        }
    }

    fn print_options(&mut self, menu: &Menu<'_>, is_child: bool) {
        let banner = format!("> {} <", menu.title());
        let _ = writeln!(self.writer, "{banner:-^60}");
        for entry in menu.entries() {
            let _ = writeln!(self.writer, "  {}", entry.title());
        }
        if is_child {
            let _ = writeln!(self.writer, "  [b] Back");
        }
        let _ = writeln!(self.writer, "  [q] Quit");
    }

    fn invalid_input(&mut self) {
        let _ = writeln!(self.writer, "Invalid input.");
    }

    /// Read one line; a blank line repeats the previous non-blank input.
    /// Returns an empty string only when the stream is exhausted before any
    /// non-blank input has ever been seen.
    fn prompt(&mut self) -> String {
        loop {
            let _ = write!(self.writer, "> ");
            let _ = self.writer.flush();

            let mut line = String::new();
            let read = self.reader.read_line(&mut line).unwrap_or(0);
            let trimmed = line.trim_end_matches(['\n', '\r']).to_string();

            if read == 0 {
                return String::new();
            }
            if !trimmed.is_empty() {
                self.prev_input = trimmed.clone();
                return trimmed;
            }
            if !self.prev_input.is_empty() {
                return self.prev_input.clone();
            }
            // blank line, no previous input yet: ask again
        }
    }
}

impl<R: BufRead, W: Write> UserIo for StreamIo<R, W> {
    fn run(&mut self, menu: &Menu<'_>, is_child: bool) -> Navigation {
        loop {
            self.print_options(menu, is_child);
            let input = self.prompt();

            if input.is_empty() {
                return Navigation::Quit;
            }
            let lower = input.to_ascii_lowercase();
            if is_child && lower == "b" {
                return Navigation::Back;
            }
            if lower == "q" {
                return Navigation::Quit;
            }

            let mut handled = false;
            for entry in menu.entries() {
                if (entry.matcher)(&input) {
                    handled = true;
                    let result = (*entry.action.borrow_mut())(self, &input);
                    if result == Navigation::Quit || result == Navigation::Done {
                        return result;
                    }
                }
            }

            if !handled {
                self.invalid_input();
            }
        }
    }

    fn print_text(&mut self, text: &str) {
        let _ = write!(self.writer, "{text}");
    }
}

#[cfg(test)]
#[path = "menu_tests.rs"]
mod menu_tests;
