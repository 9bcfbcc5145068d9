// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! kpr-workflow: deletion strategies, the duplicate-group review workflow,
//! and the small text menu that drives interactive review.

pub mod error;
pub mod menu;
pub mod paths;
pub mod strategy;
pub mod workflow;

pub use error::WorkflowError;
pub use menu::{Action, Matcher, Matchers, Menu, MenuEntry, Navigation, StreamIo, UserIo};
pub use paths::PathList;
pub use strategy::{BackupAndDelete, DeletionStrategy, DryRun, Permanent};
pub use workflow::{DeletionWorkflow, DirectoryOpener, ProgressReporter};
