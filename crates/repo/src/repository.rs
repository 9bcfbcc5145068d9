// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The sink trait the daemon's `DataHandler` writes through.

use crate::error::RepoError;
use crate::types::{Entry, Filter};

pub trait Repository {
    fn add(&mut self, entry: &Entry) -> Result<(), RepoError>;
    fn query_users(&self) -> Vec<String>;
    fn query_entries(&self, filter: &Filter) -> Vec<Entry>;
}
