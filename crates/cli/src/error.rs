// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error type for `dups`. Every variant maps to one of the three exit codes
//! spec'd for the duplicate-scan CLI (0 done, 2 usage, 1 fatal) via
//! `CliError::exit_code`.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("io error at `{path}`: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed config `{path}`: {source}")]
    Config {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid regex `{0}`: {1}")]
    BadPattern(String, regex::Error),

    #[error("could not determine application data directory")]
    NoDataDir,

    #[error("already running: {0}")]
    AlreadyRunning(PathBuf),

    #[error(transparent)]
    Dupe(#[from] kpr_dupe::DupeError),

    #[error(transparent)]
    Workflow(#[from] kpr_workflow::WorkflowError),
}

impl CliError {
    /// Config/CLI errors are usage errors (exit 2); everything else that
    /// reaches `main` is a fatal init/IO failure (exit 1).
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config { .. } | CliError::BadPattern(..) => 2,
            _ => 1,
        }
    }
}
