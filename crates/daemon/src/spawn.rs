// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Server health/spawn loop (spec §4.12): keeps exactly one authorized
//! agent alive per host by launching a fresh one whenever none is
//! authorized and the server isn't running `--passive`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use kpr_agent::ProcessLauncher;

use crate::manager::AgentManager;

const ALPHANUMERIC: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

pub struct SpawnConfig {
    pub activity_check_interval: Duration,
    pub spawn_agent: bool,
    pub agent_exe: PathBuf,
}

/// Runs until cancelled (the caller drops the returned task or aborts it).
pub async fn run_health_loop<L: ProcessLauncher>(
    config: SpawnConfig,
    manager: Arc<AgentManager>,
    shared_token: Arc<Mutex<Option<String>>>,
    launcher: L,
) {
    let mut interval = tokio::time::interval(config.activity_check_interval);
    loop {
        interval.tick().await;
        tick(&config, &manager, &shared_token, &launcher);
    }
}

fn tick<L: ProcessLauncher>(
    config: &SpawnConfig,
    manager: &AgentManager,
    shared_token: &Mutex<Option<String>>,
    launcher: &L,
) {
    if !config.spawn_agent || manager.has_authorized_agent() {
        return;
    }

    let token = generate_token();
    *shared_token.lock() = Some(token.clone());
    tracing::debug!(token = "<redacted>", "installing fresh agent token");

    let args = vec!["--token".to_string(), token, "--agent".to_string()];
    match launcher.launch_as_interactive_user(&config.agent_exe, &args) {
        Ok(pid) => tracing::info!(pid, "spawned agent process"),
        Err(err) => tracing::warn!(error = %err, "failed to spawn agent process"),
    }
}

fn generate_token() -> String {
    let alphabet: Vec<char> = ALPHANUMERIC.iter().map(|&b| b as char).collect();
    nanoid::nanoid!(16, &alphabet)
}

#[cfg(test)]
#[path = "spawn_tests.rs"]
mod spawn_tests;
