// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! kpr-daemon: connection handling, agent authorization, and the spawn/
//! health loop behind the `watchd` binary. See `crate::config` for the
//! single-instance guard and TOML config, `crate::server`/`crate::factory`
//! for the accept loop, and `crate::spawn` for the health loop that keeps
//! exactly one authorized agent alive per host.

pub mod agent_connection;
pub mod communicator;
pub mod config;
pub mod connection;
pub mod error;
pub mod factory;
pub mod handlers;
pub mod manager;
pub mod server;
pub mod spawn;

pub use agent_connection::{AgentConnection, ConnId, ConnectionState};
pub use communicator::Communicator;
pub use config::{acquire_single_instance_lock, state_dir, Config, WatchConfig};
pub use connection::{ConnEvent, Connection, OutboundFrame};
pub use error::DaemonError;
pub use factory::DaemonConnectionFactory;
pub use handlers::{AuthorizationHandler, DataHandler, HandlerOutcome, MsgHandler};
pub use manager::AgentManager;
pub use server::{ConnectionFactory, Server};
pub use spawn::{run_health_loop, SpawnConfig};
