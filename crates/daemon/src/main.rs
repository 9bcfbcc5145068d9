// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `watchd`: runs as the host-activity server by default, or — given
//! `--agent --token <str>` — as the short-lived agent process the server
//! itself spawns (spec §4.11/§4.12).

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use parking_lot::Mutex;
use tracing_subscriber::EnvFilter;

use kpr_agent::{ActiveUserProbe, LocalActiveUserProbe, NullForegroundWindowProbe, NullScreenCapture, ProbeLoop};
use kpr_core::SystemClock;
use kpr_daemon::config::{acquire_single_instance_lock, Config};
use kpr_daemon::{run_health_loop, AgentManager, DaemonConnectionFactory, DaemonError, Server, SpawnConfig};
use kpr_repo::{FileSystemRepository, Repository};
use kpr_wire::{AuthRequest, Response, WireMessage};

#[derive(Parser, Debug)]
#[command(name = "watchd", about = "Host-activity agent/server process")]
struct Cli {
    /// Run as the short-lived agent instead of the server.
    #[arg(long)]
    agent: bool,

    /// Handshake token; required with `--agent`.
    #[arg(long)]
    token: Option<String>,

    /// Disables the server's spawn/health loop.
    #[arg(long)]
    passive: bool,

    /// Path to a `WatchConfig` TOML file; defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(err) => {
            eprintln!("failed to start async runtime: {err}");
            return std::process::ExitCode::FAILURE;
        }
    };

    match rt.block_on(run(cli)) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("watchd: {err}");
            std::process::ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), DaemonError> {
    let mut config = Config::load(cli.config.as_deref())?;
    if cli.passive {
        config.watch.passive = true;
    }

    let _log_guard = init_logging(&config)?;

    if cli.agent {
        let token = cli
            .token
            .ok_or_else(|| DaemonError::Usage("--agent requires --token".to_string()))?;
        run_agent(config, token).await
    } else {
        run_server(config).await
    }
}

fn init_logging(config: &Config) -> Result<tracing_appender::non_blocking::WorkerGuard, DaemonError> {
    let log_dir = config
        .log_path
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| config.state_dir.clone());
    std::fs::create_dir_all(&log_dir).map_err(|source| DaemonError::Io {
        path: log_dir.clone(),
        source,
    })?;

    let appender = tracing_appender::rolling::daily(&log_dir, "watchd.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(non_blocking)
        .init();
    Ok(guard)
}

async fn run_server(config: Config) -> Result<(), DaemonError> {
    let _lock = acquire_single_instance_lock(&config.state_dir, "watchd", None)?;

    std::fs::create_dir_all(&config.reports_dir).map_err(|source| DaemonError::Io {
        path: config.reports_dir.clone(),
        source,
    })?;

    let manager = Arc::new(AgentManager::new());
    let shared_token: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
    let repo: Arc<Mutex<dyn Repository + Send>> =
        Arc::new(Mutex::new(FileSystemRepository::new(config.reports_dir.clone())));

    let factory = Arc::new(DaemonConnectionFactory::new(
        Arc::clone(&manager),
        Arc::clone(&shared_token),
        repo,
        LocalActiveUserProbe,
        config.watch.read_buffer_size,
        config.watch.peer_drop_timeout(),
    ));

    let server = Server::bind(config.watch.port, factory).await?;
    tracing::info!(addr = ?server.local_addr(), "watchd listening");

    let current_exe = std::env::current_exe().unwrap_or_else(|_| PathBuf::from("watchd"));
    let health_handle = tokio::spawn(run_health_loop(
        SpawnConfig {
            activity_check_interval: config.watch.activity_check_interval(),
            spawn_agent: !config.watch.passive,
            agent_exe: current_exe,
        },
        Arc::clone(&manager),
        shared_token,
        kpr_agent::NullProcessLauncher,
    ));

    server.serve(shutdown_signal()).await;
    health_handle.abort();
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::warn!("failed to install ctrl-c handler; shutdown signal disabled");
        std::future::pending::<()>().await;
    }
    tracing::info!("received shutdown signal");
}

async fn run_agent(config: Config, token: String) -> Result<(), DaemonError> {
    let username = LocalActiveUserProbe
        .current_user()
        .unwrap_or_else(|| "unknown".to_string());

    let addr = (std::net::Ipv4Addr::LOCALHOST, config.watch.port);
    let mut stream = tokio::net::TcpStream::connect(addr)
        .await
        .map_err(|source| DaemonError::Io {
            path: PathBuf::from(format!("127.0.0.1:{}", config.watch.port)),
            source,
        })?;

    let auth = WireMessage::Auth(AuthRequest {
        username: username.clone(),
        token,
    });
    let payload = serde_json::to_vec(&auth)?;
    kpr_wire::write_message(&mut stream, &payload).await?;

    let response_bytes = kpr_wire::read_message(&mut stream).await?;
    let response: Response = serde_json::from_slice(&response_bytes)?;
    let authorized = response
        .answer
        .as_ref()
        .and_then(|a| a.get("authorized"))
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    if !authorized {
        tracing::warn!("server rejected agent handshake");
        return Ok(());
    }

    // No platform-specific foreground-window/screen-capture backend ships
    // in this workspace (scope carve-out, see kpr-agent::os); the probe
    // loop still runs so the `data` handshake path is exercised end to end.
    let mut probe_loop = ProbeLoop::new(
        SystemClock,
        NullForegroundWindowProbe,
        NullScreenCapture,
        username,
        false,
        Duration::from_secs(60),
    );

    loop {
        probe_loop.tick(&mut stream).await;
        tokio::time::sleep(config.watch.activity_check_interval()).await;
    }
}
