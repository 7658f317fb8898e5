//! Vigil - filesystem activity tracking daemon.
//!
//! Entry point: CLI parsing, background launch, daemon startup.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use vigil::config::{Config, DEFAULT_COLLECTOR, DEFAULT_LOG_DIR, DEFAULT_PID_FILE};
use vigil::error::SupervisorError;
use vigil::supervisor::{self, Daemon, LAUNCH_GRACE};
use vigil::Error;

/// Vigil - filesystem activity tracking daemon
#[derive(Parser, Debug)]
#[command(name = "vigil")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directories to watch
    #[arg(required = true)]
    roots: Vec<PathBuf>,

    /// Username whose modifications are reported (defaults to the invoking user)
    #[arg(short, long, env = "VIGIL_USER")]
    user: Option<String>,

    /// Collector host:port receiving activity events
    #[arg(long, env = "VIGIL_COLLECTOR", default_value = DEFAULT_COLLECTOR)]
    collector: String,

    /// PID marker file enforcing single-instance execution
    #[arg(long, env = "VIGIL_PID_FILE", default_value = DEFAULT_PID_FILE)]
    pid_file: PathBuf,

    /// Directory for the daemon's log files
    #[arg(long, env = "VIGIL_LOG_DIR", default_value = DEFAULT_LOG_DIR)]
    log_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "VIGIL_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Enable JSON logging output
    #[arg(long, env = "VIGIL_LOG_JSON")]
    log_json: bool,

    /// Stay in the foreground and log to the console
    #[arg(long, conflicts_with = "daemonized")]
    foreground: bool,

    /// Internal: this process is already detached
    #[arg(long, hide = true)]
    daemonized: bool,
}

// The daemon is a single logical thread of control; the poll loop never
// needs worker threads.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let tracked_user = match cli.user {
        Some(user) => user,
        None => uzers::get_current_username()
            .map(|u| u.to_string_lossy().into_owned())
            .context("cannot determine the invoking user; pass --user")?,
    };

    // Absolute roots survive the respawn round trip regardless of the new
    // process's working directory.
    let watch_roots: Vec<PathBuf> = cli
        .roots
        .into_iter()
        .map(|p| p.canonicalize().unwrap_or(p))
        .collect();

    let config = Config {
        watch_roots,
        tracked_user,
        collector: cli.collector,
        pid_file: cli.pid_file,
        log_dir: cli.log_dir,
        log_level: cli.log_level,
        log_json: cli.log_json,
        ..Default::default()
    };

    // Validation runs before daemonizing so failures stay on the terminal.
    config
        .validate()
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;

    if !cli.foreground && !cli.daemonized {
        return launch_background(&config);
    }

    if cli.foreground {
        supervisor::init_console(&config.log_level, config.log_json);
    } else {
        supervisor::init_file(
            &config.log_level,
            config.log_json,
            &config.log_dir,
            &config.log_path(),
        );
    }

    tracing::info!("vigil v{} starting", env!("CARGO_PKG_VERSION"));

    let daemon = match Daemon::start(config) {
        Ok(daemon) => daemon,
        Err(Error::Supervisor(SupervisorError::AlreadyRunning { pid })) => {
            tracing::info!(pid, "another instance owns this host, exiting");
            return Ok(());
        }
        Err(e) => {
            tracing::error!(error = %e, "daemon startup failed");
            return Err(e.into());
        }
    };

    daemon.run().await.map_err(|e| {
        tracing::error!(error = %e, "daemon terminated with error");
        anyhow::anyhow!(e.to_string())
    })
}

/// Hand off to a detached child, wait out the grace period, exit 0.
fn launch_background(config: &Config) -> anyhow::Result<()> {
    std::fs::create_dir_all(&config.log_dir)
        .with_context(|| format!("cannot create log directory {}", config.log_dir.display()))?;

    let pid = supervisor::spawn_detached(
        &config.respawn_args(),
        &config.stdout_log_path(),
        &config.stderr_log_path(),
    )
    .map_err(|e| anyhow::anyhow!(e.to_string()))?;

    println!(
        "vigil: watching in the background (pid {pid}), logs in {}",
        config.log_dir.display()
    );
    std::thread::sleep(LAUNCH_GRACE);
    Ok(())
}
