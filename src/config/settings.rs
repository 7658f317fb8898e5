//! Configuration settings and validation.

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use crate::{Error, Result};

/// Collector host the daemon reports to unless overridden.
pub const DEFAULT_COLLECTOR: &str = "127.0.0.1:8181";

/// Default PID marker location.
pub const DEFAULT_PID_FILE: &str = "/tmp/vigil.pid";

/// Default directory for the daemon's log files.
pub const DEFAULT_LOG_DIR: &str = "/tmp/vigil";

/// Main configuration for the Vigil daemon.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory trees to watch.
    pub watch_roots: Vec<PathBuf>,

    /// Username whose file modifications are reported.
    pub tracked_user: String,

    /// Collector host:port receiving `/save-event` calls.
    pub collector: String,

    /// PID marker file enforcing single-instance execution.
    pub pid_file: PathBuf,

    /// Directory holding the daemon log and redirected streams.
    pub log_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit log lines as JSON.
    pub log_json: bool,

    /// Main loop poll interval.
    pub poll_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            watch_roots: Vec::new(),
            tracked_user: String::new(),
            collector: DEFAULT_COLLECTOR.to_string(),
            pid_file: PathBuf::from(DEFAULT_PID_FILE),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            log_level: "info".to_string(),
            log_json: false,
            poll_interval: Duration::from_secs(1),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// At least one watch root must name an existing directory; this is the
    /// only startup input the daemon cannot recover from.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration value is invalid.
    pub fn validate(&self) -> Result<()> {
        if self.watch_roots.is_empty() {
            return Err(Error::config("at least one watch directory is required"));
        }

        if !self.watch_roots.iter().any(|p| p.is_dir()) {
            return Err(Error::config(format!(
                "none of the given watch paths is an existing directory: {}",
                self.watch_roots
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }

        if self.tracked_user.is_empty() {
            return Err(Error::config("tracked user cannot be empty"));
        }

        if self.collector.is_empty() {
            return Err(Error::config("collector host cannot be empty"));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(Error::config(format!(
                "invalid log level '{}', must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            )));
        }

        if self.poll_interval.is_zero() {
            return Err(Error::config("poll interval cannot be zero"));
        }

        Ok(())
    }

    /// Watch roots that currently exist as directories, canonicalized.
    ///
    /// Roots that vanished since startup are skipped; registration of the
    /// survivors proceeds normally.
    #[must_use]
    pub fn existing_roots(&self) -> Vec<PathBuf> {
        self.watch_roots
            .iter()
            .filter_map(|p| p.canonicalize().ok())
            .filter(|p| p.is_dir())
            .collect()
    }

    /// Path of the structured daemon log.
    #[must_use]
    pub fn log_path(&self) -> PathBuf {
        self.log_dir.join("vigil.log")
    }

    /// File capturing the daemonized process's standard output.
    #[must_use]
    pub fn stdout_log_path(&self) -> PathBuf {
        self.log_dir.join("vigil.out.log")
    }

    /// File capturing the daemonized process's standard error.
    #[must_use]
    pub fn stderr_log_path(&self) -> PathBuf {
        self.log_dir.join("vigil.err.log")
    }

    /// Rebuild the argument vector for a fresh daemon invocation.
    ///
    /// Used both when backgrounding the initial launch and when respawning
    /// after a self-update: the new process receives the original roots and
    /// tracked-user override plus the hidden marker telling it that it is
    /// already detached.
    #[must_use]
    pub fn respawn_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.watch_roots.iter().map(Into::into).collect();
        args.push("--user".into());
        args.push(self.tracked_user.clone().into());
        args.push("--collector".into());
        args.push(self.collector.clone().into());
        args.push("--pid-file".into());
        args.push(self.pid_file.clone().into());
        args.push("--log-dir".into());
        args.push(self.log_dir.clone().into());
        args.push("--log-level".into());
        args.push(self.log_level.clone().into());
        if self.log_json {
            args.push("--log-json".into());
        }
        args.push("--daemonized".into());
        args
    }
}
