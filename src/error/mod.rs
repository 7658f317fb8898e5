//! Error types and Result aliases for Vigil.
//!
//! This module defines the error hierarchy used throughout the crate.
//! All public functions return `Result<T, Error>` or `Result<T>`.

use thiserror::Error;

/// Result type alias using Vigil's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Vigil operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Watch registration/cancellation error.
    #[error("watch error: {0}")]
    Watch(#[from] WatchError),

    /// Modification reporting error.
    #[error("report error: {0}")]
    Report(#[from] ReportError),

    /// Daemon lifecycle error.
    #[error("supervisor error: {0}")]
    Supervisor(#[from] SupervisorError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Watch registry errors.
#[derive(Error, Debug)]
pub enum WatchError {
    /// The notification source rejected the path.
    #[error("failed to watch path '{path}': {reason}")]
    WatchFailed { path: String, reason: String },

    /// The notification source itself could not be created.
    #[error("notification source unavailable: {0}")]
    SourceUnavailable(String),
}

/// Modification reporter errors.
#[derive(Error, Debug)]
pub enum ReportError {
    /// Owner lookup via stat failed.
    #[error("owner lookup failed for '{path}'")]
    OwnerLookup { path: String },

    /// The outbound notification could not be delivered.
    #[error("failed to deliver event to '{url}': {reason}")]
    Delivery { url: String, reason: String },
}

/// Daemon lifecycle errors.
#[derive(Error, Debug)]
pub enum SupervisorError {
    /// Another instance already owns the PID marker.
    #[error("another instance is already running with pid {pid}")]
    AlreadyRunning { pid: u32 },

    /// The PID marker file could not be read or written.
    #[error("pid file error at '{path}': {reason}")]
    PidFile { path: String, reason: String },

    /// Spawning the background/replacement process failed.
    #[error("failed to spawn daemon process: {reason}")]
    SpawnFailed { reason: String },
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl SupervisorError {
    /// Create a pid-file error for the given marker path.
    pub fn pid_file(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::PidFile {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
