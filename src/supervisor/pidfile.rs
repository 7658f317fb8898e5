//! PID marker handling for single-instance enforcement.

use std::fs;
use std::path::{Path, PathBuf};

use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

use crate::error::SupervisorError;
use crate::Result;

/// The claimed PID marker: one line, the decimal pid of the running instance.
#[derive(Debug)]
pub struct PidFile {
    path: PathBuf,
    pid: u32,
}

impl PidFile {
    /// Claim the marker, enforcing singleton semantics.
    ///
    /// A marker naming a live process means another instance owns this host.
    /// A marker naming a dead process (or holding garbage) is stale and is
    /// replaced.
    ///
    /// # Errors
    ///
    /// Returns [`SupervisorError::AlreadyRunning`] when the recorded pid is
    /// alive, or [`SupervisorError::PidFile`] when the marker cannot be
    /// written. The latter is fatal to the caller: singleton semantics cannot
    /// be guaranteed without the marker.
    pub fn acquire(path: &Path) -> Result<Self> {
        if let Some(recorded) = read_marker(path) {
            if process_alive(recorded) {
                return Err(SupervisorError::AlreadyRunning { pid: recorded }.into());
            }
            tracing::warn!(pid = recorded, path = %path.display(), "removing stale pid marker");
            let _ = fs::remove_file(path);
        }

        let pid = std::process::id();
        fs::write(path, format!("{pid}\n"))
            .map_err(|e| SupervisorError::pid_file(path.display().to_string(), e.to_string()))?;
        tracing::info!(pid, path = %path.display(), "pid marker written");

        Ok(Self {
            path: path.to_path_buf(),
            pid,
        })
    }

    /// Remove the marker. Called on shutdown and immediately before respawn.
    pub fn release(&self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to remove pid marker");
        } else {
            tracing::info!(path = %self.path.display(), "pid marker removed");
        }
    }

    /// The pid recorded in the marker.
    #[must_use]
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// The marker's location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Whether a process with `pid` currently exists on this host.
#[must_use]
pub fn process_alive(pid: u32) -> bool {
    let target = Pid::from_u32(pid);
    let mut system = System::new();
    system.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[target]),
        true,
        ProcessRefreshKind::nothing(),
    );
    system.process(target).is_some()
}

/// Best-effort read of the recorded pid; unreadable or garbled markers read
/// as absent and get overwritten.
fn read_marker(path: &Path) -> Option<u32> {
    let contents = fs::read_to_string(path).ok()?;
    contents.trim().parse().ok()
}
