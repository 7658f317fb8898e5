//! Background process management: detached spawn and self-image tracking.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, SystemTime};

use crate::error::SupervisorError;
use crate::Result;

/// How long the launcher lingers before exiting, giving the detached child
/// time to claim the pid marker.
pub const LAUNCH_GRACE: Duration = Duration::from_secs(1);

/// Snapshot of the daemon's own executable, taken at startup.
///
/// A differing on-disk modification time later signals that the binary was
/// updated and the running instance should respawn.
#[derive(Debug, Clone)]
pub struct SelfImage {
    path: PathBuf,
    modified: SystemTime,
}

impl SelfImage {
    /// Snapshot the currently running executable.
    ///
    /// # Errors
    ///
    /// Returns an error if the executable path or its metadata cannot be
    /// read.
    pub fn capture() -> Result<Self> {
        Self::for_path(env::current_exe()?)
    }

    /// Snapshot an arbitrary image path.
    ///
    /// # Errors
    ///
    /// Returns an error if the path's metadata cannot be read.
    pub fn for_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let modified = std::fs::metadata(&path)?.modified()?;
        Ok(Self { path, modified })
    }

    /// Whether the image on disk no longer matches the captured timestamp.
    ///
    /// A temporarily unreadable image (e.g. mid-replacement) reads as
    /// unchanged; the next poll sees the final state.
    #[must_use]
    pub fn changed(&self) -> bool {
        std::fs::metadata(&self.path)
            .and_then(|m| m.modified())
            .map(|m| m != self.modified)
            .unwrap_or(false)
    }
}

/// Spawn the daemon's own executable, detached from the terminal.
///
/// Side effects: the child gets its own process group, standard input from
/// the null device, and standard output/error appended to the given log
/// files, so closing the launching terminal cannot touch it.
///
/// # Errors
///
/// Returns an error if the log files cannot be opened or the process cannot
/// be spawned.
pub fn spawn_detached(args: &[OsString], stdout_log: &Path, stderr_log: &Path) -> Result<u32> {
    let exe = env::current_exe().map_err(|e| SupervisorError::SpawnFailed {
        reason: e.to_string(),
    })?;
    let stdout = open_log(stdout_log)?;
    let stderr = open_log(stderr_log)?;

    let mut command = Command::new(exe);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(stdout)
        .stderr(stderr);

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }

    let child = command.spawn().map_err(|e| SupervisorError::SpawnFailed {
        reason: e.to_string(),
    })?;
    Ok(child.id())
}

fn open_log(path: &Path) -> Result<std::fs::File> {
    Ok(std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_self_image_unchanged() {
        let tmp = TempDir::new().unwrap();
        let image = tmp.path().join("vigil");
        fs::write(&image, "binary").unwrap();

        let snapshot = SelfImage::for_path(&image).unwrap();
        assert!(!snapshot.changed());
    }

    #[test]
    fn test_self_image_detects_update() {
        let tmp = TempDir::new().unwrap();
        let image = tmp.path().join("vigil");
        fs::write(&image, "binary").unwrap();

        let snapshot = SelfImage::for_path(&image).unwrap();

        let file = fs::File::options().write(true).open(&image).unwrap();
        file.set_modified(SystemTime::now() + Duration::from_secs(3600))
            .unwrap();

        assert!(snapshot.changed());
    }

    #[test]
    fn test_self_image_vanished_reads_unchanged() {
        let tmp = TempDir::new().unwrap();
        let image = tmp.path().join("vigil");
        fs::write(&image, "binary").unwrap();

        let snapshot = SelfImage::for_path(&image).unwrap();
        fs::remove_file(&image).unwrap();

        assert!(!snapshot.changed());
    }

    #[test]
    fn test_self_image_missing_path_fails() {
        assert!(SelfImage::for_path("/no/such/binary").is_err());
    }

    #[test]
    fn test_spawn_detached_redirects_streams() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("out.log");
        let err = tmp.path().join("err.log");

        // The spawned copy of this test binary rejects the unknown flag and
        // exits immediately; only the spawn mechanics are under test.
        let pid = spawn_detached(&[OsString::from("--daemonized")], &out, &err).unwrap();
        assert!(pid > 0);
        assert!(out.exists());
        assert!(err.exists());
    }
}
