//! Watch registry: the mapping from path to active subscription.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crossbeam_channel::{unbounded, Receiver, Sender};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};

use super::events::{self, ChangeEvent};
use crate::error::WatchError;
use crate::Result;

/// One active subscription. With the notification source used here the
/// canonical path doubles as the cancellation handle.
#[derive(Debug, Clone)]
pub struct Watch {
    path: PathBuf,
}

impl Watch {
    /// The watched path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Owns the notification source plus the path-to-watch mapping.
///
/// Invariant: at most one `Watch` per path. Entries leave the map exactly
/// when the corresponding directory is deleted or when the whole registry is
/// torn down before respawn or shutdown.
pub struct WatchRegistry {
    watcher: RecommendedWatcher,
    watches: HashMap<PathBuf, Watch>,
}

impl WatchRegistry {
    /// Create an empty registry and the channel its events arrive on.
    ///
    /// # Errors
    ///
    /// Returns an error if the notification source cannot be created.
    pub fn new() -> Result<(Self, Receiver<ChangeEvent>)> {
        let (tx, rx) = unbounded();
        let watcher =
            notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
                forward(&tx, res);
            })
            .map_err(|e| WatchError::SourceUnavailable(e.to_string()))?;

        Ok((
            Self {
                watcher,
                watches: HashMap::new(),
            },
            rx,
        ))
    }

    /// Subscribe to changes under `path` (non-recursive).
    ///
    /// No-op if the path already has a watch.
    ///
    /// # Errors
    ///
    /// Returns an error if the notification source rejects the path, e.g.
    /// permission denied or the path vanished between discovery and watch.
    pub fn add(&mut self, path: &Path) -> Result<()> {
        if self.watches.contains_key(path) {
            return Ok(());
        }

        self.watcher
            .watch(path, RecursiveMode::NonRecursive)
            .map_err(|e| WatchError::WatchFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        self.watches.insert(
            path.to_path_buf(),
            Watch {
                path: path.to_path_buf(),
            },
        );
        tracing::info!(path = %path.display(), "watch added");
        Ok(())
    }

    /// Cancel the subscription for `path` and drop its entry.
    ///
    /// No-op if absent. The kernel already dropped the subscription when the
    /// directory was deleted, so a failed cancel is not actionable.
    pub fn remove(&mut self, path: &Path) {
        if self.watches.remove(path).is_none() {
            return;
        }

        if let Err(e) = self.watcher.unwatch(path) {
            tracing::debug!(path = %path.display(), error = %e, "unwatch after deletion failed");
        }
        tracing::info!(path = %path.display(), "watch removed");
    }

    /// Cancel every active watch.
    ///
    /// Used before respawn and shutdown so the old process leaves no dangling
    /// kernel-level subscriptions.
    pub fn remove_all(&mut self) {
        let paths: Vec<PathBuf> = self.watches.keys().cloned().collect();
        for path in &paths {
            if let Err(e) = self.watcher.unwatch(path) {
                tracing::debug!(path = %path.display(), error = %e, "unwatch failed during teardown");
            }
        }
        self.watches.clear();
        tracing::info!(count = paths.len(), "all watches released");
    }

    /// Whether `path` currently has a watch.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.watches.contains_key(path)
    }

    /// Number of active watches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.watches.len()
    }

    /// Whether no watches are active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.watches.is_empty()
    }

    /// Snapshot of the watched paths.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.watches.keys().cloned().collect()
    }
}

/// Runs on the notification source's delivery thread; only translates and
/// forwards into the channel.
fn forward(tx: &Sender<ChangeEvent>, res: notify::Result<notify::Event>) {
    match res {
        Ok(event) => {
            for change in events::from_notify(event) {
                if tx.send(change).is_err() {
                    // Receiver gone; the daemon is tearing down.
                    return;
                }
            }
        }
        Err(e) => tracing::warn!(error = %e, "notification source error"),
    }
}
