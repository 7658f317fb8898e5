//! Directory enumeration for initial watch registration.
//!
//! Walks a tree natively, applying the ignore rules inline, and registers a
//! watch for every surviving directory.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::filter::IgnoreRules;
use super::registry::WatchRegistry;

/// Discover watchable directories under `root`, pruning ignored subtrees.
///
/// The root itself is always included even if its own name would match the
/// ignore rules; it was named explicitly by the operator.
#[must_use]
pub fn discover_dirs(root: &Path) -> Vec<PathBuf> {
    let mut dirs = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !IgnoreRules::is_ignored_dir(e.path()));

    for entry in walker {
        match entry {
            Ok(entry) if entry.file_type().is_dir() => dirs.push(entry.into_path()),
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "error walking directory"),
        }
    }

    dirs
}

/// Register `root` and every non-ignored subdirectory.
///
/// Rejected paths are logged and skipped; returns the number of directories
/// handed to the registry successfully.
pub fn register_tree(registry: &mut WatchRegistry, root: &Path) -> usize {
    let mut registered = 0;
    for dir in discover_dirs(root) {
        match registry.add(&dir) {
            Ok(()) => registered += 1,
            Err(e) => {
                tracing::warn!(path = %dir.display(), error = %e, "skipping unwatchable directory");
            }
        }
    }
    registered
}
