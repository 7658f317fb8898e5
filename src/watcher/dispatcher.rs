//! Event dispatch: classify by the live filesystem, route to a handler.

use super::events::{ChangeEvent, ChangeKind};
use super::filter::IgnoreRules;
use super::registry::WatchRegistry;
use super::scanner;
use crate::reporter::ModificationReporter;

/// Routes each delivered event to the registry or the reporter.
///
/// Owns the registry; all mutation funnels through here and the teardown
/// paths, so no locking is involved.
pub struct Dispatcher {
    registry: WatchRegistry,
    reporter: ModificationReporter,
}

impl Dispatcher {
    #[must_use]
    pub fn new(registry: WatchRegistry, reporter: ModificationReporter) -> Self {
        Self { registry, reporter }
    }

    /// Handle one event.
    ///
    /// Classification trusts the current state of the filesystem object, not
    /// the delivered kind alone: by dispatch time the object may already have
    /// changed again, and a deleted directory no longer answers "is it a
    /// directory". A rapid create-then-delete surfaces only its terminal
    /// state.
    pub async fn dispatch(&mut self, event: ChangeEvent) {
        if event.path.is_dir() {
            if event.kind == ChangeKind::Created {
                if IgnoreRules::is_ignored_dir(&event.path) {
                    tracing::debug!(path = %event.path.display(), "ignoring created directory");
                    return;
                }
                // mkdir -p may have produced a whole subtree before any
                // watch existed; register everything under the new directory.
                scanner::register_tree(&mut self.registry, &event.path);
            }
        } else if event.path.is_file() {
            self.reporter.report(&event.path).await;
        } else {
            self.registry.remove(&event.path);
        }
    }

    /// Read access to the registry.
    #[must_use]
    pub fn registry(&self) -> &WatchRegistry {
        &self.registry
    }

    /// Mutable access for teardown paths.
    pub fn registry_mut(&mut self) -> &mut WatchRegistry {
        &mut self.registry
    }
}
