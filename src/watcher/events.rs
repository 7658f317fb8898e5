//! Change event types produced by the notification source.

use std::path::PathBuf;

use notify::event::{ModifyKind, RenameMode};
use notify::EventKind;

/// Event classes the daemon subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// A filesystem object appeared at the path.
    Created,
    /// The contents of the object at the path changed.
    Modified,
    /// The object at the path is gone.
    Removed,
}

/// One change at one path, consumed exactly once by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// Translate a raw notification-source event into zero or more changes.
///
/// Raw events carrying several paths fan out into one `ChangeEvent` per path.
/// Access and metadata-only events are not forwarded; a rename fans out into
/// a removal of the old path and a creation of the new one. The dispatcher
/// re-checks the live filesystem anyway, so the kind recorded here only has
/// to be a faithful reading of what the source delivered.
#[must_use]
pub fn from_notify(event: notify::Event) -> Vec<ChangeEvent> {
    let paths = event.paths;
    match event.kind {
        EventKind::Create(_) => fan_out(paths, ChangeKind::Created),
        EventKind::Remove(_) => fan_out(paths, ChangeKind::Removed),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            fan_out(paths, ChangeKind::Removed)
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => fan_out(paths, ChangeKind::Created),
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            // Paths arrive as [from, to].
            let mut changes = Vec::with_capacity(paths.len());
            let mut iter = paths.into_iter();
            if let Some(from) = iter.next() {
                changes.push(ChangeEvent::new(from, ChangeKind::Removed));
            }
            changes.extend(iter.map(|to| ChangeEvent::new(to, ChangeKind::Created)));
            changes
        }
        EventKind::Modify(ModifyKind::Metadata(_)) => Vec::new(),
        EventKind::Modify(_) => fan_out(paths, ChangeKind::Modified),
        EventKind::Access(_) | EventKind::Any | EventKind::Other => Vec::new(),
    }
}

fn fan_out(paths: Vec<PathBuf>, kind: ChangeKind) -> Vec<ChangeEvent> {
    paths
        .into_iter()
        .map(|path| ChangeEvent::new(path, kind))
        .collect()
}
