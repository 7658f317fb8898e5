//! Static ignore rules for discovered paths.

use std::path::Path;

/// Directory names never watched, no matter where they appear.
const IGNORED_DIRS: &[&str] = &[
    ".git",
    ".svn",
    ".hg",
    ".bzr",
    "node_modules",
    "target",
    "vendor",
    "__pycache__",
    "venv",
    ".venv",
    ".idea",
    ".vscode",
    "dist",
    "build",
    ".cache",
];

/// Filename prefixes marking transient files (dotfiles, emacs autosaves and
/// lock files).
const TRANSIENT_PREFIXES: &[&str] = &[".", "#"];

/// Filename suffixes marking transient files (editor swap and backup files).
const TRANSIENT_SUFFIXES: &[&str] = &["~", ".swp", ".swx", ".swo", ".tmp", ".bak", ".orig"];

/// Rule set deciding which discovered paths are never acted on.
///
/// Evaluated once per discovered directory during enumeration and
/// directory-creation handling, and once per file before a modification is
/// reported.
pub struct IgnoreRules;

impl IgnoreRules {
    /// Whether a directory must never be watched.
    ///
    /// Only the leaf name matters: parents were already vetted when they were
    /// registered.
    #[must_use]
    pub fn is_ignored_dir(path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        IGNORED_DIRS.contains(&name) || (name.starts_with('.') && name.len() > 1)
    }

    /// Whether a file's name marks it as editor noise not worth reporting.
    #[must_use]
    pub fn is_transient_file(path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        TRANSIENT_PREFIXES.iter().any(|p| name.starts_with(p))
            || TRANSIENT_SUFFIXES.iter().any(|s| name.ends_with(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ignored_dirs() {
        assert!(IgnoreRules::is_ignored_dir(Path::new("/proj/.git")));
        assert!(IgnoreRules::is_ignored_dir(Path::new("/proj/node_modules")));
        assert!(IgnoreRules::is_ignored_dir(Path::new("/proj/target")));
        assert!(IgnoreRules::is_ignored_dir(Path::new("/proj/.hidden")));
        assert!(!IgnoreRules::is_ignored_dir(Path::new("/proj/src")));
        assert!(!IgnoreRules::is_ignored_dir(Path::new("/proj/lib")));
    }

    #[test]
    fn test_transient_files() {
        assert!(IgnoreRules::is_transient_file(Path::new("/proj/.a.go.swp")));
        assert!(IgnoreRules::is_transient_file(Path::new("/proj/a.go~")));
        assert!(IgnoreRules::is_transient_file(Path::new("/proj/#a.go#")));
        assert!(IgnoreRules::is_transient_file(Path::new("/proj/.env")));
        assert!(IgnoreRules::is_transient_file(Path::new("/proj/notes.bak")));
        assert!(!IgnoreRules::is_transient_file(Path::new("/proj/a.go")));
        assert!(!IgnoreRules::is_transient_file(Path::new("/proj/Makefile")));
    }
}
