//! Modification reporting to the activity collector.
//!
//! Filters modify events by file ownership and fires one best-effort HTTP
//! call per accepted modification. The daemon's correctness never depends on
//! the collector answering.

use std::os::unix::fs::MetadataExt;
use std::path::Path;

use crate::error::ReportError;
use crate::watcher::IgnoreRules;

/// Reports accepted file modifications to the collector.
pub struct ModificationReporter {
    client: reqwest::Client,
    tracked_user: String,
    tracked_uid: Option<u32>,
    collector: String,
}

impl ModificationReporter {
    /// Create a reporter for `tracked_user` against `collector` (host:port).
    ///
    /// The tracked user's uid is resolved once, up front; if the name is
    /// unknown to the user database only root-owned changes will match.
    #[must_use]
    pub fn new(tracked_user: impl Into<String>, collector: impl Into<String>) -> Self {
        let tracked_user = tracked_user.into();
        let tracked_uid = uzers::get_user_by_name(&tracked_user).map(|u| u.uid());
        if tracked_uid.is_none() {
            tracing::warn!(
                user = %tracked_user,
                "tracked user not found in the user database; only root-owned changes will match"
            );
        }

        Self {
            client: reqwest::Client::new(),
            tracked_user,
            tracked_uid,
            collector: collector.into(),
        }
    }

    /// Whether a modification to `path` should produce an outbound event.
    ///
    /// Transient editor files are discarded first; then the owner must be the
    /// tracked user or the superuser. A failed owner lookup discards the
    /// event without a network call.
    #[must_use]
    pub fn should_report(&self, path: &Path) -> bool {
        if IgnoreRules::is_transient_file(path) {
            return false;
        }

        match owner_uid(path) {
            Ok(uid) => owner_accepted(uid, self.tracked_uid),
            Err(e) => {
                tracing::debug!(error = %e, "modification discarded");
                false
            }
        }
    }

    /// The collector endpoint for an event at `timestamp`.
    #[must_use]
    pub fn event_url(&self, timestamp: i64) -> String {
        format!(
            "http://{}/save-event/{}/{}",
            self.collector, self.tracked_user, timestamp
        )
    }

    /// Report a modification of `path`, if it passes the filters.
    ///
    /// Fire and forget: one GET, no retry, no backoff; the response is not
    /// inspected and failures are logged and absorbed.
    pub async fn report(&self, path: &Path) {
        if !self.should_report(path) {
            tracing::debug!(path = %path.display(), "modification discarded");
            return;
        }

        let timestamp = chrono::Utc::now().timestamp();
        let url = self.event_url(timestamp);
        tracing::info!(path = %path.display(), user = %self.tracked_user, "modification accepted");

        match self.deliver(&url).await {
            Ok(()) => tracing::debug!(url = %url, "event sent"),
            Err(e) => tracing::warn!(error = %e, "event delivery failed"),
        }
    }

    async fn deliver(&self, url: &str) -> std::result::Result<(), ReportError> {
        self.client
            .get(url)
            .send()
            .await
            .map_err(|e| ReportError::Delivery {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }
}

/// Owning uid of the file at `path`.
fn owner_uid(path: &Path) -> std::result::Result<u32, ReportError> {
    std::fs::metadata(path)
        .map(|m| m.uid())
        .map_err(|_| ReportError::OwnerLookup {
            path: path.display().to_string(),
        })
}

/// The ownership rule: the tracked user's changes count, and so do the
/// superuser's.
fn owner_accepted(owner: u32, tracked_uid: Option<u32>) -> bool {
    owner == 0 || Some(owner) == tracked_uid
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_owner_accepted_rule() {
        assert!(owner_accepted(0, None));
        assert!(owner_accepted(0, Some(1000)));
        assert!(owner_accepted(1000, Some(1000)));
        assert!(!owner_accepted(1000, Some(1001)));
        assert!(!owner_accepted(1000, None));
    }

    #[test]
    fn test_should_report_own_file() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("a.go");
        fs::write(&file, "package main").unwrap();

        let user = uzers::get_current_username()
            .unwrap()
            .to_string_lossy()
            .into_owned();
        let reporter = ModificationReporter::new(user, "127.0.0.1:1");
        assert!(reporter.should_report(&file));
    }

    #[test]
    fn test_should_report_rejects_transient() {
        let tmp = TempDir::new().unwrap();
        let swap = tmp.path().join(".a.go.swp");
        fs::write(&swap, "swap").unwrap();

        let user = uzers::get_current_username()
            .unwrap()
            .to_string_lossy()
            .into_owned();
        let reporter = ModificationReporter::new(user, "127.0.0.1:1");
        assert!(!reporter.should_report(&swap));
    }

    #[test]
    fn test_should_report_vanished_file() {
        let reporter = ModificationReporter::new("alice", "127.0.0.1:1");
        assert!(!reporter.should_report(Path::new("/no/such/file.go")));
    }

    #[test]
    fn test_event_url() {
        let reporter = ModificationReporter::new("alice", "collector.internal:8181");
        assert_eq!(
            reporter.event_url(1_700_000_000),
            "http://collector.internal:8181/save-event/alice/1700000000"
        );
    }

    #[tokio::test]
    async fn test_report_absorbs_delivery_failure() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("a.go");
        fs::write(&file, "package main").unwrap();

        let user = uzers::get_current_username()
            .unwrap()
            .to_string_lossy()
            .into_owned();
        // Nothing listens here; report must return normally anyway.
        let reporter = ModificationReporter::new(user, "127.0.0.1:1");
        reporter.report(&file).await;
    }
}
