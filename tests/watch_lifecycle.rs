//! Integration tests for the watch lifecycle and the collector contract.

use std::fs;
use std::time::Duration;

use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use vigil::reporter::ModificationReporter;
use vigil::watcher::{register_tree, ChangeEvent, Dispatcher, WatchRegistry};

/// Generous settle time for the notification source to deliver.
const EVENT_SETTLE: Duration = Duration::from_millis(750);

fn current_user() -> String {
    uzers::get_current_username()
        .unwrap()
        .to_string_lossy()
        .into_owned()
}

async fn drain_into(
    dispatcher: &mut Dispatcher,
    events: &crossbeam_channel::Receiver<ChangeEvent>,
) {
    let pending: Vec<ChangeEvent> = events.try_iter().collect();
    for event in pending {
        dispatcher.dispatch(event).await;
    }
}

/// A directory created under a watched root gains a watch, and loses it
/// again when deleted.
#[tokio::test]
async fn test_dynamic_watch_coverage_and_teardown() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().canonicalize().unwrap();

    let (mut registry, events) = WatchRegistry::new().unwrap();
    register_tree(&mut registry, &root);
    assert!(registry.contains(&root));

    let reporter = ModificationReporter::new("vigil-test-nobody", "127.0.0.1:1");
    let mut dispatcher = Dispatcher::new(registry, reporter);

    let sub = root.join("src");
    fs::create_dir(&sub).unwrap();
    tokio::time::sleep(EVENT_SETTLE).await;
    drain_into(&mut dispatcher, &events).await;
    assert!(
        dispatcher.registry().contains(&sub),
        "created directory should gain a watch"
    );

    fs::remove_dir(&sub).unwrap();
    tokio::time::sleep(EVENT_SETTLE).await;
    drain_into(&mut dispatcher, &events).await;
    assert!(
        !dispatcher.registry().contains(&sub),
        "deleted directory should lose its watch"
    );
}

/// Directories matching the ignore rules never gain a watch, neither during
/// enumeration nor from creation events.
#[tokio::test]
async fn test_ignored_directories_never_watched() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().canonicalize().unwrap();
    fs::create_dir(root.join("node_modules")).unwrap();

    let (mut registry, events) = WatchRegistry::new().unwrap();
    register_tree(&mut registry, &root);
    assert!(!registry.contains(&root.join("node_modules")));

    let reporter = ModificationReporter::new("vigil-test-nobody", "127.0.0.1:1");
    let mut dispatcher = Dispatcher::new(registry, reporter);

    fs::create_dir(root.join(".git")).unwrap();
    tokio::time::sleep(EVENT_SETTLE).await;
    drain_into(&mut dispatcher, &events).await;
    assert!(!dispatcher.registry().contains(&root.join(".git")));
}

/// The ownership filter: tracked-user (or root) files pass, others do not.
#[test]
fn test_ownership_filter() {
    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("a.go");
    fs::write(&file, "package main").unwrap();

    let own = ModificationReporter::new(current_user(), "127.0.0.1:1");
    assert!(own.should_report(&file));

    let other = ModificationReporter::new("vigil-no-such-user", "127.0.0.1:1");
    if uzers::get_current_uid() == 0 {
        // Superuser-owned changes are always accepted.
        assert!(other.should_report(&file));
    } else {
        assert!(!other.should_report(&file));
    }
}

/// An accepted modification produces exactly one GET against the collector,
/// shaped `/save-event/{user}/{timestamp}`.
#[tokio::test]
async fn test_modification_reaches_collector() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 2048];
        let n = socket.read(&mut buf).await.unwrap();
        socket
            .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\n\r\n")
            .await
            .unwrap();
        String::from_utf8_lossy(&buf[..n]).into_owned()
    });

    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("a.go");
    fs::write(&file, "package main").unwrap();

    let user = current_user();
    let reporter = ModificationReporter::new(&user, addr.to_string());
    reporter.report(&file).await;

    let request = server.await.unwrap();
    let request_line = request.lines().next().unwrap_or_default();
    assert!(
        request_line.starts_with(&format!("GET /save-event/{user}/")),
        "unexpected request line: {request_line}"
    );
}

/// A discarded modification produces no outbound call at all.
#[tokio::test]
async fn test_foreign_modification_produces_no_call() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let tmp = TempDir::new().unwrap();
    let swap = tmp.path().join(".a.go.swp");
    fs::write(&swap, "swap").unwrap();

    // Transient names are discarded before the ownership check, so this
    // holds for root and regular users alike.
    let reporter = ModificationReporter::new(current_user(), addr.to_string());
    reporter.report(&swap).await;

    let accepted = tokio::time::timeout(Duration::from_millis(200), listener.accept()).await;
    assert!(accepted.is_err(), "collector should not have been called");
}
