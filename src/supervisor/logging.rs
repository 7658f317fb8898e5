//! Log sink initialization.
//!
//! Foreground runs log to the console; the daemonized process appends
//! `[YYYY-MM-DD HH:MM:SS]`-prefixed lines to the fixed log file. The log
//! directory is created on demand; if that fails the failure goes to the
//! console and the daemon degrades to console logging.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Registry};

const TIMESTAMP_FORMAT: &str = "[%Y-%m-%d %H:%M:%S]";

/// Initialize console logging for foreground runs.
///
/// # Panics
///
/// Panics if a subscriber has already been initialized in this process.
pub fn init_console(level: &str, json: bool) {
    init_with_writer(level, json, std::io::stdout);
}

/// Initialize file logging for the daemonized process.
///
/// # Panics
///
/// Panics if a subscriber has already been initialized in this process.
pub fn init_file(level: &str, json: bool, log_dir: &Path, log_path: &Path) {
    if let Err(e) = std::fs::create_dir_all(log_dir) {
        eprintln!(
            "vigil: cannot create log directory {}: {e}; logging to console",
            log_dir.display()
        );
        init_console(level, json);
        return;
    }

    match OpenOptions::new().create(true).append(true).open(log_path) {
        Ok(file) => init_with_writer(level, json, Mutex::new(file)),
        Err(e) => {
            eprintln!(
                "vigil: cannot open log file {}: {e}; logging to console",
                log_path.display()
            );
            init_console(level, json);
        }
    }
}

fn init_with_writer<W>(level: &str, json: bool, writer: W)
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let timer = ChronoLocal::new(TIMESTAMP_FORMAT.to_string());

    if json {
        let layer = fmt::layer()
            .json()
            .with_timer(timer)
            .with_ansi(false)
            .with_target(true)
            .with_writer(writer);
        Registry::default().with(env_filter).with(layer).init();
    } else {
        let layer = fmt::layer()
            .with_timer(timer)
            .with_ansi(false)
            .with_target(true)
            .with_writer(writer);
        Registry::default().with(env_filter).with(layer).init();
    }
}
