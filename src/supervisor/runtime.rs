//! The supervised poll loop.
//!
//! Single logical thread of control: once per poll interval the loop drains
//! every available event, dispatches each in delivery order, then checks
//! whether its own executable changed on disk.

use crossbeam_channel::Receiver;
use tokio::time::MissedTickBehavior;

use super::daemon::{self, SelfImage};
use super::pidfile::PidFile;
use crate::config::Config;
use crate::reporter::ModificationReporter;
use crate::watcher::{register_tree, ChangeEvent, Dispatcher, WatchRegistry};
use crate::Result;

/// A running daemon instance: registry, reporter, pid marker, self image.
pub struct Daemon {
    config: Config,
    dispatcher: Dispatcher,
    events: Receiver<ChangeEvent>,
    pid_file: PidFile,
    image: SelfImage,
}

impl std::fmt::Debug for Daemon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Daemon")
            .field("pid_file", &self.pid_file)
            .finish_non_exhaustive()
    }
}

impl Daemon {
    /// Claim the pid marker, snapshot the executable, and register watches
    /// for every existing root.
    ///
    /// # Errors
    ///
    /// Returns an error if another instance is alive, the marker cannot be
    /// written, or the notification source cannot be created. Individual
    /// unwatchable directories are logged and skipped, not fatal.
    pub fn start(config: Config) -> Result<Self> {
        let pid_file = PidFile::acquire(&config.pid_file)?;
        let image = SelfImage::capture()?;

        let (registry, events) = WatchRegistry::new()?;
        let reporter = ModificationReporter::new(&config.tracked_user, &config.collector);
        let mut dispatcher = Dispatcher::new(registry, reporter);

        let mut registered = 0;
        for root in config.existing_roots() {
            registered += register_tree(dispatcher.registry_mut(), &root);
        }
        tracing::info!(
            pid = pid_file.pid(),
            watches = registered,
            user = %config.tracked_user,
            "daemon running"
        );

        Ok(Self {
            config,
            dispatcher,
            events,
            pid_file,
            image,
        })
    }

    /// Run until a termination signal or a self-update.
    ///
    /// # Errors
    ///
    /// Returns an error only when the respawn launch itself fails; steady
    /// state errors are logged and absorbed inside the handlers.
    pub async fn run(mut self) -> Result<()> {
        let mut ticker = tokio::time::interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.drain().await;
                    if self.image.changed() {
                        return self.respawn();
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("termination signal received, shutting down");
                    self.teardown();
                    return Ok(());
                }
            }
        }
    }

    /// Drain every currently available event, dispatching in delivery order.
    async fn drain(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.dispatcher.dispatch(event).await;
        }
    }

    /// Release every watch, then the pid marker.
    fn teardown(&mut self) {
        self.dispatcher.registry_mut().remove_all();
        self.pid_file.release();
    }

    /// Replace this instance with a freshly spawned one.
    ///
    /// All watches are released and the marker removed before the new
    /// process is launched, so it starts against a clean host.
    fn respawn(mut self) -> Result<()> {
        tracing::info!("executable changed on disk, respawning");
        self.teardown();

        let args = self.config.respawn_args();
        let pid = daemon::spawn_detached(
            &args,
            &self.config.stdout_log_path(),
            &self.config.stderr_log_path(),
        )?;
        tracing::info!(pid, "replacement instance launched");
        Ok(())
    }

    /// Read access to the registry, mainly for inspection in tests.
    #[must_use]
    pub fn registry(&self) -> &WatchRegistry {
        self.dispatcher.registry()
    }
}
