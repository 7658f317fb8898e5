//! Process supervision: daemonization, singleton enforcement, respawn.
//!
//! This module provides:
//! - Detached background launch with stream redirection
//! - PID-marker singleton enforcement with a liveness probe
//! - Self-image tracking and respawn on executable update
//! - The supervised poll loop

mod daemon;
mod logging;
mod pidfile;
mod runtime;

pub use daemon::{spawn_detached, SelfImage, LAUNCH_GRACE};
pub use logging::{init_console, init_file};
pub use pidfile::{process_alive, PidFile};
pub use runtime::Daemon;
