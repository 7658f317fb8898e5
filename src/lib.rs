//! Vigil - filesystem activity tracking daemon.
//!
//! Watches directory trees for changes, keeps the set of active watches in
//! step with directories appearing and disappearing, and reports file
//! modifications by a tracked user to an external HTTP collector, all while
//! running as a supervised, singleton, self-restarting background process.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod reporter;
pub mod supervisor;
pub mod watcher;

pub use config::Config;
pub use error::{Error, Result};
