//! Watch lifecycle: registry, event classification, dispatch, enumeration.
//!
//! This module provides:
//! - The watch registry mapping paths to active subscriptions
//! - Translation of raw notification-source events
//! - Live-stat event dispatch
//! - Initial directory enumeration with static ignore rules

mod dispatcher;
mod events;
mod filter;
mod registry;
mod scanner;

pub use dispatcher::Dispatcher;
pub use events::{from_notify, ChangeEvent, ChangeKind};
pub use filter::IgnoreRules;
pub use registry::{Watch, WatchRegistry};
pub use scanner::{discover_dirs, register_tree};
