//! Configuration management for Vigil.
//!
//! Supports configuration from:
//! - Command-line arguments (highest priority)
//! - Environment variables
//! - Built-in defaults (lowest priority)

mod settings;

pub use settings::{Config, DEFAULT_COLLECTOR, DEFAULT_LOG_DIR, DEFAULT_PID_FILE};
