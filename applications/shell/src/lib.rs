//! Melo Shell Library
//!
//! Headless host for the playback engine: loads configuration and the
//! track library, and turns text commands into engine and playlist
//! operations.
//!
//! This library exposes the core components for testing purposes.

pub mod commands;
pub mod config;
pub mod demo;
pub mod error;
pub mod session;

// Re-export commonly used types for convenience
pub use commands::Command;
pub use config::ShellConfig;
pub use error::{Result, ShellError};
pub use session::{Outcome, Session};
