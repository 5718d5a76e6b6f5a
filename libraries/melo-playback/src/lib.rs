//! Melo - Playback Engine
//!
//! Platform-agnostic playback engine for Melo.
//!
//! This crate provides:
//! - Transport control (play, pause, resume, seek, fast-forward, rewind)
//! - Queue navigation with wrap-around next/previous
//! - Shuffle selection that never repeats the current track
//! - Repeat modes (Off, All, One) applied at the natural end of a track
//! - A periodic position sampler per open resource
//! - Observable snapshots and a broadcast event stream
//!
//! # Architecture
//!
//! Sound output is reached only through the [`AudioBackend`] and
//! [`AudioResource`] traits; the engine holds at most one open resource and
//! always releases it before opening the next. [`SimulatedBackend`] is a
//! clock-driven implementation for headless hosts and tests.
//!
//! # Example
//!
//! ```rust
//! use melo_core::Track;
//! use melo_playback::{PlaybackConfig, PlaybackEngine, SimulatedBackend};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> melo_playback::Result<()> {
//! let tracks = vec![
//!     Track::new("1", "mem://one", "one.mp3").with_duration(Duration::from_secs(180)),
//!     Track::new("2", "mem://two", "two.mp3").with_duration(Duration::from_secs(200)),
//! ];
//! let backend = Arc::new(SimulatedBackend::from_tracks(&tracks));
//! let engine = PlaybackEngine::new(backend, PlaybackConfig::default());
//!
//! engine.play(tracks[0].clone(), Some(tracks.clone())).await?;
//! engine.skip_to_next().await?;
//! assert_eq!(engine.snapshot().current_index, Some(1));
//!
//! engine.shutdown().await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod backend;
pub mod completion;
pub mod engine;
pub mod error;
pub mod events;
pub mod queue;
pub mod shuffle;
pub mod simulated;
pub mod types;

mod sampler;
mod transport;

pub use backend::{
    AudioBackend, AudioResource, BackendError, CompletionSignal, CompletionTrigger, ResourceStatus,
};
pub use completion::CompletionAction;
pub use engine::PlaybackEngine;
pub use error::{PlaybackError, Result};
pub use events::PlaybackEvent;
pub use queue::Queue;
pub use simulated::SimulatedBackend;
pub use types::{format_clock, PlaybackConfig, PlaybackSnapshot, PlayerStatus, RepeatMode};
