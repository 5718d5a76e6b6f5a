//! Melo Core
//!
//! Platform-agnostic domain types, the track source collaborator and error
//! handling shared by the playlist store, the playback engine and the hosts.
//!
//! # Example
//!
//! ```rust
//! use melo_core::{Playlist, Track};
//! use std::time::Duration;
//!
//! let track = Track::new("42", "file:///music/intro.mp3", "intro.mp3")
//!     .with_duration(Duration::from_secs(95));
//! assert_eq!(track.display_title(), "intro");
//!
//! let mut playlist = Playlist::new("Morning");
//! playlist.tracks.push(track);
//! assert_eq!(playlist.track_count(), 1);
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod source;
pub mod types;

pub use error::{CoreError, Result};
pub use source::{ManifestTrackSource, StaticTrackSource, TrackSource};
pub use types::{Playlist, PlaylistId, Track, TrackId};
