//! Melo Playlists
//!
//! In-memory CRUD over named, ordered collections of track references.
//! The store lives for the process lifetime; nothing is persisted.
//!
//! # Example
//!
//! ```rust
//! use melo_core::Track;
//! use melo_playlists::PlaylistStore;
//!
//! let mut store = PlaylistStore::new();
//! let id = store.create_playlist("Road trip").unwrap();
//! store
//!     .add_track_to_playlist(&id, Track::new("1", "file:///a.mp3", "a.mp3"))
//!     .unwrap();
//!
//! // Snapshot used to seed the playback queue
//! let queue = store.tracks(&id).unwrap();
//! assert_eq!(queue.len(), 1);
//! ```

#![forbid(unsafe_code)]

mod error;
mod store;

pub use error::{PlaylistError, Result};
pub use store::{PlaylistStore, MAX_PLAYLIST_NAME_LEN};
