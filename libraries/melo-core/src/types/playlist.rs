/// Playlist domain type
use crate::types::{PlaylistId, Track};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Named, ordered collection of tracks
///
/// Duplicates are allowed; order is insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    /// Unique playlist identifier
    pub id: PlaylistId,

    /// Playlist name
    pub name: String,

    /// Tracks in play order
    pub tracks: Vec<Track>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Playlist {
    /// Create a new, empty playlist
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(PlaylistId::generate(), name)
    }

    /// Create a playlist with a specific ID
    pub fn with_id(id: PlaylistId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            tracks: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Number of entries, duplicates included
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }
}
