/// Track domain type
use crate::types::TrackId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Playable audio item supplied by a track source
///
/// Immutable once enumerated. Playlists and the playback queue hold clones
/// of the value; nothing mutates a track after the source produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Track {
    /// Unique track identifier within one source enumeration
    pub id: TrackId,

    /// Opaque locator resolved by the audio backend
    pub uri: String,

    /// File name, including extension
    pub filename: String,

    /// Track duration in milliseconds, if the source knows it
    #[serde(default)]
    pub duration_ms: Option<u64>,
}

impl Track {
    /// Create a new track with unknown duration
    pub fn new(id: impl Into<TrackId>, uri: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            uri: uri.into(),
            filename: filename.into(),
            duration_ms: None,
        }
    }

    /// Set the known duration
    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_ms = Some(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Get the track duration as a Duration
    pub fn duration(&self) -> Option<Duration> {
        self.duration_ms.map(Duration::from_millis)
    }

    /// Title for display: the file name with its last extension stripped
    pub fn display_title(&self) -> &str {
        match self.filename.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() && !ext.contains('/') => stem,
            _ => &self.filename,
        }
    }
}
