//! Track source collaborator
//!
//! Enumerates the playable items a host knows about. Discovery mechanics
//! (media permissions, storage scans) live behind this trait.

use crate::error::{CoreError, Result};
use crate::types::Track;
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::PathBuf;

/// Supplies a flat list of playable tracks
#[async_trait]
pub trait TrackSource: Send + Sync {
    /// Enumerate all playable tracks
    ///
    /// Track ids are unique within one call.
    async fn tracks(&self) -> Result<Vec<Track>>;
}

/// In-memory track source
#[derive(Debug, Clone, Default)]
pub struct StaticTrackSource {
    tracks: Vec<Track>,
}

impl StaticTrackSource {
    /// Create a source over a fixed list
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }
}

#[async_trait]
impl TrackSource for StaticTrackSource {
    async fn tracks(&self) -> Result<Vec<Track>> {
        ensure_unique_ids(&self.tracks)?;
        Ok(self.tracks.clone())
    }
}

/// Track source backed by a JSON manifest file
///
/// The file holds an array of track records:
///
/// ```json
/// [{ "id": "1", "uri": "file:///music/a.mp3", "filename": "a.mp3", "duration_ms": 5000 }]
/// ```
#[derive(Debug, Clone)]
pub struct ManifestTrackSource {
    path: PathBuf,
}

impl ManifestTrackSource {
    /// Create a source reading the given manifest
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TrackSource for ManifestTrackSource {
    async fn tracks(&self) -> Result<Vec<Track>> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        let tracks: Vec<Track> = serde_json::from_str(&raw)?;
        ensure_unique_ids(&tracks)?;
        Ok(tracks)
    }
}

fn ensure_unique_ids(tracks: &[Track]) -> Result<()> {
    let mut seen = HashSet::with_capacity(tracks.len());
    for track in tracks {
        if !seen.insert(&track.id) {
            return Err(CoreError::Duplicate(format!("track id {}", track.id)));
        }
    }
    Ok(())
}
