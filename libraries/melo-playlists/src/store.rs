//! Playlist store
//!
//! Owns every playlist. The playback engine never borrows from here; it
//! receives an owned snapshot via [`PlaylistStore::tracks`].

use crate::error::{PlaylistError, Result};
use melo_core::{Playlist, PlaylistId, Track, TrackId};
use tracing::debug;

/// Longest accepted playlist name, in characters
pub const MAX_PLAYLIST_NAME_LEN: usize = 50;

/// In-memory playlist collection, in creation order
#[derive(Debug, Clone, Default)]
pub struct PlaylistStore {
    playlists: Vec<Playlist>,
}

impl PlaylistStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a playlist and return its id
    ///
    /// The name is trimmed; it must be non-empty and at most
    /// [`MAX_PLAYLIST_NAME_LEN`] characters.
    pub fn create_playlist(&mut self, name: &str) -> Result<PlaylistId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PlaylistError::InvalidName("name is empty".to_string()));
        }
        if name.chars().count() > MAX_PLAYLIST_NAME_LEN {
            return Err(PlaylistError::InvalidName(format!(
                "name is longer than {} characters",
                MAX_PLAYLIST_NAME_LEN
            )));
        }

        let playlist = Playlist::new(name);
        let id = playlist.id.clone();
        debug!(playlist = %id, name, "Created playlist");
        self.playlists.push(playlist);
        Ok(id)
    }

    /// Append a track (no duplicate check)
    pub fn add_track_to_playlist(&mut self, playlist_id: &PlaylistId, track: Track) -> Result<()> {
        let playlist = self.get_mut(playlist_id)?;
        debug!(playlist = %playlist_id, track = %track.id, "Added track to playlist");
        playlist.tracks.push(track);
        Ok(())
    }

    /// Remove every entry of a track; returns how many were removed
    pub fn remove_track_from_playlist(
        &mut self,
        playlist_id: &PlaylistId,
        track_id: &TrackId,
    ) -> Result<usize> {
        let playlist = self.get_mut(playlist_id)?;
        let before = playlist.tracks.len();
        playlist.tracks.retain(|track| &track.id != track_id);
        let removed = before - playlist.tracks.len();

        if removed == 0 {
            return Err(PlaylistError::TrackNotFound {
                playlist: playlist_id.clone(),
                track: track_id.clone(),
            });
        }

        debug!(playlist = %playlist_id, track = %track_id, removed, "Removed track from playlist");
        Ok(removed)
    }

    /// Delete a playlist, returning it
    pub fn delete_playlist(&mut self, playlist_id: &PlaylistId) -> Result<Playlist> {
        let index = self
            .playlists
            .iter()
            .position(|p| &p.id == playlist_id)
            .ok_or_else(|| PlaylistError::PlaylistNotFound(playlist_id.clone()))?;

        debug!(playlist = %playlist_id, "Deleted playlist");
        Ok(self.playlists.remove(index))
    }

    /// All playlists, in creation order
    pub fn playlists(&self) -> &[Playlist] {
        &self.playlists
    }

    /// Look up a playlist
    pub fn get(&self, playlist_id: &PlaylistId) -> Option<&Playlist> {
        self.playlists.iter().find(|p| &p.id == playlist_id)
    }

    /// Owned copy of a playlist's tracks, for seeding the playback queue
    pub fn tracks(&self, playlist_id: &PlaylistId) -> Result<Vec<Track>> {
        self.get(playlist_id)
            .map(|p| p.tracks.clone())
            .ok_or_else(|| PlaylistError::PlaylistNotFound(playlist_id.clone()))
    }

    /// Number of playlists
    pub fn len(&self) -> usize {
        self.playlists.len()
    }

    /// Check if there are no playlists
    pub fn is_empty(&self) -> bool {
        self.playlists.is_empty()
    }

    fn get_mut(&mut self, playlist_id: &PlaylistId) -> Result<&mut Playlist> {
        self.playlists
            .iter_mut()
            .find(|p| &p.id == playlist_id)
            .ok_or_else(|| PlaylistError::PlaylistNotFound(playlist_id.clone()))
    }
}
