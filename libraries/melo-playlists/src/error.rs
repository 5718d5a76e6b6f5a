/// Playlist store errors
use melo_core::{PlaylistId, TrackId};
use thiserror::Error;

/// Result type alias using `PlaylistError`
pub type Result<T> = std::result::Result<T, PlaylistError>;

/// Playlist store error types
///
/// Every failing operation leaves the store unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaylistError {
    /// No playlist with this id
    #[error("Playlist not found: {0}")]
    PlaylistNotFound(PlaylistId),

    /// Playlist exists but holds no entry for this track
    #[error("Track {track} not found in playlist {playlist}")]
    TrackNotFound { playlist: PlaylistId, track: TrackId },

    /// Name is empty after trimming or too long
    #[error("Invalid playlist name: {0}")]
    InvalidName(String),
}
