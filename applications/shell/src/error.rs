/// Shell error types
use melo_core::CoreError;
use melo_playback::PlaybackError;
use melo_playlists::PlaylistError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ShellError>;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Parse(String),

    #[error("No {kind} numbered {position}")]
    OutOfRange { kind: &'static str, position: usize },

    #[error("Playlist '{0}' is empty")]
    EmptyPlaylist(String),

    #[error("Library error: {0}")]
    Library(#[from] CoreError),

    #[error("Playlist error: {0}")]
    Playlist(#[from] PlaylistError),

    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ShellError {
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}
