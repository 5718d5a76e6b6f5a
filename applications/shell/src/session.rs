//! Command execution against the library, the playlist store and the engine

use crate::commands::{Command, HELP};
use crate::error::{Result, ShellError};
use melo_core::{PlaylistId, Track};
use melo_playback::{format_clock, PlaybackEngine, PlaybackSnapshot, PlayerStatus};
use melo_playlists::PlaylistStore;
use std::fmt::Write as _;
use tracing::debug;

/// Result of one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Text to show, possibly empty
    Continue(String),
    Quit,
}

/// Everything the shell operates on
pub struct Session {
    library: Vec<Track>,
    store: PlaylistStore,
    engine: PlaybackEngine,
}

impl Session {
    pub fn new(library: Vec<Track>, engine: PlaybackEngine) -> Self {
        Self {
            library,
            store: PlaylistStore::new(),
            engine,
        }
    }

    pub fn library(&self) -> &[Track] {
        &self.library
    }

    pub fn store(&self) -> &PlaylistStore {
        &self.store
    }

    pub fn engine(&self) -> &PlaybackEngine {
        &self.engine
    }

    pub async fn execute(&mut self, command: Command) -> Result<Outcome> {
        debug!(?command, "Executing command");

        let output = match command {
            Command::List => self.render_library(),
            Command::Play(n) => {
                let track = self.library_track(n)?.clone();
                let title = track.display_title().to_string();
                self.engine.play(track, Some(self.library.clone())).await?;
                format!("Playing {title}")
            }
            Command::Pause => {
                self.engine.pause().await?;
                self.render_status()
            }
            Command::Resume => {
                self.engine.resume().await?;
                self.render_status()
            }
            Command::Toggle => {
                self.engine.toggle_play_pause().await?;
                self.render_status()
            }
            Command::Next => {
                self.engine.skip_to_next().await?;
                self.render_status()
            }
            Command::Prev => {
                self.engine.skip_to_previous().await?;
                self.render_status()
            }
            Command::Seek(position) => {
                self.engine.seek_to(position).await?;
                self.render_status()
            }
            Command::FastForward => {
                self.engine.fast_forward().await?;
                self.render_status()
            }
            Command::Rewind => {
                self.engine.rewind().await?;
                self.render_status()
            }
            Command::Shuffle => {
                let on = self.engine.toggle_shuffle().await?;
                format!("Shuffle {}", if on { "on" } else { "off" })
            }
            Command::Repeat => {
                let mode = self.engine.toggle_repeat().await?;
                format!("Repeat {mode}")
            }
            Command::Status => self.render_status(),
            Command::Queue => self.render_queue(),
            Command::Playlists => self.render_playlists(),
            Command::PlaylistNew(name) => {
                let id = self.store.create_playlist(&name)?;
                let name = self.store.get(&id).map(|p| p.name.clone()).unwrap_or(name);
                format!("Created playlist '{name}'")
            }
            Command::PlaylistAdd { playlist, track } => {
                let id = self.playlist_id(playlist)?;
                let track = self.library_track(track)?.clone();
                let title = track.display_title().to_string();
                self.store.add_track_to_playlist(&id, track)?;
                format!("Added {title}")
            }
            Command::PlaylistRemove { playlist, track } => {
                let id = self.playlist_id(playlist)?;
                let entry = self
                    .store
                    .get(&id)
                    .and_then(|p| track.checked_sub(1).and_then(|i| p.tracks.get(i)))
                    .cloned()
                    .ok_or(ShellError::OutOfRange {
                        kind: "playlist track",
                        position: track,
                    })?;
                let removed = self.store.remove_track_from_playlist(&id, &entry.id)?;
                format!("Removed {} ({removed} entries)", entry.display_title())
            }
            Command::PlaylistDelete(playlist) => {
                let id = self.playlist_id(playlist)?;
                let deleted = self.store.delete_playlist(&id)?;
                format!("Deleted playlist '{}'", deleted.name)
            }
            Command::PlaylistPlay(playlist) => {
                let id = self.playlist_id(playlist)?;
                let tracks = self.store.tracks(&id)?;
                let Some(first) = tracks.first().cloned() else {
                    let name = self.store.get(&id).map(|p| p.name.clone()).unwrap_or_default();
                    return Err(ShellError::EmptyPlaylist(name));
                };
                let title = first.display_title().to_string();
                self.engine.play(first, Some(tracks)).await?;
                format!("Playing {title}")
            }
            Command::Help => HELP.to_string(),
            Command::Quit => return Ok(Outcome::Quit),
        };

        Ok(Outcome::Continue(output))
    }

    fn library_track(&self, position: usize) -> Result<&Track> {
        position
            .checked_sub(1)
            .and_then(|i| self.library.get(i))
            .ok_or(ShellError::OutOfRange {
                kind: "track",
                position,
            })
    }

    fn playlist_id(&self, position: usize) -> Result<PlaylistId> {
        position
            .checked_sub(1)
            .and_then(|i| self.store.playlists().get(i))
            .map(|p| p.id.clone())
            .ok_or(ShellError::OutOfRange {
                kind: "playlist",
                position,
            })
    }

    fn render_library(&self) -> String {
        if self.library.is_empty() {
            return "Library is empty".to_string();
        }
        let current = self.engine.snapshot().current_track.map(|t| t.id);
        render_tracks(&self.library, |t| current.as_ref() == Some(&t.id))
    }

    fn render_queue(&self) -> String {
        let snapshot = self.engine.snapshot();
        if snapshot.queue.is_empty() {
            return "Queue is empty".to_string();
        }
        let mut index = 0;
        render_tracks(&snapshot.queue, |_| {
            let is_current = snapshot.current_index == Some(index);
            index += 1;
            is_current
        })
    }

    fn render_playlists(&self) -> String {
        if self.store.is_empty() {
            return "No playlists".to_string();
        }
        let mut out = String::new();
        for (i, playlist) in self.store.playlists().iter().enumerate() {
            let count = playlist.track_count();
            let noun = if count == 1 { "track" } else { "tracks" };
            let _ = writeln!(out, "{:>3}. {} ({count} {noun})", i + 1, playlist.name);
        }
        out.trim_end().to_string()
    }

    fn render_status(&self) -> String {
        render_snapshot(&self.engine.snapshot())
    }
}

fn render_tracks(tracks: &[Track], mut is_current: impl FnMut(&Track) -> bool) -> String {
    let mut out = String::new();
    for (i, track) in tracks.iter().enumerate() {
        let marker = if is_current(track) { '>' } else { ' ' };
        let length = track.duration().map(format_clock).unwrap_or_else(|| "-:--".to_string());
        let _ = writeln!(out, "{marker}{:>3}. {} ({length})", i + 1, track.display_title());
    }
    out.trim_end().to_string()
}

/// One-line summary of the engine state
pub fn render_snapshot(snapshot: &PlaybackSnapshot) -> String {
    let modes = format!(
        "shuffle {}, repeat {}",
        if snapshot.shuffle { "on" } else { "off" },
        snapshot.repeat
    );
    let Some(track) = &snapshot.current_track else {
        return format!("[idle] nothing loaded ({modes})");
    };
    let status = match snapshot.status {
        PlayerStatus::Playing => "playing",
        PlayerStatus::Paused => "paused",
        PlayerStatus::Idle => "idle",
    };
    format!(
        "[{status}] {} {} / {} ({modes})",
        track.display_title(),
        format_clock(snapshot.position),
        format_clock(snapshot.duration),
    )
}
