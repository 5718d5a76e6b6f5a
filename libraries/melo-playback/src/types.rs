//! Core types for playback management

use melo_core::Track;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Repeat mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Stop when the queue ends
    #[default]
    Off,

    /// Loop the entire queue
    All,

    /// Loop the current track only
    One,
}

impl RepeatMode {
    /// Next mode in the `off -> all -> one -> off` cycle
    #[must_use]
    pub fn cycle(self) -> Self {
        match self {
            Self::Off => Self::All,
            Self::All => Self::One,
            Self::One => Self::Off,
        }
    }

    /// Convert to string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::All => "all",
            Self::One => "one",
        }
    }

    /// Parse from string
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "off" => Some(Self::Off),
            "all" => Some(Self::All),
            "one" => Some(Self::One),
            _ => None,
        }
    }
}

impl std::fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Observable transport status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerStatus {
    /// No track loaded
    #[default]
    Idle,

    /// Track loaded, output paused
    Paused,

    /// Track loaded and playing
    Playing,
}

/// Configuration for the playback engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Position sampler period (default: 1000)
    pub sample_interval_ms: u64,

    /// Distance from the end treated as "finished" (default: 200)
    pub completion_tolerance_ms: u64,

    /// Past this position "previous" restarts the track (default: 3000)
    pub restart_threshold_ms: u64,

    /// Fast-forward / rewind step (default: 10000)
    pub skip_step_ms: u64,

    /// Initial shuffle mode (default: false)
    pub shuffle: bool,

    /// Initial repeat mode (default: Off)
    pub repeat: RepeatMode,

    /// Fixed seed for shuffle selection, for reproducible runs
    pub shuffle_seed: Option<u64>,

    /// Capacity of the event broadcast channel (default: 64)
    pub event_capacity: usize,
}

impl PlaybackConfig {
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }

    pub fn completion_tolerance(&self) -> Duration {
        Duration::from_millis(self.completion_tolerance_ms)
    }

    pub fn restart_threshold(&self) -> Duration {
        Duration::from_millis(self.restart_threshold_ms)
    }

    pub fn skip_step(&self) -> Duration {
        Duration::from_millis(self.skip_step_ms)
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: 1000,
            completion_tolerance_ms: 200,
            restart_threshold_ms: 3000,
            skip_step_ms: 10_000,
            shuffle: false,
            repeat: RepeatMode::Off,
            shuffle_seed: None,
            event_capacity: 64,
        }
    }
}

/// Point-in-time view of the engine, published after every change
#[derive(Debug, Clone)]
pub struct PlaybackSnapshot {
    /// Transport status
    pub status: PlayerStatus,

    /// Track owning the open resource
    pub current_track: Option<Track>,

    /// Index of the current track in the queue, if present
    pub current_index: Option<usize>,

    /// Playback position
    pub position: Duration,

    /// Track duration (zero while unknown)
    pub duration: Duration,

    /// Shuffle mode
    pub shuffle: bool,

    /// Repeat mode
    pub repeat: RepeatMode,

    /// Queue contents
    pub queue: Arc<[Track]>,
}

impl Default for PlaybackSnapshot {
    fn default() -> Self {
        Self {
            status: PlayerStatus::Idle,
            current_track: None,
            current_index: None,
            position: Duration::ZERO,
            duration: Duration::ZERO,
            shuffle: false,
            repeat: RepeatMode::Off,
            queue: Arc::from(Vec::new()),
        }
    }
}

impl PlaybackSnapshot {
    pub fn is_playing(&self) -> bool {
        self.status == PlayerStatus::Playing
    }

    /// Position as a fraction of the duration (0.0 - 1.0)
    pub fn progress(&self) -> f32 {
        if self.duration.is_zero() {
            0.0
        } else {
            (self.position.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
        }
    }
}

/// Format a duration as M:SS
pub fn format_clock(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}
