//! Playback Events
//!
//! Event-based notifications for UI synchronization during playback.
//! Events are broadcast at key points:
//! - Transport changes (play/pause/idle)
//! - Track changes (explicit play, skip, auto-advance)
//! - Natural track completion
//! - Position updates (every sampler tick)

use crate::backend::CompletionTrigger;
use crate::types::{PlayerStatus, RepeatMode};
use serde::{Deserialize, Serialize};

/// Events emitted by the playback engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// Transport status changed
    StateChanged {
        /// The new status
        status: PlayerStatus,
    },

    /// A new track was loaded
    TrackChanged {
        /// ID of the new (current) track
        track_id: String,
        /// ID of the previous track (if any)
        previous_track_id: Option<String>,
    },

    /// Track reached its natural end
    ///
    /// Emitted once per loaded resource, before the follow-up action
    /// (restart, advance or stop) runs.
    TrackFinished {
        /// ID of the finished track
        track_id: String,
        /// What detected the end
        trigger: CompletionTrigger,
    },

    /// Position update (every sampler tick while playing)
    PositionUpdate {
        /// Current playback position
        position_ms: u64,
        /// Total track duration, zero while unknown
        duration_ms: u64,
    },

    /// Queue was replaced
    QueueChanged {
        /// New queue length
        length: usize,
    },

    /// Shuffle or repeat mode changed
    ModesChanged {
        shuffle: bool,
        repeat: RepeatMode,
    },

    /// Error occurred during playback
    Error {
        /// Error message
        message: String,
    },
}

impl PlaybackEvent {
    /// Short tag for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StateChanged { .. } => "state_changed",
            Self::TrackChanged { .. } => "track_changed",
            Self::TrackFinished { .. } => "track_finished",
            Self::PositionUpdate { .. } => "position_update",
            Self::QueueChanged { .. } => "queue_changed",
            Self::ModesChanged { .. } => "modes_changed",
            Self::Error { .. } => "error",
        }
    }
}
