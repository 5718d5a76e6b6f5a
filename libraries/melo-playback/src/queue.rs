//! Playback queue
//!
//! The queue is replaced wholesale, never edited in place, so the current
//! position is derived by matching the current track's id rather than
//! stored as an index.

use crate::shuffle::pick_excluding;
use melo_core::{Track, TrackId};
use rand::Rng;
use std::sync::Arc;

/// Ordered working set of the playback engine
#[derive(Debug, Clone)]
pub struct Queue {
    tracks: Arc<[Track]>,
}

impl Queue {
    /// Create new empty queue
    pub fn new() -> Self {
        Self {
            tracks: Arc::from(Vec::new()),
        }
    }

    /// Create a queue over the given tracks
    pub fn from_tracks(tracks: Vec<Track>) -> Self {
        Self {
            tracks: Arc::from(tracks),
        }
    }

    /// Replace the whole queue
    pub fn replace(&mut self, tracks: Vec<Track>) {
        self.tracks = Arc::from(tracks);
    }

    /// Total number of tracks in queue
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Check if queue is empty
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Get track at index
    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// All tracks in order
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Shared handle to the tracks, for snapshots
    pub fn shared(&self) -> Arc<[Track]> {
        Arc::clone(&self.tracks)
    }

    /// Index of the first entry with this id
    pub fn position_of(&self, id: &TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| &t.id == id)
    }

    /// Resolve the index to play after `current`
    ///
    /// Sequential order wraps at the end regardless of repeat mode. When the
    /// current track is not in the queue the head of the queue is next.
    pub fn next_index<R: Rng + ?Sized>(
        &self,
        current: Option<usize>,
        shuffle: bool,
        rng: &mut R,
    ) -> Option<usize> {
        let len = self.len();
        if len == 0 {
            return None;
        }
        if shuffle {
            return pick_excluding(len, current, rng);
        }
        Some(match current {
            Some(i) => (i + 1) % len,
            None => 0,
        })
    }

    /// Resolve the index to play before `current`
    ///
    /// Mirrors [`Queue::next_index`]: wraps at the start, head of the queue
    /// when the current track is absent.
    pub fn previous_index<R: Rng + ?Sized>(
        &self,
        current: Option<usize>,
        shuffle: bool,
        rng: &mut R,
    ) -> Option<usize> {
        let len = self.len();
        if len == 0 {
            return None;
        }
        if shuffle {
            return pick_excluding(len, current, rng);
        }
        Some(match current {
            Some(i) => (i + len - 1) % len,
            None => 0,
        })
    }
}

impl Default for Queue {
    fn default() -> Self {
        Self::new()
    }
}
