//! End-of-track policy
//!
//! Decides what follows a natural track end. Kept free of engine state so
//! the policy can be tested on its own.

use crate::types::RepeatMode;
use std::time::Duration;

/// Follow-up to a finished track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionAction {
    /// Seek to the start and keep playing the same track
    Restart,

    /// Play the next queue entry
    Advance,

    /// Pause and rewind to the start
    Stop,
}

/// Resolve the follow-up for a finished track
///
/// # Arguments
/// * `repeat` - Current repeat mode
/// * `current_index` - Queue index of the finished track, if it is queued
/// * `queue_len` - Number of queued tracks
pub fn completion_action(
    repeat: RepeatMode,
    current_index: Option<usize>,
    queue_len: usize,
) -> CompletionAction {
    match repeat {
        RepeatMode::One => CompletionAction::Restart,
        RepeatMode::All if queue_len > 0 => CompletionAction::Advance,
        RepeatMode::All => CompletionAction::Stop,
        RepeatMode::Off => {
            let has_next = match current_index {
                Some(i) => i + 1 < queue_len,
                // Track is not queued: the head of the queue comes next
                None => queue_len > 0,
            };
            if has_next {
                CompletionAction::Advance
            } else {
                CompletionAction::Stop
            }
        }
    }
}

/// Whether `position` is within `tolerance` of a known, non-zero `duration`
pub fn near_end(position: Duration, duration: Duration, tolerance: Duration) -> bool {
    !duration.is_zero() && position.saturating_add(tolerance) >= duration
}
