//! Platform-agnostic audio backend traits
//!
//! Abstracts the one gateway to sound output so the engine works with any
//! platform player (native mobile bridges, desktop output, or the
//! [`SimulatedBackend`](crate::SimulatedBackend) for headless hosts).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors reported by an audio backend
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// Uri could not be resolved or reached
    #[error("uri unreachable: {0}")]
    Unreachable(String),

    /// Content could not be decoded
    #[error("decode failed: {0}")]
    Decode(String),

    /// Resource is no longer loaded
    #[error("resource not loaded")]
    NotLoaded,

    /// Anything else the platform reports
    #[error("{0}")]
    Other(String),
}

/// Status reported by an open resource
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceStatus {
    /// Resource is loaded and ready
    pub loaded: bool,

    /// Elapsed time
    pub position: Duration,

    /// Total time, once known
    pub duration: Option<Duration>,

    /// Playback reached the natural end
    pub finished: bool,
}

/// Opens playable resources
#[async_trait]
pub trait AudioBackend: Send + Sync {
    /// Open `uri` for playback
    ///
    /// # Arguments
    /// * `uri` - Opaque locator from the track source
    /// * `autoplay` - Start output as soon as the resource is ready
    /// * `completion` - Fire `notify_finished` when playback ends naturally
    async fn open(
        &self,
        uri: &str,
        autoplay: bool,
        completion: CompletionSignal,
    ) -> Result<Box<dyn AudioResource>, BackendError>;
}

/// One open audio resource
///
/// The engine keeps at most one alive and always calls `unload` before
/// dropping it.
#[async_trait]
pub trait AudioResource: Send + Sync {
    /// Start or resume output
    async fn play(&mut self) -> Result<(), BackendError>;

    /// Pause output, keeping the position
    async fn pause(&mut self) -> Result<(), BackendError>;

    /// Move to an absolute position
    async fn seek(&mut self, position: Duration) -> Result<(), BackendError>;

    /// Query elapsed/total time and flags
    async fn status(&mut self) -> Result<ResourceStatus, BackendError>;

    /// Release the resource
    async fn unload(&mut self) -> Result<(), BackendError>;
}

/// What detected the end of a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionTrigger {
    /// Periodic position sampler
    Sampler,

    /// Backend reported natural completion
    Native,

    /// Seek landed at the end
    Seek,
}

/// End-of-track notice, tagged with the resource generation it belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CompletionNotice {
    pub generation: u64,
    pub trigger: CompletionTrigger,
}

/// Handle a backend uses to report natural completion
///
/// Late or repeated notifications are harmless: the engine discards
/// notices for resources it has already replaced or handled.
#[derive(Debug, Clone)]
pub struct CompletionSignal {
    generation: u64,
    tx: mpsc::UnboundedSender<CompletionNotice>,
}

impl CompletionSignal {
    pub(crate) fn new(generation: u64, tx: mpsc::UnboundedSender<CompletionNotice>) -> Self {
        Self { generation, tx }
    }

    /// Signal that is not connected to any engine
    ///
    /// Useful when driving a backend directly.
    pub fn detached() -> Self {
        let (tx, _rx) = mpsc::unbounded_channel();
        Self { generation: 0, tx }
    }

    /// Report that playback reached its natural end
    pub fn notify_finished(&self) {
        self.send(CompletionTrigger::Native);
    }

    pub(crate) fn send(&self, trigger: CompletionTrigger) {
        // Receiver is gone once the engine shut down
        let _ = self.tx.send(CompletionNotice {
            generation: self.generation,
            trigger,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_carries_generation() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let signal = CompletionSignal::new(7, tx);

        signal.notify_finished();

        assert_eq!(
            rx.try_recv().unwrap(),
            CompletionNotice {
                generation: 7,
                trigger: CompletionTrigger::Native
            }
        );
    }

    #[test]
    fn detached_signal_does_not_panic() {
        CompletionSignal::detached().notify_finished();
    }
}
