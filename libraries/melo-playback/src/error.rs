//! Error types for playback management

use crate::backend::BackendError;
use thiserror::Error;

/// Playback errors
///
/// Every error leaves the engine in the last stable state it reached:
/// a failed open never leaves a current track without a resource.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Backend could not open or decode the uri
    #[error("Failed to open {uri}: {source}")]
    ResourceOpen {
        uri: String,
        #[source]
        source: BackendError,
    },

    /// Pause, resume or seek failed on the open resource
    #[error("Audio resource {operation} failed: {source}")]
    ResourceOp {
        operation: &'static str,
        #[source]
        source: BackendError,
    },

    /// Previous resource could not be released; engine is now idle
    #[error("Failed to release previous audio resource: {0}")]
    Teardown(#[source] BackendError),

    /// Next/previous requested on an empty queue
    #[error("Queue is empty")]
    EmptyQueue,

    /// Engine was shut down
    #[error("Playback engine is shut down")]
    ShutDown,
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
