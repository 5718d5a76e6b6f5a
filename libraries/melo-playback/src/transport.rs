//! Transport state machine
//!
//! `Idle` holds nothing; both loaded states own the resource, so a current
//! track without a backing resource cannot be represented.

use crate::backend::AudioResource;
use crate::types::PlayerStatus;
use melo_core::Track;
use std::mem;
use tokio::task::JoinHandle;

/// Everything tied to one open resource
pub(crate) struct Loaded {
    pub track: Track,
    pub resource: Box<dyn AudioResource>,
    pub generation: u64,
    pub sampler: JoinHandle<()>,
}

#[derive(Default)]
pub(crate) enum Transport {
    #[default]
    Idle,
    Paused(Loaded),
    Playing(Loaded),
}

impl Transport {
    pub fn status(&self) -> PlayerStatus {
        match self {
            Self::Idle => PlayerStatus::Idle,
            Self::Paused(_) => PlayerStatus::Paused,
            Self::Playing(_) => PlayerStatus::Playing,
        }
    }

    pub fn loaded(&self) -> Option<&Loaded> {
        match self {
            Self::Idle => None,
            Self::Paused(loaded) | Self::Playing(loaded) => Some(loaded),
        }
    }

    pub fn loaded_mut(&mut self) -> Option<&mut Loaded> {
        match self {
            Self::Idle => None,
            Self::Paused(loaded) | Self::Playing(loaded) => Some(loaded),
        }
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.loaded().map(|l| &l.track)
    }

    pub fn generation(&self) -> Option<u64> {
        self.loaded().map(|l| l.generation)
    }

    /// Leave `Idle` in place and hand out the loaded parts
    pub fn take_loaded(&mut self) -> Option<Loaded> {
        match mem::take(self) {
            Self::Idle => None,
            Self::Paused(loaded) | Self::Playing(loaded) => Some(loaded),
        }
    }

    /// `Playing -> Paused`, other states unchanged
    pub fn pause(&mut self) {
        *self = match mem::take(self) {
            Self::Playing(loaded) => Self::Paused(loaded),
            other => other,
        };
    }

    /// `Paused -> Playing`, other states unchanged
    pub fn play(&mut self) {
        *self = match mem::take(self) {
            Self::Paused(loaded) => Self::Playing(loaded),
            other => other,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendError, ResourceStatus};
    use async_trait::async_trait;
    use std::time::Duration;

    struct NullResource;

    #[async_trait]
    impl AudioResource for NullResource {
        async fn play(&mut self) -> Result<(), BackendError> {
            Ok(())
        }
        async fn pause(&mut self) -> Result<(), BackendError> {
            Ok(())
        }
        async fn seek(&mut self, _position: Duration) -> Result<(), BackendError> {
            Ok(())
        }
        async fn status(&mut self) -> Result<ResourceStatus, BackendError> {
            Ok(ResourceStatus::default())
        }
        async fn unload(&mut self) -> Result<(), BackendError> {
            Ok(())
        }
    }

    fn loaded(generation: u64) -> Loaded {
        Loaded {
            track: Track::new("t", "mem://t", "t.mp3"),
            resource: Box::new(NullResource),
            generation,
            sampler: tokio::spawn(async {}),
        }
    }

    #[tokio::test]
    async fn idle_has_no_track() {
        let mut transport = Transport::default();
        assert_eq!(transport.status(), PlayerStatus::Idle);
        assert!(transport.current_track().is_none());
        assert!(transport.take_loaded().is_none());

        transport.play();
        transport.pause();
        assert_eq!(transport.status(), PlayerStatus::Idle);
    }

    #[tokio::test]
    async fn pause_and_play_keep_the_resource() {
        let mut transport = Transport::Playing(loaded(3));

        transport.pause();
        assert_eq!(transport.status(), PlayerStatus::Paused);
        assert_eq!(transport.generation(), Some(3));

        transport.pause();
        assert_eq!(transport.status(), PlayerStatus::Paused);

        transport.play();
        assert_eq!(transport.status(), PlayerStatus::Playing);
        assert_eq!(transport.current_track().unwrap().id.as_str(), "t");
    }

    #[tokio::test]
    async fn take_loaded_returns_to_idle() {
        let mut transport = Transport::Paused(loaded(1));

        let taken = transport.take_loaded().unwrap();
        assert_eq!(taken.generation, 1);
        assert_eq!(transport.status(), PlayerStatus::Idle);
    }
}
