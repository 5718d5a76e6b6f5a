//! Clock-driven audio backend
//!
//! Produces no sound. Position advances on the tokio clock while playing,
//! which makes it usable both for headless hosts and for tests running on
//! paused time.

use crate::backend::{AudioBackend, AudioResource, BackendError, CompletionSignal, ResourceStatus};
use async_trait::async_trait;
use melo_core::Track;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

/// Backend resolving a fixed catalog of uris
#[derive(Debug, Clone, Default)]
pub struct SimulatedBackend {
    catalog: Arc<HashMap<String, Option<Duration>>>,
}

impl SimulatedBackend {
    /// Create a backend that knows no uris
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `uri` with a known duration
    #[must_use]
    pub fn with_track(mut self, uri: impl Into<String>, duration: Duration) -> Self {
        Arc::make_mut(&mut self.catalog).insert(uri.into(), Some(duration));
        self
    }

    /// Register every track's uri; tracks without a duration play forever
    pub fn from_tracks(tracks: &[Track]) -> Self {
        let catalog = tracks
            .iter()
            .map(|t| (t.uri.clone(), t.duration()))
            .collect();
        Self {
            catalog: Arc::new(catalog),
        }
    }

    pub fn knows(&self, uri: &str) -> bool {
        self.catalog.contains_key(uri)
    }
}

#[async_trait]
impl AudioBackend for SimulatedBackend {
    async fn open(
        &self,
        uri: &str,
        autoplay: bool,
        completion: CompletionSignal,
    ) -> Result<Box<dyn AudioResource>, BackendError> {
        let duration = *self
            .catalog
            .get(uri)
            .ok_or_else(|| BackendError::Unreachable(uri.to_string()))?;

        debug!(uri, ?duration, autoplay, "Opening simulated resource");

        let mut resource = SimulatedResource {
            duration,
            offset: Duration::ZERO,
            started_at: None,
            loaded: true,
            completion,
            timer: None,
        };
        if autoplay {
            resource.play().await?;
        }
        Ok(Box::new(resource))
    }
}

struct SimulatedResource {
    duration: Option<Duration>,
    /// Position at the last pause or seek
    offset: Duration,
    /// Set while playing
    started_at: Option<Instant>,
    loaded: bool,
    completion: CompletionSignal,
    timer: Option<JoinHandle<()>>,
}

impl SimulatedResource {
    fn position(&self) -> Duration {
        let elapsed = self.started_at.map(|t| t.elapsed()).unwrap_or_default();
        let position = self.offset + elapsed;
        match self.duration {
            Some(duration) => position.min(duration),
            None => position,
        }
    }

    fn ensure_loaded(&self) -> Result<(), BackendError> {
        if self.loaded {
            Ok(())
        } else {
            Err(BackendError::NotLoaded)
        }
    }

    /// Schedule the completion signal for the end of the track
    fn arm_timer(&mut self) {
        self.disarm_timer();
        let Some(duration) = self.duration else {
            return;
        };
        let remaining = duration.saturating_sub(self.offset);
        let signal = self.completion.clone();
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(remaining).await;
            signal.notify_finished();
        }));
    }

    fn disarm_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

#[async_trait]
impl AudioResource for SimulatedResource {
    async fn play(&mut self) -> Result<(), BackendError> {
        self.ensure_loaded()?;
        if self.started_at.is_none() {
            self.started_at = Some(Instant::now());
            self.arm_timer();
        }
        Ok(())
    }

    async fn pause(&mut self) -> Result<(), BackendError> {
        self.ensure_loaded()?;
        self.offset = self.position();
        self.started_at = None;
        self.disarm_timer();
        Ok(())
    }

    async fn seek(&mut self, position: Duration) -> Result<(), BackendError> {
        self.ensure_loaded()?;
        self.offset = match self.duration {
            Some(duration) => position.min(duration),
            None => position,
        };
        if self.started_at.is_some() {
            self.started_at = Some(Instant::now());
            self.arm_timer();
        }
        Ok(())
    }

    async fn status(&mut self) -> Result<ResourceStatus, BackendError> {
        self.ensure_loaded()?;
        let position = self.position();
        Ok(ResourceStatus {
            loaded: true,
            position,
            duration: self.duration,
            finished: self.duration.is_some_and(|d| position >= d),
        })
    }

    async fn unload(&mut self) -> Result<(), BackendError> {
        self.ensure_loaded()?;
        self.disarm_timer();
        self.started_at = None;
        self.loaded = false;
        Ok(())
    }
}

impl Drop for SimulatedResource {
    fn drop(&mut self) {
        self.disarm_timer();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> SimulatedBackend {
        SimulatedBackend::new().with_track("mem://a", Duration::from_secs(5))
    }

    #[tokio::test]
    async fn unknown_uri_is_unreachable() {
        let result = backend()
            .open("mem://missing", true, CompletionSignal::detached())
            .await;
        assert!(matches!(result, Err(BackendError::Unreachable(uri)) if uri == "mem://missing"));
    }

    #[tokio::test(start_paused = true)]
    async fn position_follows_the_clock() {
        let mut resource = backend()
            .open("mem://a", true, CompletionSignal::detached())
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(1500)).await;
        let status = resource.status().await.unwrap();
        assert!(status.loaded);
        assert_eq!(status.position, Duration::from_millis(1500));
        assert_eq!(status.duration, Some(Duration::from_secs(5)));
        assert!(!status.finished);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_freezes_position() {
        let mut resource = backend()
            .open("mem://a", true, CompletionSignal::detached())
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_secs(1)).await;
        resource.pause().await.unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(resource.status().await.unwrap().position, Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn without_autoplay_nothing_moves() {
        let mut resource = backend()
            .open("mem://a", false, CompletionSignal::detached())
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(resource.status().await.unwrap().position, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn reports_finished_at_the_end() {
        let mut resource = backend()
            .open("mem://a", false, CompletionSignal::detached())
            .await
            .unwrap();

        resource.seek(Duration::from_secs(60)).await.unwrap();
        let status = resource.status().await.unwrap();
        assert_eq!(status.position, Duration::from_secs(5));
        assert!(status.finished);
    }

    #[tokio::test(start_paused = true)]
    async fn fires_completion_at_the_end() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let _resource = backend()
            .open("mem://a", true, CompletionSignal::new(4, tx))
            .await
            .unwrap();

        let notice = rx.recv().await.unwrap();
        assert_eq!(notice.generation, 4);
        assert_eq!(notice.trigger, crate::backend::CompletionTrigger::Native);
    }

    #[tokio::test(start_paused = true)]
    async fn paused_resource_never_completes() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let mut resource = backend()
            .open("mem://a", true, CompletionSignal::new(1, tx))
            .await
            .unwrap();

        resource.pause().await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn unload_releases_the_resource() {
        let mut resource = backend()
            .open("mem://a", true, CompletionSignal::detached())
            .await
            .unwrap();

        resource.unload().await.unwrap();
        assert_eq!(resource.status().await, Err(BackendError::NotLoaded));
        assert_eq!(resource.play().await, Err(BackendError::NotLoaded));
    }

    #[test]
    fn from_tracks_registers_uris() {
        let tracks = vec![
            Track::new("1", "mem://one", "one.mp3").with_duration(Duration::from_secs(3)),
            Track::new("2", "mem://two", "two.mp3"),
        ];
        let backend = SimulatedBackend::from_tracks(&tracks);
        assert!(backend.knows("mem://one"));
        assert!(backend.knows("mem://two"));
        assert!(!backend.knows("mem://three"));
    }
}
