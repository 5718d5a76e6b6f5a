//! Shared test helpers: a scriptable audio backend and snapshot waiters

#![allow(dead_code)]

use async_trait::async_trait;
use melo_core::Track;
use melo_playback::{
    AudioBackend, AudioResource, BackendError, CompletionSignal, PlaybackConfig, PlaybackEngine,
    PlaybackSnapshot, ResourceStatus,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

// ===== Tracks =====

pub fn track(id: &str, secs: u64) -> Track {
    Track::new(id, format!("mock://{id}"), format!("{id}.mp3")).with_duration(Duration::from_secs(secs))
}

pub fn tracks(ids: &[&str], secs: u64) -> Vec<Track> {
    ids.iter().map(|id| track(id, secs)).collect()
}

// ===== Mock backend =====

struct MockResourceState {
    uri: String,
    duration: Option<Duration>,
    position: Duration,
    playing: bool,
    finished: bool,
    loaded: bool,
    signal: CompletionSignal,
}

#[derive(Default)]
struct Inner {
    durations: HashMap<String, Duration>,
    failing_open: HashSet<String>,
    fail_unload: bool,
    fail_pause: bool,
    fail_seek: bool,
    calls: Vec<String>,
    resources: Vec<MockResourceState>,
    open_now: usize,
    max_open: usize,
}

/// Backend whose resources only move when the test moves them
///
/// Records every transport call (status queries excluded) and tracks how
/// many resources are open at once.
#[derive(Clone, Default)]
pub struct MockBackend {
    inner: Arc<Mutex<Inner>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend reporting each track's duration
    pub fn for_tracks(tracks: &[Track]) -> Self {
        let backend = Self::new();
        {
            let mut inner = backend.lock();
            for t in tracks {
                if let Some(d) = t.duration() {
                    inner.durations.insert(t.uri.clone(), d);
                }
            }
        }
        backend
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    /// Report `duration` for `uri` regardless of track metadata
    pub fn set_duration(&self, uri: &str, duration: Duration) {
        self.lock().durations.insert(uri.to_string(), duration);
    }

    pub fn fail_open(&self, uri: &str) {
        self.lock().failing_open.insert(uri.to_string());
    }

    pub fn fail_unload(&self, fail: bool) {
        self.lock().fail_unload = fail;
    }

    pub fn fail_pause(&self, fail: bool) {
        self.lock().fail_pause = fail;
    }

    pub fn fail_seek(&self, fail: bool) {
        self.lock().fail_seek = fail;
    }

    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Resources opened so far
    pub fn opened(&self) -> usize {
        self.lock().resources.len()
    }

    /// Resources open right now
    pub fn open_now(&self) -> usize {
        self.lock().open_now
    }

    /// Most resources ever open at the same time
    pub fn max_open(&self) -> usize {
        self.lock().max_open
    }

    pub fn current_uri(&self) -> Option<String> {
        self.lock().resources.last().map(|r| r.uri.clone())
    }

    pub fn is_playing(&self) -> bool {
        self.lock().resources.last().is_some_and(|r| r.playing)
    }

    pub fn position(&self) -> Duration {
        self.lock().resources.last().map(|r| r.position).unwrap_or_default()
    }

    /// Move the latest resource's playhead
    pub fn set_position(&self, position: Duration) {
        if let Some(r) = self.lock().resources.last_mut() {
            r.position = position;
        }
    }

    /// Latest resource's completion signal
    pub fn signal(&self) -> Option<CompletionSignal> {
        self.lock().resources.last().map(|r| r.signal.clone())
    }

    /// Play the latest resource to its end and fire the native callback
    pub fn finish_current(&self) {
        let signal = {
            let mut inner = self.lock();
            let Some(r) = inner.resources.last_mut() else {
                return;
            };
            if let Some(d) = r.duration {
                r.position = d;
            }
            r.finished = true;
            r.signal.clone()
        };
        signal.notify_finished();
    }
}

#[async_trait]
impl AudioBackend for MockBackend {
    async fn open(
        &self,
        uri: &str,
        autoplay: bool,
        completion: CompletionSignal,
    ) -> Result<Box<dyn AudioResource>, BackendError> {
        let mut inner = self.lock();
        inner.calls.push(format!("open {uri}"));
        if inner.failing_open.contains(uri) {
            return Err(BackendError::Decode(uri.to_string()));
        }

        let duration = inner.durations.get(uri).copied();
        inner.resources.push(MockResourceState {
            uri: uri.to_string(),
            duration,
            position: Duration::ZERO,
            playing: autoplay,
            finished: false,
            loaded: true,
            signal: completion,
        });
        inner.open_now += 1;
        inner.max_open = inner.max_open.max(inner.open_now);

        Ok(Box::new(MockResource {
            index: inner.resources.len() - 1,
            inner: Arc::clone(&self.inner),
        }))
    }
}

struct MockResource {
    index: usize,
    inner: Arc<Mutex<Inner>>,
}

impl MockResource {
    fn with<T>(
        &self,
        call: Option<String>,
        f: impl FnOnce(&mut Inner, usize) -> Result<T, BackendError>,
    ) -> Result<T, BackendError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(call) = call {
            inner.calls.push(call);
        }
        if !inner.resources[self.index].loaded {
            return Err(BackendError::NotLoaded);
        }
        f(&mut inner, self.index)
    }
}

#[async_trait]
impl AudioResource for MockResource {
    async fn play(&mut self) -> Result<(), BackendError> {
        self.with(Some("play".into()), |inner, i| {
            inner.resources[i].playing = true;
            Ok(())
        })
    }

    async fn pause(&mut self) -> Result<(), BackendError> {
        self.with(Some("pause".into()), |inner, i| {
            if inner.fail_pause {
                return Err(BackendError::Other("pause refused".into()));
            }
            inner.resources[i].playing = false;
            Ok(())
        })
    }

    async fn seek(&mut self, position: Duration) -> Result<(), BackendError> {
        self.with(Some(format!("seek {}", position.as_millis())), |inner, i| {
            if inner.fail_seek {
                return Err(BackendError::Other("seek refused".into()));
            }
            let r = &mut inner.resources[i];
            r.position = position;
            r.finished = false;
            Ok(())
        })
    }

    async fn status(&mut self) -> Result<ResourceStatus, BackendError> {
        self.with(None, |inner, i| {
            let r = &inner.resources[i];
            Ok(ResourceStatus {
                loaded: true,
                position: r.position,
                duration: r.duration,
                finished: r.finished,
            })
        })
    }

    async fn unload(&mut self) -> Result<(), BackendError> {
        self.with(Some("unload".into()), |inner, i| {
            if inner.fail_unload {
                return Err(BackendError::Other("unload refused".into()));
            }
            inner.resources[i].loaded = false;
            inner.resources[i].playing = false;
            inner.open_now -= 1;
            Ok(())
        })
    }
}

// ===== Engine helpers =====

pub fn engine_with(backend: &MockBackend, config: PlaybackConfig) -> PlaybackEngine {
    PlaybackEngine::new(Arc::new(backend.clone()), config)
}

pub fn seeded_config() -> PlaybackConfig {
    PlaybackConfig {
        shuffle_seed: Some(7),
        ..PlaybackConfig::default()
    }
}

/// Wait (on the tokio clock) until a published snapshot satisfies `pred`
pub async fn wait_until(
    engine: &PlaybackEngine,
    pred: impl FnMut(&PlaybackSnapshot) -> bool,
) -> PlaybackSnapshot {
    let mut rx = engine.subscribe();
    let snapshot = tokio::time::timeout(Duration::from_secs(60), rx.wait_for(pred))
        .await
        .expect("timed out waiting for engine state")
        .expect("engine dropped")
        .clone();
    snapshot
}

pub fn current_id(snapshot: &PlaybackSnapshot) -> Option<&str> {
    snapshot.current_track.as_ref().map(|t| t.id.as_str())
}
