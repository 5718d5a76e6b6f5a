//! Playback engine - core orchestration
//!
//! Owns the one open audio resource, the queue, transport state and
//! shuffle/repeat policy. Every operation locks the engine state for its
//! whole duration, backend awaits included, so operations never interleave
//! against the same resource.
//!
//! End-of-track notices from the position sampler and from the backend's
//! native callback arrive on one channel and are handled by a listener
//! task; seeks that land at the end are handled inline.

use crate::{
    backend::{AudioBackend, CompletionNotice, CompletionSignal, CompletionTrigger, ResourceStatus},
    completion::{completion_action, near_end, CompletionAction},
    error::{PlaybackError, Result},
    events::PlaybackEvent,
    queue::Queue,
    sampler,
    transport::{Loaded, Transport},
    types::{PlaybackConfig, PlaybackSnapshot, PlayerStatus, RepeatMode},
};
use melo_core::Track;
use rand::{rngs::StdRng, SeedableRng};
use std::ops::ControlFlow;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Playback engine handle
///
/// Cheap to clone; all clones drive the same engine. Must be created inside
/// a tokio runtime. Call [`PlaybackEngine::shutdown`] on exit so the open
/// resource is released.
#[derive(Clone)]
pub struct PlaybackEngine {
    inner: Arc<Shared>,
}

struct Shared {
    backend: Arc<dyn AudioBackend>,
    config: PlaybackConfig,
    state: Mutex<EngineState>,
    snapshot_tx: watch::Sender<PlaybackSnapshot>,
    events_tx: broadcast::Sender<PlaybackEvent>,
    completion_tx: mpsc::UnboundedSender<CompletionNotice>,
    listener: std::sync::Mutex<Option<JoinHandle<()>>>,
}

struct EngineState {
    transport: Transport,
    queue: Queue,
    position: Duration,
    /// Zero while unknown
    duration: Duration,
    shuffle: bool,
    repeat: RepeatMode,
    /// Generation handed to the most recently opened resource
    next_generation: u64,
    /// End of the current play-through has been handled
    completion_latched: bool,
    rng: StdRng,
    shut_down: bool,
}

impl PlaybackEngine {
    /// Create a new engine driving `backend`
    pub fn new(backend: Arc<dyn AudioBackend>, config: PlaybackConfig) -> Self {
        let rng = match config.shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let state = EngineState {
            transport: Transport::Idle,
            queue: Queue::new(),
            position: Duration::ZERO,
            duration: Duration::ZERO,
            shuffle: config.shuffle,
            repeat: config.repeat,
            next_generation: 0,
            completion_latched: false,
            rng,
            shut_down: false,
        };
        let initial = PlaybackSnapshot {
            shuffle: state.shuffle,
            repeat: state.repeat,
            ..PlaybackSnapshot::default()
        };

        let (snapshot_tx, _) = watch::channel(initial);
        let (events_tx, _) = broadcast::channel(config.event_capacity.max(1));
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();

        let inner = Arc::new(Shared {
            backend,
            config,
            state: Mutex::new(state),
            snapshot_tx,
            events_tx,
            completion_tx,
            listener: std::sync::Mutex::new(None),
        });

        let listener = tokio::spawn(listen(Arc::downgrade(&inner), completion_rx));
        if let Ok(mut slot) = inner.listener.lock() {
            *slot = Some(listener);
        }

        Self { inner }
    }

    /// Load `track` and start playing it
    ///
    /// A non-empty `queue` replaces the current queue once the track opened.
    pub async fn play(&self, track: Track, queue: Option<Vec<Track>>) -> Result<()> {
        let mut state = self.lock_running().await?;
        let result = self.inner.play_locked(&mut state, track, queue).await;
        self.inner.publish(&state);
        result
    }

    /// Pause output, keeping track and position
    pub async fn pause(&self) -> Result<()> {
        let mut state = self.lock_running().await?;
        let result = self.inner.pause_locked(&mut state).await;
        self.inner.publish(&state);
        result
    }

    /// Resume output of the current track
    pub async fn resume(&self) -> Result<()> {
        let mut state = self.lock_running().await?;
        let result = self.inner.resume_locked(&mut state).await;
        self.inner.publish(&state);
        result
    }

    /// Pause when playing, resume otherwise
    pub async fn toggle_play_pause(&self) -> Result<()> {
        let mut state = self.lock_running().await?;
        let result = if state.transport.status() == PlayerStatus::Playing {
            self.inner.pause_locked(&mut state).await
        } else {
            self.inner.resume_locked(&mut state).await
        };
        self.inner.publish(&state);
        result
    }

    /// Move to an absolute position
    ///
    /// Landing within the completion tolerance of a known duration ends the
    /// track immediately.
    pub async fn seek_to(&self, position: Duration) -> Result<()> {
        let mut state = self.lock_running().await?;
        let result = self.inner.seek_locked(&mut state, position).await;
        self.inner.publish(&state);
        result
    }

    /// Jump forward one skip step, stopping at the duration when known
    pub async fn fast_forward(&self) -> Result<()> {
        let mut state = self.lock_running().await?;
        let mut target = state.position.saturating_add(self.inner.config.skip_step());
        if !state.duration.is_zero() {
            target = target.min(state.duration);
        }
        let result = self.inner.seek_locked(&mut state, target).await;
        self.inner.publish(&state);
        result
    }

    /// Jump back one skip step, stopping at zero
    pub async fn rewind(&self) -> Result<()> {
        let mut state = self.lock_running().await?;
        let target = state.position.saturating_sub(self.inner.config.skip_step());
        let result = self.inner.seek_locked(&mut state, target).await;
        self.inner.publish(&state);
        result
    }

    /// Play the next queue entry (wraps at the end)
    pub async fn skip_to_next(&self) -> Result<()> {
        let mut state = self.lock_running().await?;
        let result = self.inner.skip_next_locked(&mut state).await;
        self.inner.publish(&state);
        result
    }

    /// Restart the current track, or play the previous entry when close to
    /// the start
    pub async fn skip_to_previous(&self) -> Result<()> {
        let mut state = self.lock_running().await?;
        let result = self.inner.skip_previous_locked(&mut state).await;
        self.inner.publish(&state);
        result
    }

    /// Flip shuffle mode, returning the new value
    pub async fn toggle_shuffle(&self) -> Result<bool> {
        let mut state = self.lock_running().await?;
        state.shuffle = !state.shuffle;
        debug!(shuffle = state.shuffle, "Shuffle toggled");
        self.inner.emit_modes_changed(&state);
        self.inner.publish(&state);
        Ok(state.shuffle)
    }

    /// Cycle repeat mode `off -> all -> one -> off`, returning the new mode
    pub async fn toggle_repeat(&self) -> Result<RepeatMode> {
        let mut state = self.lock_running().await?;
        state.repeat = state.repeat.cycle();
        debug!(repeat = %state.repeat, "Repeat mode cycled");
        self.inner.emit_modes_changed(&state);
        self.inner.publish(&state);
        Ok(state.repeat)
    }

    /// Replace the queue without touching the current track
    pub async fn replace_queue(&self, tracks: Vec<Track>) -> Result<()> {
        let mut state = self.lock_running().await?;
        state.queue.replace(tracks);
        self.inner.emit(PlaybackEvent::QueueChanged {
            length: state.queue.len(),
        });
        self.inner.publish(&state);
        Ok(())
    }

    /// Latest published state
    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.inner.snapshot_tx.borrow().clone()
    }

    /// Receiver notified after every state change
    pub fn subscribe(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.inner.snapshot_tx.subscribe()
    }

    /// Receiver for playback events
    pub fn events(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.inner.events_tx.subscribe()
    }

    /// Release the open resource and stop background tasks
    ///
    /// Every later operation returns [`PlaybackError::ShutDown`]. Calling it
    /// twice is harmless.
    pub async fn shutdown(&self) -> Result<()> {
        let mut state = self.inner.state.lock().await;
        if state.shut_down {
            return Ok(());
        }

        let was = state.transport.status();
        let result = self.inner.teardown_locked(&mut state).await;
        state.shut_down = true;
        self.inner.stop_listener();

        if was != PlayerStatus::Idle {
            self.inner.emit_state_changed(PlayerStatus::Idle);
        }
        self.inner.publish(&state);
        info!("Playback engine shut down");
        result
    }

    async fn lock_running(&self) -> Result<MutexGuard<'_, EngineState>> {
        let state = self.inner.state.lock().await;
        if state.shut_down {
            return Err(PlaybackError::ShutDown);
        }
        Ok(state)
    }
}

impl std::fmt::Debug for PlaybackEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackEngine")
            .field("snapshot", &*self.inner.snapshot_tx.borrow())
            .finish_non_exhaustive()
    }
}

/// Drain completion notices until the engine goes away
async fn listen(engine: Weak<Shared>, mut notices: mpsc::UnboundedReceiver<CompletionNotice>) {
    while let Some(notice) = notices.recv().await {
        let Some(shared) = engine.upgrade() else {
            break;
        };
        shared.on_completion(notice).await;
    }
}

impl Shared {
    async fn play_locked(
        self: &Arc<Self>,
        st: &mut EngineState,
        track: Track,
        queue: Option<Vec<Track>>,
    ) -> Result<()> {
        let was = st.transport.status();
        let previous_track_id = st.transport.current_track().map(|t| t.id.to_string());

        if let Err(err) = self.teardown_locked(st).await {
            self.emit_error(err.to_string());
            if was != PlayerStatus::Idle {
                self.emit_state_changed(PlayerStatus::Idle);
            }
            return Err(err);
        }

        st.next_generation += 1;
        let generation = st.next_generation;
        let signal = CompletionSignal::new(generation, self.completion_tx.clone());

        let mut resource = match self.backend.open(&track.uri, true, signal).await {
            Ok(resource) => resource,
            Err(source) => {
                warn!(track_id = %track.id, uri = %track.uri, error = %source, "Failed to open track");
                let err = PlaybackError::ResourceOpen {
                    uri: track.uri.clone(),
                    source,
                };
                self.emit_error(err.to_string());
                if was != PlayerStatus::Idle {
                    self.emit_state_changed(PlayerStatus::Idle);
                }
                return Err(err);
            }
        };

        if let Some(tracks) = queue.filter(|q| !q.is_empty()) {
            st.queue.replace(tracks);
            self.emit(PlaybackEvent::QueueChanged {
                length: st.queue.len(),
            });
        }

        let status = match resource.status().await {
            Ok(status) => status,
            Err(e) => {
                debug!(error = %e, "Status unavailable right after open");
                ResourceStatus::default()
            }
        };
        st.duration = status
            .duration
            .filter(|d| status.loaded && !d.is_zero())
            .or_else(|| track.duration())
            .unwrap_or(Duration::ZERO);
        st.position = Duration::ZERO;
        st.completion_latched = false;

        info!(
            track_id = %track.id,
            title = track.display_title(),
            generation,
            "Now playing"
        );

        let track_id = track.id.to_string();
        st.transport = Transport::Playing(Loaded {
            track,
            resource,
            generation,
            sampler: self.spawn_sampler(generation),
        });

        self.emit_track_changed(track_id, previous_track_id);
        if was != PlayerStatus::Playing {
            self.emit_state_changed(PlayerStatus::Playing);
        }
        Ok(())
    }

    /// Abort the sampler and unload the resource, leaving `Idle`
    async fn teardown_locked(&self, st: &mut EngineState) -> Result<()> {
        let Some(mut loaded) = st.transport.take_loaded() else {
            return Ok(());
        };

        loaded.sampler.abort();
        st.position = Duration::ZERO;
        st.duration = Duration::ZERO;
        st.completion_latched = false;

        loaded.resource.unload().await.map_err(|e| {
            warn!(track_id = %loaded.track.id, error = %e, "Failed to unload resource");
            PlaybackError::Teardown(e)
        })
    }

    async fn pause_locked(&self, st: &mut EngineState) -> Result<()> {
        let status = st.transport.status();
        let (PlayerStatus::Playing, Some(loaded)) = (status, st.transport.loaded_mut()) else {
            debug!(?status, "Pause ignored");
            return Ok(());
        };

        loaded.resource.pause().await.map_err(|source| {
            warn!(error = %source, "Pause failed");
            PlaybackError::ResourceOp {
                operation: "pause",
                source,
            }
        })?;

        // The last sample can trail the playhead by up to one interval
        match loaded.resource.status().await {
            Ok(status) => {
                if let Some(duration) = status.duration.filter(|d| !d.is_zero()) {
                    st.duration = duration;
                }
                st.position = if st.duration.is_zero() {
                    status.position
                } else {
                    status.position.min(st.duration)
                };
                self.emit_position_update(st);
            }
            Err(e) => warn!(error = %e, "Status query failed after pause"),
        }

        st.transport.pause();
        self.emit_state_changed(PlayerStatus::Paused);
        Ok(())
    }

    async fn resume_locked(&self, st: &mut EngineState) -> Result<()> {
        let Some(loaded) = st.transport.loaded_mut() else {
            debug!("Resume ignored, no current track");
            return Ok(());
        };

        loaded.resource.play().await.map_err(|source| {
            warn!(error = %source, "Resume failed");
            PlaybackError::ResourceOp {
                operation: "resume",
                source,
            }
        })?;

        if st.transport.status() == PlayerStatus::Paused {
            st.transport.play();
            self.emit_state_changed(PlayerStatus::Playing);
        }
        Ok(())
    }

    async fn seek_locked(self: &Arc<Self>, st: &mut EngineState, position: Duration) -> Result<()> {
        if st.transport.loaded().is_none() {
            debug!("Seek ignored, no current track");
            return Ok(());
        }

        self.reposition_locked(st, position).await?;

        if near_end(st.position, st.duration, self.config.completion_tolerance()) {
            self.handle_completion_locked(st, CompletionTrigger::Seek).await?;
        }
        Ok(())
    }

    /// Seek without the end-of-track check; re-arms completion detection
    async fn reposition_locked(&self, st: &mut EngineState, position: Duration) -> Result<()> {
        let Some(loaded) = st.transport.loaded_mut() else {
            return Ok(());
        };

        loaded.resource.seek(position).await.map_err(|source| {
            warn!(position_ms = duration_ms(position), error = %source, "Seek failed");
            PlaybackError::ResourceOp {
                operation: "seek",
                source,
            }
        })?;

        st.position = position;
        st.completion_latched = false;
        self.emit_position_update(st);
        Ok(())
    }

    async fn skip_next_locked(self: &Arc<Self>, st: &mut EngineState) -> Result<()> {
        let current = current_index(st);
        let index = st
            .queue
            .next_index(current, st.shuffle, &mut st.rng)
            .ok_or(PlaybackError::EmptyQueue)?;
        let track = st.queue.get(index).cloned().ok_or(PlaybackError::EmptyQueue)?;

        debug!(from = ?current, to = index, "Skipping to next");
        self.play_locked(st, track, None).await
    }

    async fn skip_previous_locked(self: &Arc<Self>, st: &mut EngineState) -> Result<()> {
        if st.queue.is_empty() {
            return Err(PlaybackError::EmptyQueue);
        }

        if st.transport.loaded().is_some() && st.position > self.config.restart_threshold() {
            debug!(position_ms = duration_ms(st.position), "Restarting current track");
            return self.reposition_locked(st, Duration::ZERO).await;
        }

        let current = current_index(st);
        let index = st
            .queue
            .previous_index(current, st.shuffle, &mut st.rng)
            .ok_or(PlaybackError::EmptyQueue)?;
        let track = st.queue.get(index).cloned().ok_or(PlaybackError::EmptyQueue)?;

        debug!(from = ?current, to = index, "Skipping to previous");
        self.play_locked(st, track, None).await
    }

    /// Run the end-of-track policy for the current track
    async fn handle_completion_locked(
        self: &Arc<Self>,
        st: &mut EngineState,
        trigger: CompletionTrigger,
    ) -> Result<()> {
        let Some(track_id) = st.transport.current_track().map(|t| t.id.to_string()) else {
            return Ok(());
        };

        st.completion_latched = true;
        self.emit(PlaybackEvent::TrackFinished {
            track_id: track_id.clone(),
            trigger,
        });

        let action = completion_action(st.repeat, current_index(st), st.queue.len());
        info!(%track_id, ?trigger, ?action, repeat = %st.repeat, "Track finished");

        match action {
            CompletionAction::Restart => {
                self.reposition_locked(st, Duration::ZERO).await?;
                self.resume_locked(st).await
            }
            CompletionAction::Advance => self.skip_next_locked(st).await,
            CompletionAction::Stop => {
                self.pause_locked(st).await?;
                self.reposition_locked(st, Duration::ZERO).await
            }
        }
    }

    /// Handle a notice from the sampler or the backend
    async fn on_completion(self: &Arc<Self>, notice: CompletionNotice) {
        let mut guard = self.state.lock().await;
        let st = &mut *guard;

        if st.shut_down || st.transport.generation() != Some(notice.generation) {
            debug!(generation = notice.generation, "Stale completion notice ignored");
            return;
        }
        if st.completion_latched {
            debug!(trigger = ?notice.trigger, "Completion already handled");
            return;
        }

        if notice.trigger != CompletionTrigger::Seek {
            let tolerance = self.config.completion_tolerance();
            let known_duration = st.duration;
            let Some(loaded) = st.transport.loaded_mut() else {
                return;
            };
            match loaded.resource.status().await {
                Ok(status) => {
                    let duration = status
                        .duration
                        .filter(|d| !d.is_zero())
                        .unwrap_or(known_duration);
                    if !status.finished && !near_end(status.position, duration, tolerance) {
                        debug!(trigger = ?notice.trigger, "Track no longer at its end");
                        return;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Status query failed while confirming completion");
                    return;
                }
            }
        }

        if let Err(e) = self.handle_completion_locked(st, notice.trigger).await {
            warn!(error = %e, "End-of-track handling failed");
        }
        self.publish(st);
    }

    fn spawn_sampler(self: &Arc<Self>, generation: u64) -> JoinHandle<()> {
        let engine = Arc::downgrade(self);
        sampler::spawn(self.config.sample_interval(), move || {
            let engine = engine.clone();
            async move {
                match engine.upgrade() {
                    Some(shared) => shared.sample(generation).await,
                    None => ControlFlow::Break(()),
                }
            }
        })
    }

    /// One sampler tick for the resource of `generation`
    async fn sample(&self, generation: u64) -> ControlFlow<()> {
        let mut guard = self.state.lock().await;
        let st = &mut *guard;

        if st.shut_down || st.transport.generation() != Some(generation) {
            return ControlFlow::Break(());
        }
        let Transport::Playing(loaded) = &mut st.transport else {
            return ControlFlow::Continue(());
        };

        let status = match loaded.resource.status().await {
            Ok(status) => status,
            Err(e) => {
                warn!(error = %e, "Position sample failed");
                return ControlFlow::Continue(());
            }
        };

        if let Some(duration) = status.duration.filter(|d| !d.is_zero()) {
            st.duration = duration;
        }
        st.position = if st.duration.is_zero() {
            status.position
        } else {
            status.position.min(st.duration)
        };
        self.emit_position_update(st);
        self.publish(st);

        let at_end = status.finished
            || near_end(st.position, st.duration, self.config.completion_tolerance());
        if at_end && !st.completion_latched {
            let _ = self.completion_tx.send(CompletionNotice {
                generation,
                trigger: CompletionTrigger::Sampler,
            });
        }
        ControlFlow::Continue(())
    }

    fn stop_listener(&self) {
        if let Ok(mut slot) = self.listener.lock() {
            if let Some(listener) = slot.take() {
                listener.abort();
            }
        }
    }

    fn publish(&self, st: &EngineState) {
        let current_track = st.transport.current_track().cloned();
        self.snapshot_tx.send_replace(PlaybackSnapshot {
            status: st.transport.status(),
            current_index: current_index(st),
            current_track,
            position: st.position,
            duration: st.duration,
            shuffle: st.shuffle,
            repeat: st.repeat,
            queue: st.queue.shared(),
        });
    }

    fn emit(&self, event: PlaybackEvent) {
        // No receivers is fine
        let _ = self.events_tx.send(event);
    }

    fn emit_state_changed(&self, status: PlayerStatus) {
        self.emit(PlaybackEvent::StateChanged { status });
    }

    fn emit_track_changed(&self, track_id: String, previous_track_id: Option<String>) {
        self.emit(PlaybackEvent::TrackChanged {
            track_id,
            previous_track_id,
        });
    }

    fn emit_position_update(&self, st: &EngineState) {
        self.emit(PlaybackEvent::PositionUpdate {
            position_ms: duration_ms(st.position),
            duration_ms: duration_ms(st.duration),
        });
    }

    fn emit_modes_changed(&self, st: &EngineState) {
        self.emit(PlaybackEvent::ModesChanged {
            shuffle: st.shuffle,
            repeat: st.repeat,
        });
    }

    fn emit_error(&self, message: String) {
        self.emit(PlaybackEvent::Error { message });
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        self.stop_listener();
        if let Some(loaded) = self.state.get_mut().transport.loaded() {
            loaded.sampler.abort();
        }
    }
}

fn current_index(st: &EngineState) -> Option<usize> {
    st.transport
        .current_track()
        .and_then(|t| st.queue.position_of(&t.id))
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
