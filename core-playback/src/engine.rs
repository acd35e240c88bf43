//! # Playback Engine
//!
//! The single owner of the application's audio output. It holds one media
//! handle for its whole lifetime, resolves tracks through the
//! [`TrackCatalog`], starts them with at most one fallback hop, ramps volume
//! through the [`FadeController`] and mirrors the handle's progress into a
//! [`PlaybackSnapshot`].
//!
//! ## Staleness
//!
//! Every operation that changes what should be playing bumps a generation
//! counter. A start attempt or fade step that resumes after the counter moved
//! on discards its result instead of touching state, so a slow primary that
//! settles after the user already picked another track is simply ignored.
//!
//! ## Errors
//!
//! UI-facing operations never fail. Failures become state (`playing = false`,
//! [`TransportState::Failed`]), `tracing` output and [`PlaybackEvent`]s.
//! Only construction can fail.
//!
//! ## Usage
//!
//! ```ignore
//! use core_playback::AudioEngine;
//! use core_runtime::config::CoreConfig;
//!
//! let engine = AudioEngine::start(CoreConfig::builder().media_host(host).build()?)?;
//!
//! // inside a click handler
//! if engine.unlock_and_play("rain-ambient").await {
//!     engine.set_volume(0.5);
//! }
//! ```

use crate::catalog::{Track, TrackCatalog};
use crate::error::{PlaybackError, Result};
use crate::fade::{FadeController, FadeOutcome};
use crate::state::{progress_fraction, PlaybackSnapshot, TransportState};
use crate::unlock::UnlockGate;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{MediaEvent, MediaHandle};
use core_async::time::Duration;
use core_runtime::config::{AudioSettings, CoreConfig};
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent, Receiver};
use core_runtime::logging::display_source;
use futures::future::{AbortHandle, Abortable};
use futures::StreamExt;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, error, info, instrument, warn};

pub struct AudioEngine {
    handle: Arc<dyn MediaHandle>,
    catalog: TrackCatalog,
    unlock: UnlockGate,
    fader: FadeController,
    events: EventBus,
    settings: AudioSettings,
    state: Mutex<PlaybackSnapshot>,
    generation: AtomicU64,
    observer: Mutex<Option<AbortHandle>>,
    shut_down: AtomicBool,
}

impl AudioEngine {
    /// Start an engine over the built-in ambient catalog.
    ///
    /// Must be called from within an async runtime: the engine spawns a task
    /// observing the media handle's progress and end-of-media signals.
    ///
    /// # Errors
    ///
    /// - [`PlaybackError::Runtime`] when the audio settings are invalid
    /// - [`PlaybackError::Bridge`] when the host cannot create a handle
    pub fn start(config: CoreConfig) -> Result<Arc<Self>> {
        Self::start_with_catalog(config, TrackCatalog::with_default_tracks())
    }

    /// Start an engine over `catalog`.
    pub fn start_with_catalog(config: CoreConfig, catalog: TrackCatalog) -> Result<Arc<Self>> {
        config.validate()?;

        let settings = config.audio.clone();
        let events = EventBus::new(settings.event_buffer_size);
        let handle = config.media_host.create_handle()?;
        handle.set_volume(settings.default_volume)?;
        handle.set_muted(settings.start_muted)?;

        let engine = Arc::new(Self {
            unlock: UnlockGate::from_config(&config, events.clone()),
            fader: FadeController::from_settings(&settings),
            state: Mutex::new(PlaybackSnapshot::new(
                settings.default_volume,
                settings.start_muted,
            )),
            handle,
            catalog,
            events,
            settings,
            generation: AtomicU64::new(0),
            observer: Mutex::new(None),
            shut_down: AtomicBool::new(false),
        });

        engine.spawn_observer();

        info!(
            handle = %engine.handle.id(),
            tracks = engine.catalog.len(),
            has_audio_context = engine.unlock.has_audio_context(),
            "Audio engine started"
        );

        Ok(engine)
    }

    // ========================================================================
    // Unlock
    // ========================================================================

    /// Unlock audio output; see [`UnlockGate::unlock`].
    pub async fn unlock(&self) -> bool {
        self.unlock.unlock().await
    }

    /// Unlock, then play `track_id`.
    ///
    /// Returns `false` without attempting playback when the unlock fails.
    /// Otherwise the call resolves only after the start attempt has settled,
    /// including any fallback hop, and returns `true` whatever its outcome.
    /// A failed start is reported through state and events, not the result.
    pub async fn unlock_and_play(&self, track_id: &str) -> bool {
        if !self.unlock.unlock().await {
            error!(track_id, "Failed to unlock audio; not starting playback");
            return false;
        }

        self.play(track_id).await;
        true
    }

    /// Remember a track to start on the next [`AudioEngine::play_pending`].
    pub fn set_pending_track(&self, track_id: impl Into<String>) {
        self.unlock.set_pending_track(track_id);
    }

    /// Unlock, then start the pending track if there is one.
    ///
    /// Returns `true` when a pending track was taken and played.
    pub async fn play_pending(&self) -> bool {
        if !self.unlock.unlock().await {
            return false;
        }

        match self.unlock.take_pending_track() {
            Some(track_id) => {
                self.play(&track_id).await;
                true
            }
            None => false,
        }
    }

    // ========================================================================
    // Transport
    // ========================================================================

    /// Play `track_id`, falling back once for local primaries.
    ///
    /// Unknown ids are ignored. Start failures are reported through state and
    /// events, never to the caller.
    pub async fn play(&self, track_id: &str) {
        if let Err(err) = self.start_track(track_id, None).await {
            self.report_start_error(track_id, &err);
        }
    }

    /// Play `track_id` starting silent, then ramp up to the current volume.
    ///
    /// `duration` defaults to the configured fade length.
    pub async fn fade_in_play(&self, track_id: &str, duration: Option<Duration>) {
        let duration = duration.unwrap_or_else(|| self.fader.default_duration());
        if let Err(err) = self.start_track(track_id, Some(duration)).await {
            self.report_start_error(track_id, &err);
        }
    }

    /// Pause the active track. No-op when nothing is playing or loading.
    pub fn pause(&self) {
        let track_id = {
            let mut state = self.state.lock();
            if !state.is_active() {
                debug!("Nothing to pause");
                return;
            }
            state.playing = false;
            state.transport = TransportState::Paused;
            state.current_track_id().map(str::to_string).unwrap_or_default()
        };

        // Any start attempt or fade still in flight belongs to the old intent
        self.next_generation();

        if let Err(err) = self.handle.pause() {
            warn!(track_id = %track_id, error = %err, "Host failed to pause");
        }

        debug!(track_id = %track_id, "Playback paused");
        self.emit(PlaybackEvent::Paused { track_id });
    }

    /// Pause when playing, otherwise resume the current track.
    pub async fn toggle(&self) {
        let (playing, current) = {
            let state = self.state.lock();
            (state.playing, state.current_track_id().map(str::to_string))
        };

        match (playing, current) {
            (true, _) => self.pause(),
            (false, Some(track_id)) => self.play(&track_id).await,
            (false, None) => debug!("Nothing to toggle"),
        }
    }

    /// Flip the mute flag and apply it. Returns the new state.
    pub fn toggle_mute(&self) -> bool {
        let muted = {
            let mut state = self.state.lock();
            state.muted = !state.muted;
            state.muted
        };

        if let Err(err) = self.handle.set_muted(muted) {
            warn!(muted, error = %err, "Host failed to apply mute");
        }

        self.emit(PlaybackEvent::MuteChanged { muted });
        muted
    }

    /// Set the output volume, clamped to `0.0..=1.0`, and apply it now.
    ///
    /// A fade in progress stops at this point; the new level wins.
    pub fn set_volume(&self, volume: f32) {
        if !volume.is_finite() {
            warn!(volume, "Ignoring non-finite volume");
            return;
        }

        let volume = volume.clamp(0.0, 1.0);
        self.state.lock().volume = volume;

        if let Err(err) = self.handle.set_volume(volume) {
            warn!(volume, error = %err, "Host failed to apply volume");
        }

        self.emit(PlaybackEvent::VolumeChanged { volume });
    }

    /// Move to `fraction` (`0.0..=1.0`, clamped) of the current duration.
    ///
    /// Ignored while the duration is unknown or zero.
    pub fn seek(&self, fraction: f64) {
        if !fraction.is_finite() {
            warn!(fraction, "Ignoring non-finite seek");
            return;
        }

        let duration = match self.handle.duration() {
            Some(duration) if !duration.is_zero() => duration,
            _ => {
                debug!(fraction, "Seek ignored: duration unknown");
                return;
            }
        };

        let fraction = fraction.clamp(0.0, 1.0);
        let position = duration.mul_f64(fraction);

        if let Err(err) = self.handle.set_position(position) {
            warn!(?position, error = %err, "Host failed to seek");
            return;
        }

        let track_id = {
            let mut state = self.state.lock();
            state.progress = progress_fraction(position, Some(duration));
            state.current_track_id().map(str::to_string)
        };

        self.emit(PlaybackEvent::Seeked {
            track_id,
            position_ms: position.as_millis() as u64,
        });
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    /// Replace the track catalog. A rejected set is logged and the previous
    /// catalog stays.
    pub fn load_tracks(&self, tracks: Vec<Track>) {
        match self.catalog.load_tracks(tracks) {
            Ok(()) => {
                let track_count = self.catalog.len();
                info!(track_count, "Track catalog reloaded");
                self.emit(PlaybackEvent::CatalogReloaded { track_count });
            }
            Err(err) => {
                error!(error = %err, "Rejected track catalog");
                self.emit(PlaybackEvent::Error {
                    track_id: None,
                    message: err.to_string(),
                    recoverable: false,
                });
            }
        }
    }

    pub fn tracks(&self) -> Vec<Track> {
        self.catalog.tracks()
    }

    pub fn catalog(&self) -> &TrackCatalog {
        &self.catalog
    }

    // ========================================================================
    // Read access
    // ========================================================================

    pub fn current_track(&self) -> Option<Track> {
        self.state.lock().current_track.clone()
    }

    pub fn is_playing(&self) -> bool {
        self.state.lock().playing
    }

    pub fn volume(&self) -> f32 {
        self.state.lock().volume
    }

    pub fn is_muted(&self) -> bool {
        self.state.lock().muted
    }

    /// Played fraction of the current track, `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        self.state.lock().progress
    }

    pub fn transport(&self) -> TransportState {
        self.state.lock().transport.clone()
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.state.lock().clone()
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlock.is_unlocked()
    }

    pub fn has_audio_context(&self) -> bool {
        self.unlock.has_audio_context()
    }

    pub fn unlock_gate(&self) -> &UnlockGate {
        &self.unlock
    }

    pub fn settings(&self) -> &AudioSettings {
        &self.settings
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.events.subscribe()
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Stop playback, detach the observer and release the handle.
    ///
    /// Later transport calls are ignored.
    pub fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }

        self.next_generation();
        if let Some(observer) = self.observer.lock().take() {
            observer.abort();
        }

        if let Err(err) = self.handle.pause() {
            debug!(error = %err, "Pause during shutdown failed");
        }
        if let Err(err) = self.handle.release() {
            warn!(error = %err, "Failed to release media handle");
        }

        {
            let mut state = self.state.lock();
            state.playing = false;
            state.transport = TransportState::Idle;
        }

        info!(handle = %self.handle.id(), "Audio engine shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    // ========================================================================
    // Start sequence
    // ========================================================================

    #[instrument(skip(self, fade), fields(fade = fade.is_some()))]
    async fn start_track(&self, track_id: &str, fade: Option<Duration>) -> Result<()> {
        if self.is_shut_down() {
            warn!("Engine shut down; ignoring play request");
            return Ok(());
        }

        let track = self
            .catalog
            .resolve(track_id)
            .ok_or_else(|| PlaybackError::TrackNotFound(track_id.to_string()))?;

        let generation = self.next_generation();
        let candidates = track.candidates();

        // Same track resumes from whichever source is loaded (primary or
        // fallback); anything else starts over from the primary.
        let (remaining, mut assign_source) = {
            let mut state = self.state.lock();
            let same_track = state.current_track_id() == Some(track.id.as_str());
            let resume_at = if same_track {
                self.handle
                    .source()
                    .and_then(|loaded| candidates.iter().position(|uri| *uri == loaded))
            } else {
                None
            };

            if resume_at.is_none() {
                state.current_track = Some(track.clone());
                state.playing = false;
                state.progress = 0.0;
            }

            let start = resume_at.unwrap_or(0);
            (candidates[start..].to_vec(), resume_at.is_none())
        };

        let mut attempts = remaining.into_iter().peekable();
        while let Some(uri) = attempts.next() {
            self.update_state(|state| {
                state.transport = TransportState::Loading {
                    source: uri.clone(),
                }
            });

            debug!(source = %display_source(&uri), "Starting source");
            let result = self
                .attempt_start(&uri, assign_source, fade.is_some())
                .await;

            if !self.is_current(generation) {
                debug!(source = %display_source(&uri), "Start attempt superseded");
                // Paused or shut down while the host was still starting
                if result.is_ok() && !self.state.lock().is_active() {
                    if let Err(err) = self.handle.pause() {
                        debug!(error = %err, "Failed to pause superseded start");
                    }
                }
                return Ok(());
            }

            let err = match result {
                Ok(()) => {
                    self.mark_started(&track, &uri);
                    if let Some(duration) = fade {
                        self.run_fade(generation, duration).await;
                    }
                    return Ok(());
                }
                Err(err) => err,
            };

            match attempts.peek() {
                Some(fallback) => {
                    warn!(
                        source = %display_source(&uri),
                        fallback = %display_source(fallback),
                        error = %err,
                        "Primary source failed; trying fallback"
                    );
                    self.update_state(|state| {
                        state.transport = TransportState::Failed {
                            message: err.to_string(),
                        }
                    });
                    self.emit(PlaybackEvent::FallbackAttempted {
                        track_id: track.id.clone(),
                        failed_source: uri.clone(),
                        fallback_source: fallback.clone(),
                    });
                    assign_source = true;
                }
                None => {
                    let message = err.to_string();
                    self.update_state(|state| {
                        state.playing = false;
                        state.transport = TransportState::Failed {
                            message: message.clone(),
                        };
                    });
                    error!(source = %display_source(&uri), error = %err, "Audio play failed");
                    self.emit(PlaybackEvent::Error {
                        track_id: Some(track.id.clone()),
                        message: message.clone(),
                        recoverable: err.is_policy_rejection(),
                    });
                    return Err(PlaybackError::StartFailed { uri, message });
                }
            }
        }

        Ok(())
    }

    async fn attempt_start(&self, uri: &str, assign_source: bool, silent: bool) -> BridgeResult<()> {
        if assign_source {
            self.handle.set_source(uri)?;
        }

        let (volume, muted) = {
            let state = self.state.lock();
            (state.volume, state.muted)
        };
        self.handle.set_muted(muted)?;
        self.handle
            .set_volume(if silent { 0.0 } else { volume })?;

        self.handle.play().await
    }

    fn mark_started(&self, track: &Track, uri: &str) {
        self.update_state(|state| {
            state.playing = true;
            state.transport = TransportState::Playing;
        });

        info!(track_id = %track.id, source = %display_source(uri), "Playback started");
        self.emit(PlaybackEvent::Started {
            track_id: track.id.clone(),
            source: uri.to_string(),
        });
    }

    async fn run_fade(&self, generation: u64, duration: Duration) {
        let target = self.volume();
        let outcome = self
            .fader
            .fade_in_guarded(Some(&self.handle), target, duration, || {
                self.is_current(generation) && self.volume() == target
            })
            .await;

        match outcome {
            FadeOutcome::Completed => debug!(target, "Fade-in completed"),
            FadeOutcome::Aborted => warn!(target, "Fade-in aborted by host"),
            FadeOutcome::Superseded | FadeOutcome::NoHandle => {
                debug!(?outcome, "Fade-in stopped early")
            }
        }
    }

    fn report_start_error(&self, track_id: &str, err: &PlaybackError) {
        match err {
            PlaybackError::TrackNotFound(_) => {
                warn!(track_id, "Unknown track; ignoring play request")
            }
            // Already logged and published by the start sequence
            PlaybackError::StartFailed { .. } => {}
            other => error!(track_id, error = %other, "Playback request failed"),
        }
    }

    // ========================================================================
    // Media events
    // ========================================================================

    fn spawn_observer(self: &Arc<Self>) {
        let (abort_handle, registration) = AbortHandle::new_pair();
        let engine: Weak<Self> = Arc::downgrade(self);
        let mut stream = self.handle.subscribe();

        let observer = async move {
            while let Some(event) = stream.next().await {
                let Some(engine) = engine.upgrade() else {
                    break;
                };
                engine.on_media_event(event);
            }
        };

        core_async::task::spawn(async move {
            let _ = Abortable::new(observer, registration).await;
        });

        *self.observer.lock() = Some(abort_handle);
    }

    fn on_media_event(&self, event: MediaEvent) {
        match event {
            MediaEvent::TimeUpdate { position } => {
                let duration = self.handle.duration();
                self.update_state(|state| state.progress = progress_fraction(position, duration));
            }
            MediaEvent::DurationChange { duration } => {
                let position = self.handle.position();
                self.update_state(|state| {
                    state.progress = progress_fraction(position, Some(duration))
                });
            }
            MediaEvent::Ended => {
                let track_id = {
                    let mut state = self.state.lock();
                    state.playing = false;
                    state.progress = 0.0;
                    state.transport = TransportState::Idle;
                    state.current_track_id().map(str::to_string)
                };

                if let Some(track_id) = track_id {
                    debug!(track_id = %track_id, "Track finished");
                    self.emit(PlaybackEvent::Completed { track_id });
                }
            }
            MediaEvent::Error { message } => {
                // Start failures are handled by the start sequence itself
                let track_id = {
                    let mut state = self.state.lock();
                    if state.transport != TransportState::Playing {
                        return;
                    }
                    state.playing = false;
                    state.transport = TransportState::Failed {
                        message: message.clone(),
                    };
                    state.current_track_id().map(str::to_string)
                };

                error!(track_id = ?track_id, message = %message, "Media error during playback");
                self.emit(PlaybackEvent::Error {
                    track_id,
                    message,
                    recoverable: true,
                });
            }
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn update_state(&self, update: impl FnOnce(&mut PlaybackSnapshot)) {
        update(&mut self.state.lock());
    }

    fn emit(&self, event: PlaybackEvent) {
        self.events.emit(CoreEvent::Playback(event)).ok();
    }
}

impl Drop for AudioEngine {
    fn drop(&mut self) {
        if let Some(observer) = self.observer.get_mut().take() {
            observer.abort();
        }
    }
}

impl fmt::Debug for AudioEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioEngine")
            .field("handle", &self.handle.id())
            .field("state", &*self.state.lock())
            .field("tracks", &self.catalog.len())
            .field("unlock", &self.unlock)
            .finish()
    }
}
