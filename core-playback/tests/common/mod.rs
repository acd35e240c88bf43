//! In-memory media host shared by the integration suites.
//!
//! Every handle records what the engine asked of it (sources, volume writes,
//! play attempts, pauses) and lets a test inject progress, end-of-media and
//! error signals.

#![allow(dead_code)]

use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{
    BridgeError, DynMediaEventStream, MediaEvent, MediaHandle, MediaHandleId, MediaHost,
};
use core_async::time::{sleep, Duration};
use core_playback::{AudioEngine, Track, TrackCatalog};
use core_runtime::config::{AudioSettings, CoreConfig};
use futures::channel::mpsc;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

// ============================================================================
// Host behaviour
// ============================================================================

#[derive(Default)]
struct Behaviour {
    failing: HashSet<String>,
    rejected: HashSet<String>,
    delays: HashMap<String, Duration>,
    refuse_handles: bool,
}

#[derive(Default)]
pub struct FakeMediaHost {
    behaviour: Arc<Mutex<Behaviour>>,
    handles: Mutex<Vec<Arc<FakeHandle>>>,
}

impl FakeMediaHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// `play()` on `uri` fails as if the media could not be fetched.
    pub fn fail_source(&self, uri: &str) {
        self.behaviour.lock().failing.insert(uri.to_string());
    }

    /// `play()` on `uri` fails as if the autoplay policy refused it.
    pub fn reject_source(&self, uri: &str) {
        self.behaviour.lock().rejected.insert(uri.to_string());
    }

    /// `play()` on `uri` settles only after `delay`.
    pub fn delay_source(&self, uri: &str, delay: Duration) {
        self.behaviour.lock().delays.insert(uri.to_string(), delay);
    }

    pub fn refuse_handles(&self) {
        self.behaviour.lock().refuse_handles = true;
    }

    /// Every handle created so far, in creation order.
    pub fn handles(&self) -> Vec<Arc<FakeHandle>> {
        self.handles.lock().clone()
    }

    /// The first handle, which the engine owns for its lifetime.
    pub fn engine_handle(&self) -> Arc<FakeHandle> {
        self.handles.lock()[0].clone()
    }

    pub fn handle_count(&self) -> usize {
        self.handles.lock().len()
    }
}

impl MediaHost for FakeMediaHost {
    fn create_handle(&self) -> BridgeResult<Arc<dyn MediaHandle>> {
        if self.behaviour.lock().refuse_handles {
            return Err(BridgeError::NotAvailable("audio output".into()));
        }

        let handle = Arc::new(FakeHandle::new(Arc::clone(&self.behaviour)));
        self.handles.lock().push(Arc::clone(&handle));
        Ok(handle)
    }
}

// ============================================================================
// Handle
// ============================================================================

#[derive(Default)]
struct HandleState {
    source: Option<String>,
    volume: f32,
    muted: bool,
    position: Duration,
    duration: Option<Duration>,
    sources: Vec<String>,
    volumes: Vec<f32>,
    plays: Vec<String>,
    pauses: usize,
    released: bool,
    subscribers: Vec<mpsc::UnboundedSender<MediaEvent>>,
}

pub struct FakeHandle {
    id: MediaHandleId,
    behaviour: Arc<Mutex<Behaviour>>,
    state: Mutex<HandleState>,
}

impl FakeHandle {
    fn new(behaviour: Arc<Mutex<Behaviour>>) -> Self {
        Self {
            id: MediaHandleId::new(),
            behaviour,
            state: Mutex::new(HandleState {
                volume: 1.0,
                ..HandleState::default()
            }),
        }
    }

    /// Sources assigned, in order.
    pub fn sources(&self) -> Vec<String> {
        self.state.lock().sources.clone()
    }

    /// Source loaded at each `play()` call, in order.
    pub fn plays(&self) -> Vec<String> {
        self.state.lock().plays.clone()
    }

    /// Every volume written, in order.
    pub fn volumes(&self) -> Vec<f32> {
        self.state.lock().volumes.clone()
    }

    pub fn pauses(&self) -> usize {
        self.state.lock().pauses
    }

    pub fn is_muted(&self) -> bool {
        self.state.lock().muted
    }

    pub fn is_released(&self) -> bool {
        self.state.lock().released
    }

    pub fn current_position(&self) -> Duration {
        self.state.lock().position
    }

    /// Pretend metadata arrived and announce it.
    pub fn load_duration(&self, duration: Duration) {
        self.state.lock().duration = Some(duration);
        self.emit(MediaEvent::DurationChange { duration });
    }

    /// Advance the playhead and announce it.
    pub fn advance_to(&self, position: Duration) {
        self.state.lock().position = position;
        self.emit(MediaEvent::TimeUpdate { position });
    }

    pub fn finish(&self) {
        self.emit(MediaEvent::Ended);
    }

    pub fn emit(&self, event: MediaEvent) {
        self.state
            .lock()
            .subscribers
            .retain(|subscriber| subscriber.unbounded_send(event.clone()).is_ok());
    }
}

#[async_trait::async_trait]
impl MediaHandle for FakeHandle {
    fn id(&self) -> MediaHandleId {
        self.id
    }

    fn set_source(&self, uri: &str) -> BridgeResult<()> {
        let mut state = self.state.lock();
        state.source = Some(uri.to_string());
        state.sources.push(uri.to_string());
        state.position = Duration::ZERO;
        state.duration = None;
        Ok(())
    }

    fn source(&self) -> Option<String> {
        self.state.lock().source.clone()
    }

    fn set_volume(&self, volume: f32) -> BridgeResult<()> {
        let mut state = self.state.lock();
        state.volume = volume;
        state.volumes.push(volume);
        Ok(())
    }

    fn volume(&self) -> f32 {
        self.state.lock().volume
    }

    fn set_muted(&self, muted: bool) -> BridgeResult<()> {
        self.state.lock().muted = muted;
        Ok(())
    }

    fn set_position(&self, position: Duration) -> BridgeResult<()> {
        self.state.lock().position = position;
        Ok(())
    }

    fn position(&self) -> Duration {
        self.state.lock().position
    }

    fn duration(&self) -> Option<Duration> {
        self.state.lock().duration
    }

    async fn play(&self) -> BridgeResult<()> {
        let source = {
            let mut state = self.state.lock();
            let source = state.source.clone().unwrap_or_default();
            state.plays.push(source.clone());
            source
        };

        let delay = self.behaviour.lock().delays.get(&source).copied();
        if let Some(delay) = delay {
            sleep(delay).await;
        }

        let behaviour = self.behaviour.lock();
        if behaviour.rejected.contains(&source) {
            return Err(BridgeError::PlaybackRejected("NotAllowedError".into()));
        }
        if behaviour.failing.contains(&source) {
            return Err(BridgeError::MediaSource(format!("cannot load {source}")));
        }
        Ok(())
    }

    fn pause(&self) -> BridgeResult<()> {
        self.state.lock().pauses += 1;
        Ok(())
    }

    fn subscribe(&self) -> DynMediaEventStream {
        let (sender, receiver) = mpsc::unbounded();
        self.state.lock().subscribers.push(sender);
        Box::pin(receiver)
    }

    fn release(&self) -> BridgeResult<()> {
        let mut state = self.state.lock();
        state.released = true;
        state.subscribers.clear();
        Ok(())
    }
}

// ============================================================================
// Engine fixtures
// ============================================================================

pub const LOCAL_X: &str = "/local/x.mp3";
pub const REMOTE_X: &str = "https://cdn/x.ogg";
pub const REMOTE_Y: &str = "https://cdn/y.ogg";

/// `x` is local with a remote fallback, `y` is remote only.
pub fn test_catalog() -> TrackCatalog {
    TrackCatalog::from_tracks(vec![
        Track::new("x", "Track X", LOCAL_X).with_fallback(REMOTE_X),
        Track::new("y", "Track Y", REMOTE_Y),
    ])
    .expect("valid test catalog")
}

pub fn config_for(host: &Arc<FakeMediaHost>, settings: AudioSettings) -> CoreConfig {
    CoreConfig::builder()
        .media_host(host.clone())
        .audio(settings)
        .build()
        .expect("valid test config")
}

pub fn start_engine(host: &Arc<FakeMediaHost>) -> Arc<AudioEngine> {
    AudioEngine::start_with_catalog(config_for(host, AudioSettings::default()), test_catalog())
        .expect("engine starts")
}

/// Let the observer task drain pending media events.
pub async fn settle() {
    sleep(Duration::from_millis(1)).await;
}
