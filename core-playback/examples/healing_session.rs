//! # Healing Session Example
//!
//! Walks through a listening session against a simulated host: unlock from a
//! "gesture", start the rain track (its bundled file is missing, so the remote
//! fallback takes over), fade into another track, adjust volume, seek and let
//! the track run to its end.
//!
//! Run with: `cargo run --example healing_session --package core-playback`

use anyhow::Result;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{
    BridgeError, ConsoleLogger, DynMediaEventStream, LogLevel, MediaEvent, MediaHandle, MediaHandleId,
    MediaHost, SourceKind,
};
use core_async::time::{sleep, Duration};
use core_playback::AudioEngine;
use core_runtime::config::CoreConfig;
use core_runtime::events::{CoreEvent, EventStream};
use core_runtime::logging::{init_logging, LogFormat};
use futures::channel::mpsc;
use parking_lot::Mutex;
use std::sync::Arc;

// ============================================================================
// Simulated host
// ============================================================================

/// Pretends every remote source is a two minute recording and no local file
/// is bundled.
#[derive(Default)]
struct SimulatedHost {
    handles: Mutex<Vec<Arc<SimulatedHandle>>>,
}

impl SimulatedHost {
    fn output(&self) -> Option<Arc<SimulatedHandle>> {
        self.handles.lock().first().cloned()
    }
}

impl MediaHost for SimulatedHost {
    fn create_handle(&self) -> BridgeResult<Arc<dyn MediaHandle>> {
        let handle = Arc::new(SimulatedHandle::default());
        self.handles.lock().push(Arc::clone(&handle));
        Ok(handle)
    }
}

#[derive(Default)]
struct Playhead {
    source: Option<String>,
    volume: f32,
    position: Duration,
    duration: Option<Duration>,
    subscribers: Vec<mpsc::UnboundedSender<MediaEvent>>,
}

#[derive(Default)]
struct SimulatedHandle {
    id: MediaHandleId,
    playhead: Mutex<Playhead>,
}

impl SimulatedHandle {
    fn emit(&self, event: MediaEvent) {
        self.playhead
            .lock()
            .subscribers
            .retain(|subscriber| subscriber.unbounded_send(event.clone()).is_ok());
    }

    fn advance(&self, by: Duration) {
        let position = {
            let mut playhead = self.playhead.lock();
            playhead.position += by;
            playhead.position
        };
        self.emit(MediaEvent::TimeUpdate { position });
    }
}

#[async_trait::async_trait]
impl MediaHandle for SimulatedHandle {
    fn id(&self) -> MediaHandleId {
        self.id
    }

    fn set_source(&self, uri: &str) -> BridgeResult<()> {
        let mut playhead = self.playhead.lock();
        playhead.source = Some(uri.to_string());
        playhead.position = Duration::ZERO;
        playhead.duration = None;
        Ok(())
    }

    fn source(&self) -> Option<String> {
        self.playhead.lock().source.clone()
    }

    fn set_volume(&self, volume: f32) -> BridgeResult<()> {
        self.playhead.lock().volume = volume;
        Ok(())
    }

    fn volume(&self) -> f32 {
        self.playhead.lock().volume
    }

    fn set_muted(&self, _muted: bool) -> BridgeResult<()> {
        Ok(())
    }

    fn set_position(&self, position: Duration) -> BridgeResult<()> {
        self.playhead.lock().position = position;
        Ok(())
    }

    fn position(&self) -> Duration {
        self.playhead.lock().position
    }

    fn duration(&self) -> Option<Duration> {
        self.playhead.lock().duration
    }

    async fn play(&self) -> BridgeResult<()> {
        sleep(Duration::from_millis(50)).await;

        let source = self.source().unwrap_or_default();
        if source.starts_with("data:") {
            return Ok(());
        }
        if !SourceKind::of(&source).is_remote() {
            return Err(BridgeError::MediaSource(format!("{source} is not bundled")));
        }

        let duration = Duration::from_secs(120);
        self.playhead.lock().duration = Some(duration);
        self.emit(MediaEvent::DurationChange { duration });
        Ok(())
    }

    fn pause(&self) -> BridgeResult<()> {
        Ok(())
    }

    fn subscribe(&self) -> DynMediaEventStream {
        let (sender, receiver) = mpsc::unbounded();
        self.playhead.lock().subscribers.push(sender);
        Box::pin(receiver)
    }
}

// ============================================================================
// Session
// ============================================================================

#[core_async::main]
async fn main() -> Result<()> {
    let host = Arc::new(SimulatedHost::default());
    let config = CoreConfig::builder()
        .media_host(host.clone())
        .logger_sink(Arc::new(ConsoleLogger {
            min_level: LogLevel::Warn,
        }))
        .build()?;

    init_logging(
        config
            .logging_config()
            .with_format(LogFormat::Compact)
            .with_level(LogLevel::Debug),
    )?;

    let engine = AudioEngine::start(config)?;

    let mut events = EventStream::new(engine.subscribe());
    core_async::task::spawn(async move {
        while let Ok(event) = events.recv().await {
            if let CoreEvent::Playback(event) = &event {
                println!("  event: {event:?}");
            }
        }
    });

    println!("Tracks:");
    for track in engine.tracks() {
        println!("  {:<16} {}", track.id, track.name);
    }

    println!("\nUser taps 'Rain Ambience'");
    let unlocked = engine.unlock_and_play("rain-ambient").await;
    println!("  unlocked: {unlocked}, playing: {}", engine.is_playing());
    println!("  transport: {:?}", engine.transport());

    println!("\nFading into 'Meditation' at 40%");
    engine.set_volume(0.4);
    engine
        .fade_in_play("meditation", Some(Duration::from_millis(600)))
        .await;
    println!("  volume: {:.2}", engine.volume());

    let output = host
        .output()
        .ok_or_else(|| anyhow::anyhow!("engine did not create a handle"))?;

    for _ in 0..3 {
        output.advance(Duration::from_secs(20));
        sleep(Duration::from_millis(10)).await;
        println!("  progress: {:.0}%", engine.progress() * 100.0);
    }

    println!("\nSeeking to 90%");
    engine.seek(0.9);
    println!("  progress: {:.0}%", engine.progress() * 100.0);

    println!("\nTrack ends");
    output.emit(MediaEvent::Ended);
    sleep(Duration::from_millis(10)).await;
    println!(
        "  playing: {}, progress: {:.0}%",
        engine.is_playing(),
        engine.progress() * 100.0
    );

    engine.shutdown();
    Ok(())
}
