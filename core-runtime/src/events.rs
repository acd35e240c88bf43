//! # Event Bus System
//!
//! Provides an event-driven surface for the audio engine using a broadcast
//! channel from `core_async::sync`. UI layers subscribe to learn when audio
//! unlocked, when a track actually started, when a fallback kicked in, or
//! when playback failed for good.
//!
//! ## Overview
//!
//! The event bus system consists of:
//! - **Event Types**: Strongly-typed enums for unlock and playback
//! - **EventBus**: Central broadcast channel for publishing events
//! - **EventStream**: Wrapper for consuming events with filtering
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     emit      ┌───────────┐
//! │ UnlockGate  ├──────────────>│           │     subscribe    ┌────────────┐
//! └─────────────┘               │ EventBus  ├─────────────────>│ UI / Host  │
//! ┌─────────────┐     emit      │ (broadcast│                  └────────────┘
//! │ AudioEngine ├──────────────>│  channel) │     subscribe    ┌────────────┐
//! └─────────────┘               │           ├─────────────────>│ Test probe │
//!                               └───────────┘                  └────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let event_bus = EventBus::new(100);
//! let mut subscriber = event_bus.subscribe();
//!
//! event_bus
//!     .emit(CoreEvent::Playback(PlaybackEvent::MuteChanged { muted: true }))
//!     .ok();
//!
//! let event = subscriber.recv().await.unwrap();
//! assert_eq!(event.description(), "Mute toggled");
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: Subscriber was too slow and missed `n` events.
//!   This is non-fatal; the subscriber can continue receiving new events.
//! - **`RecvError::Closed`**: All senders have been dropped (engine shut down).
//!
//! Emitting with no subscribers returns `Err(SendError)`; the engine treats
//! that as "nobody is listening" and ignores it.

use core_async::sync::broadcast;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use core_async::sync::broadcast::error::{RecvError, SendError};
pub use core_async::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum published through the event bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Audio unlock events
    Unlock(UnlockEvent),
    /// Playback events
    Playback(PlaybackEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Unlock(e) => e.description(),
            CoreEvent::Playback(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Unlock(UnlockEvent::Failed { .. }) => EventSeverity::Error,
            CoreEvent::Playback(PlaybackEvent::Error { .. }) => EventSeverity::Error,
            CoreEvent::Playback(PlaybackEvent::FallbackAttempted { .. }) => {
                EventSeverity::Warning
            }
            CoreEvent::Unlock(UnlockEvent::Unlocked { .. }) => EventSeverity::Info,
            CoreEvent::Playback(PlaybackEvent::Started { .. }) => EventSeverity::Info,
            CoreEvent::Playback(PlaybackEvent::Completed { .. }) => EventSeverity::Info,
            CoreEvent::Playback(PlaybackEvent::CatalogReloaded { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    /// Debug-level events (verbose)
    Debug,
    /// Informational events
    Info,
    /// Warning events
    Warning,
    /// Error events
    Error,
}

// ============================================================================
// Unlock Events
// ============================================================================

/// Events related to unlocking autoplay-restricted audio.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum UnlockEvent {
    /// Audio output is unlocked for the rest of the session.
    Unlocked {
        /// Whether an audio-processing context was resumed as part of it.
        resumed_context: bool,
    },
    /// The unlock procedure failed; a later gesture may retry.
    Failed {
        /// Human-readable error message.
        message: String,
    },
}

impl UnlockEvent {
    fn description(&self) -> &str {
        match self {
            UnlockEvent::Unlocked { .. } => "Audio unlocked",
            UnlockEvent::Failed { .. } => "Audio unlock failed",
        }
    }
}

// ============================================================================
// Playback Events
// ============================================================================

/// Events related to track playback.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum PlaybackEvent {
    /// The host confirmed that playback began.
    Started {
        /// The track ID.
        track_id: String,
        /// Source that actually played (primary or fallback).
        source: String,
    },
    /// Playback paused by the caller.
    Paused {
        /// The track ID.
        track_id: String,
    },
    /// Track played to its natural end.
    Completed {
        /// The track ID that completed.
        track_id: String,
    },
    /// The primary source failed and the fallback is being tried.
    FallbackAttempted {
        /// The track ID.
        track_id: String,
        /// Source that failed.
        failed_source: String,
        /// Source tried next.
        fallback_source: String,
    },
    /// Output volume changed.
    VolumeChanged {
        /// New volume, `0.0..=1.0`.
        volume: f32,
    },
    /// Mute toggled.
    MuteChanged {
        /// New mute state.
        muted: bool,
    },
    /// Playback position moved by a seek.
    Seeked {
        /// The track ID if a track is loaded.
        track_id: Option<String>,
        /// New position (milliseconds).
        position_ms: u64,
    },
    /// The track catalog was replaced.
    CatalogReloaded {
        /// Number of tracks now available.
        track_count: usize,
    },
    /// Playback error occurred.
    Error {
        /// The track ID if available.
        track_id: Option<String>,
        /// Human-readable error message.
        message: String,
        /// Whether retrying (another gesture, another track) may help.
        recoverable: bool,
    },
}

impl PlaybackEvent {
    fn description(&self) -> &str {
        match self {
            PlaybackEvent::Started { .. } => "Playback started",
            PlaybackEvent::Paused { .. } => "Playback paused",
            PlaybackEvent::Completed { .. } => "Track completed",
            PlaybackEvent::FallbackAttempted { .. } => "Trying fallback source",
            PlaybackEvent::VolumeChanged { .. } => "Volume changed",
            PlaybackEvent::MuteChanged { .. } => "Mute toggled",
            PlaybackEvent::Seeked { .. } => "Playback position changed",
            PlaybackEvent::CatalogReloaded { .. } => "Track catalog reloaded",
            PlaybackEvent::Error { .. } => "Playback error",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to events.
///
/// Cloning the bus yields another producer on the same channel; each
/// `subscribe()` creates an independent receiver. Slow subscribers get
/// `RecvError::Lagged` instead of blocking producers.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of events to buffer per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Creates a new event bus with the default buffer size.
    #[allow(clippy::should_implement_trait)]
    pub fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an
    /// error if there are no active subscribers.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    ///
    /// ```rust
    /// use core_runtime::events::EventBus;
    ///
    /// let event_bus = EventBus::new(100);
    /// assert_eq!(event_bus.subscriber_count(), 0);
    ///
    /// let _subscriber = event_bus.subscribe();
    /// assert_eq!(event_bus.subscriber_count(), 1);
    /// ```
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with optional filtering.
///
/// ```rust
/// use core_runtime::events::{CoreEvent, EventBus, EventSeverity, EventStream};
///
/// let event_bus = EventBus::new(100);
/// let problems = EventStream::new(event_bus.subscribe())
///     .filter(|event| event.severity() >= EventSeverity::Warning);
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    /// Creates a new event stream from a receiver.
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Adds a filter function to this stream.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Receives the next event that passes the filter (if any).
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n` events.
    /// Returns `RecvError::Closed` if all senders have been dropped.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;

            let Some(filter) = &self.filter else {
                return Ok(event);
            };

            if filter(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive an event without blocking.
    ///
    /// Returns `None` if no matching events are currently available.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    let Some(filter) = &self.filter else {
                        return Some(Ok(event));
                    };

                    if filter(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }

    /// Drains every event currently buffered that passes the filter.
    pub fn drain(&mut self) -> Vec<CoreEvent> {
        let mut events = Vec::new();
        while let Some(result) = self.try_recv() {
            match result {
                Ok(event) => events.push(event),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
        events
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn started(track_id: &str) -> CoreEvent {
        CoreEvent::Playback(PlaybackEvent::Started {
            track_id: track_id.to_string(),
            source: format!("/audio/{}.mp3", track_id),
        })
    }

    #[tokio::test]
    async fn test_event_bus_subscription() {
        let bus = EventBus::new(10);
        assert_eq!(bus.subscriber_count(), 0);
        let _sub1 = bus.subscribe();
        let _sub2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn test_event_emission_no_subscribers() {
        let bus = EventBus::new(10);
        assert!(bus.emit(started("rain-ambient")).is_err());
    }

    #[tokio::test]
    async fn test_multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(10);
        let mut sub1 = bus.subscribe();
        let mut sub2 = bus.subscribe();

        let event = CoreEvent::Unlock(UnlockEvent::Unlocked {
            resumed_context: true,
        });
        assert_eq!(bus.emit(event.clone()).unwrap(), 2);

        assert_eq!(sub1.recv().await.unwrap(), event);
        assert_eq!(sub2.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn test_event_stream_with_filter() {
        let bus = EventBus::new(10);
        let mut stream =
            EventStream::new(bus.subscribe()).filter(|event| matches!(event, CoreEvent::Unlock(_)));

        bus.emit(started("soft-piano")).ok();
        let failed = CoreEvent::Unlock(UnlockEvent::Failed {
            message: "play() rejected".to_string(),
        });
        bus.emit(failed.clone()).ok();

        assert_eq!(stream.recv().await.unwrap(), failed);
    }

    #[tokio::test]
    async fn test_lagged_subscriber() {
        let bus = EventBus::new(2);
        let mut sub = bus.subscribe();

        for i in 0..5 {
            bus.emit(CoreEvent::Playback(PlaybackEvent::VolumeChanged {
                volume: i as f32 / 10.0,
            }))
            .ok();
        }

        let result = sub.recv().await;
        assert!(matches!(result, Err(RecvError::Lagged(_))));
    }

    #[test]
    fn test_event_severity() {
        let error_event = CoreEvent::Playback(PlaybackEvent::Error {
            track_id: Some("meditation".to_string()),
            message: "network error".to_string(),
            recoverable: true,
        });
        assert_eq!(error_event.severity(), EventSeverity::Error);

        let fallback = CoreEvent::Playback(PlaybackEvent::FallbackAttempted {
            track_id: "rain-ambient".to_string(),
            failed_source: "/audio/rain.mp3".to_string(),
            fallback_source: "https://example.com/rain.ogg".to_string(),
        });
        assert_eq!(fallback.severity(), EventSeverity::Warning);

        assert_eq!(started("rain-ambient").severity(), EventSeverity::Info);

        let debug_event = CoreEvent::Playback(PlaybackEvent::Seeked {
            track_id: None,
            position_ms: 1000,
        });
        assert_eq!(debug_event.severity(), EventSeverity::Debug);
    }

    #[test]
    fn test_event_description() {
        let event = CoreEvent::Unlock(UnlockEvent::Unlocked {
            resumed_context: false,
        });
        assert_eq!(event.description(), "Audio unlocked");
        assert_eq!(started("x").description(), "Playback started");
    }

    #[test]
    fn test_event_serialization() {
        let event = CoreEvent::Playback(PlaybackEvent::CatalogReloaded { track_count: 6 });

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"Playback\""));
        assert!(json.contains("\"event\":\"CatalogReloaded\""));

        let deserialized: CoreEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, event);
    }

    #[tokio::test]
    async fn test_try_recv_and_drain() {
        let bus = EventBus::new(10);
        let mut stream = EventStream::new(bus.subscribe())
            .filter(|event| event.severity() >= EventSeverity::Info);

        assert!(stream.try_recv().is_none());

        bus.emit(CoreEvent::Playback(PlaybackEvent::MuteChanged { muted: true }))
            .ok();
        bus.emit(started("sleep-music")).ok();
        bus.emit(CoreEvent::Playback(PlaybackEvent::Completed {
            track_id: "sleep-music".to_string(),
        }))
        .ok();

        let events = stream.drain();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], started("sleep-music"));
        assert!(stream.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_publishers() {
        let bus = EventBus::new(100);
        let mut sub = bus.subscribe();

        let bus1 = bus.clone();
        let bus2 = bus.clone();

        let handle1 = tokio::spawn(async move {
            for i in 0..10 {
                bus1.emit(started(&format!("track-{}", i))).ok();
            }
        });

        let handle2 = tokio::spawn(async move {
            for i in 0..10 {
                bus2.emit(CoreEvent::Playback(PlaybackEvent::MuteChanged {
                    muted: i % 2 == 0,
                }))
                .ok();
            }
        });

        handle1.await.ok();
        handle2.await.ok();

        let mut count = 0;
        while sub.try_recv().is_ok() {
            count += 1;
        }
        assert_eq!(count, 20);
    }
}
