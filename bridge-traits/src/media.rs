//! Media playback bridge traits.
//!
//! A host environment (a browser, a desktop shell, a test double) supplies a
//! [`MediaHost`] able to construct playable [`MediaHandle`]s. A handle is one
//! media instance: it holds a source, a volume, a mute flag and a position,
//! can be started and paused, and reports progress and end-of-media through an
//! event stream.
//!
//! The traits deliberately mirror what an `HTMLAudioElement` offers so that a
//! browser implementation is a thin wrapper, while native hosts can back them
//! with any audio stack.

use crate::{
    error::Result,
    platform::{DynMediaEventStream, PlatformSendSync},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Unique identifier of a media handle, used to scope logs and events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaHandleId(Uuid);

impl MediaHandleId {
    /// Generate a new handle identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Borrow the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for MediaHandleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MediaHandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Signals emitted by a media handle while it plays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MediaEvent {
    /// Playback position advanced (the `timeupdate` signal).
    TimeUpdate { position: Duration },
    /// Duration became known or changed (metadata loaded).
    DurationChange { duration: Duration },
    /// The media played to its natural end.
    Ended,
    /// The host reported a media error after playback had started.
    Error { message: String },
}

/// Classification of a media source location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    /// Bundled with the application (relative path, `file:`, `data:`, `blob:`).
    Local,
    /// Fetched over the network (`http://` or `https://`).
    Remote,
}

impl SourceKind {
    /// Classify a source URI.
    ///
    /// ```
    /// use bridge_traits::media::SourceKind;
    ///
    /// assert_eq!(SourceKind::of("/audio/rain.mp3"), SourceKind::Local);
    /// assert_eq!(SourceKind::of("https://cdn.example/rain.ogg"), SourceKind::Remote);
    /// ```
    pub fn of(uri: &str) -> Self {
        let uri = uri.trim_start();
        let scheme_end = uri.find("://");
        match scheme_end.map(|end| uri[..end].to_ascii_lowercase()) {
            Some(scheme) if scheme == "http" || scheme == "https" => SourceKind::Remote,
            _ => SourceKind::Local,
        }
    }

    /// Returns `true` for network sources.
    pub fn is_remote(&self) -> bool {
        matches!(self, SourceKind::Remote)
    }
}

/// Host capability that constructs playback handles.
pub trait MediaHost: PlatformSendSync {
    /// Construct a fresh handle with no source loaded.
    fn create_handle(&self) -> Result<Arc<dyn MediaHandle>>;
}

/// One playable media instance.
///
/// Setters are synchronous because hosts apply them immediately (an audio
/// element property write); only [`MediaHandle::play`] suspends, pending the
/// host's start-of-playback signal.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait MediaHandle: PlatformSendSync {
    /// Identifier of this handle.
    fn id(&self) -> MediaHandleId;

    /// Replace the source. Any playback of the previous source stops and the
    /// position resets to zero.
    fn set_source(&self, uri: &str) -> Result<()>;

    /// Currently assigned source, if any.
    fn source(&self) -> Option<String>;

    /// Set the output volume, normalized to `0.0..=1.0`.
    fn set_volume(&self, volume: f32) -> Result<()>;

    /// Current output volume.
    fn volume(&self) -> f32;

    /// Mute or unmute without touching the volume level.
    fn set_muted(&self, muted: bool) -> Result<()>;

    /// Move the playback position.
    fn set_position(&self, position: Duration) -> Result<()>;

    /// Current playback position.
    fn position(&self) -> Duration;

    /// Media duration, `None` until metadata is available.
    fn duration(&self) -> Option<Duration>;

    /// Start (or resume) playback. Resolves once the host confirms playback
    /// began, or fails if the host rejects it (unsupported format, network
    /// error, autoplay policy).
    async fn play(&self) -> Result<()>;

    /// Pause playback, keeping the position.
    fn pause(&self) -> Result<()>;

    /// Subscribe to progress and end-of-media signals.
    fn subscribe(&self) -> DynMediaEventStream;

    /// Release host resources and detach listeners. The handle must not be
    /// used afterwards.
    fn release(&self) -> Result<()> {
        Ok(())
    }
}
