//! Observable playback state.

use crate::catalog::Track;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-handle transport state.
///
/// `Idle → Loading → Playing → {Paused, Idle (on end), Failed}`. A failed
/// local primary moves back to `Loading` for the fallback at most once.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TransportState {
    #[default]
    Idle,
    Loading {
        source: String,
    },
    Playing,
    Paused,
    Failed {
        message: String,
    },
}

impl TransportState {
    pub fn is_loading(&self) -> bool {
        matches!(self, TransportState::Loading { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, TransportState::Failed { .. })
    }
}

/// Point-in-time copy of everything a UI renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    pub current_track: Option<Track>,
    pub playing: bool,
    pub muted: bool,
    /// `0.0..=1.0`
    pub volume: f32,
    /// Fraction of the current track already played, `0.0..=1.0`
    pub progress: f64,
    pub transport: TransportState,
}

impl PlaybackSnapshot {
    pub fn new(volume: f32, muted: bool) -> Self {
        Self {
            current_track: None,
            playing: false,
            muted,
            volume,
            progress: 0.0,
            transport: TransportState::Idle,
        }
    }

    pub fn current_track_id(&self) -> Option<&str> {
        self.current_track.as_ref().map(|track| track.id.as_str())
    }

    /// Whether something is playing or about to.
    pub fn is_active(&self) -> bool {
        self.current_track.is_some() && (self.playing || self.transport.is_loading())
    }
}

/// Played fraction of `duration`; zero while the duration is unknown.
pub fn progress_fraction(position: Duration, duration: Option<Duration>) -> f64 {
    match duration {
        Some(duration) if !duration.is_zero() => {
            (position.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0)
        }
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_fraction() {
        let minute = Some(Duration::from_secs(60));
        assert_eq!(progress_fraction(Duration::from_secs(15), minute), 0.25);
        assert_eq!(progress_fraction(Duration::from_secs(90), minute), 1.0);
        assert_eq!(progress_fraction(Duration::from_secs(15), None), 0.0);
        assert_eq!(
            progress_fraction(Duration::from_secs(15), Some(Duration::ZERO)),
            0.0
        );
    }

    #[test]
    fn test_snapshot_activity() {
        let mut snapshot = PlaybackSnapshot::new(0.7, false);
        assert!(!snapshot.is_active());
        assert_eq!(snapshot.current_track_id(), None);

        snapshot.current_track = Some(Track::new("x", "X", "/local/x.mp3"));
        snapshot.transport = TransportState::Loading {
            source: "/local/x.mp3".to_string(),
        };
        assert!(snapshot.is_active());
        assert_eq!(snapshot.current_track_id(), Some("x"));

        snapshot.transport = TransportState::Paused;
        assert!(!snapshot.is_active());
    }

    #[test]
    fn test_transport_serialization() {
        let json = serde_json::to_string(&TransportState::Loading {
            source: "/audio/rain.mp3".to_string(),
        })
        .unwrap();
        assert_eq!(json, r#"{"state":"loading","source":"/audio/rain.mp3"}"#);
    }
}
