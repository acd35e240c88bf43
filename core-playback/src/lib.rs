//! # Playback Module
//!
//! Ambient audio playback for the healing page.
//!
//! ## Overview
//!
//! This module handles:
//! - Unlocking audio output from within a user gesture ([`UnlockGate`])
//! - The track catalog and its fallback sources ([`TrackCatalog`])
//! - Starting tracks with a single fallback hop and reporting failures
//!   ([`AudioEngine`])
//! - Timed fade-in ramps ([`FadeController`])
//! - Mirroring progress and end-of-media into observable state
//!   ([`PlaybackSnapshot`])
//!
//! All host interaction goes through the `bridge-traits` media and audio
//! context capabilities, so the engine runs unchanged against a browser, a
//! native shell or an in-memory test host.

pub mod catalog;
pub mod engine;
pub mod error;
pub mod fade;
pub mod state;
pub mod unlock;

pub use catalog::{default_tracks, Track, TrackCatalog};
pub use engine::AudioEngine;
pub use error::{PlaybackError, Result};
pub use fade::{FadeController, FadeOutcome};
pub use state::{PlaybackSnapshot, TransportState};
pub use unlock::UnlockGate;
