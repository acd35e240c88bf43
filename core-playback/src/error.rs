//! # Playback Error Types
//!
//! Error types for unlock, catalog and playback operations.
//!
//! Public engine operations never return these to UI callers; they are
//! converted into state changes, `tracing` output and events. The catalog and
//! engine construction surface them directly.

use bridge_traits::BridgeError;
use thiserror::Error;

/// Errors that can occur during playback operations.
#[derive(Error, Debug)]
pub enum PlaybackError {
    // ========================================================================
    // Unlock Errors
    // ========================================================================
    /// The gesture-scoped unlock procedure was rejected by the host.
    #[error("Audio unlock failed: {0}")]
    UnlockFailed(String),

    // ========================================================================
    // Playback Errors
    // ========================================================================
    /// The host refused or failed to start a source.
    #[error("Failed to start {uri}: {message}")]
    StartFailed { uri: String, message: String },

    // ========================================================================
    // Catalog Errors
    // ========================================================================
    /// Track id is not in the catalog.
    #[error("Track not found: {0}")]
    TrackNotFound(String),

    /// Two tracks in one load share an id.
    #[error("Duplicate track id: {0}")]
    DuplicateTrack(String),

    /// A track record is unusable (empty id or source).
    #[error("Invalid track: {0}")]
    InvalidTrack(String),

    /// A serialized catalog could not be parsed.
    #[error("Invalid track catalog: {0}")]
    InvalidCatalog(String),

    // ========================================================================
    // Layer Errors
    // ========================================================================
    #[error("Host bridge error: {0}")]
    Bridge(#[from] BridgeError),

    #[error("Runtime error: {0}")]
    Runtime(#[from] core_runtime::Error),
}

impl PlaybackError {
    /// Returns `true` if this error came from the catalog rejecting data.
    pub fn is_catalog_error(&self) -> bool {
        matches!(
            self,
            PlaybackError::DuplicateTrack(_)
                | PlaybackError::InvalidTrack(_)
                | PlaybackError::InvalidCatalog(_)
        )
    }

    /// Returns `true` if a later user gesture may succeed where this failed.
    pub fn is_recoverable(&self) -> bool {
        match self {
            PlaybackError::UnlockFailed(_) | PlaybackError::StartFailed { .. } => true,
            PlaybackError::Bridge(err) => err.is_policy_rejection(),
            _ => false,
        }
    }
}

impl From<serde_json::Error> for PlaybackError {
    fn from(err: serde_json::Error) -> Self {
        PlaybackError::InvalidCatalog(err.to_string())
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
