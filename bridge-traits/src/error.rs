use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    /// The host refused to start media playback (autoplay policy, missing
    /// user gesture, superseded load).
    #[error("Playback rejected by host: {0}")]
    PlaybackRejected(String),

    /// The host could not fetch or decode the media source.
    #[error("Media source error: {0}")]
    MediaSource(String),
}

impl BridgeError {
    /// Returns `true` when the failure came from host media policy rather than
    /// from the media itself.
    pub fn is_policy_rejection(&self) -> bool {
        matches!(self, BridgeError::PlaybackRejected(_))
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
