//! Audio-processing context capability.
//!
//! Browsers create Web Audio contexts in a `suspended` state until a user
//! gesture resumes them. Hosts that have such a context expose it through
//! [`AudioContextHost`]; hosts without one simply do not provide the
//! capability and the unlock procedure skips this step.

use crate::{error::Result, platform::PlatformSendSync};
use serde::{Deserialize, Serialize};

/// Lifecycle state reported by an audio-processing context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioContextState {
    Suspended,
    Running,
    Closed,
}

impl AudioContextState {
    /// Returns `true` when the context needs a `resume()` before producing
    /// sound.
    pub fn needs_resume(&self) -> bool {
        matches!(self, AudioContextState::Suspended)
    }
}

/// Host audio-processing context (Web Audio `AudioContext` or equivalent).
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait AudioContextHost: PlatformSendSync {
    /// Current context state.
    fn state(&self) -> AudioContextState;

    /// Resume a suspended context. Must be called from within a user gesture
    /// on hosts that enforce autoplay policies.
    async fn resume(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_suspended_needs_resume() {
        assert!(AudioContextState::Suspended.needs_resume());
        assert!(!AudioContextState::Running.needs_resume());
        assert!(!AudioContextState::Closed.needs_resume());
    }
}
