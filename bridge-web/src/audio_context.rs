//! Web Audio implementation of [`AudioContextHost`].

use crate::error::{js_message, WebError, WebResult};
use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result as BridgeResult},
    AudioContextHost, AudioContextState,
};
use tracing::debug;
use wasm_bindgen_futures::JsFuture;
use web_sys::AudioContext;

/// Wraps the page's `AudioContext`.
///
/// Browsers create it suspended until a user gesture calls `resume()`.
pub struct WebAudioContext {
    context: AudioContext,
}

impl WebAudioContext {
    /// Create a new `AudioContext`.
    pub fn new() -> WebResult<Self> {
        let context = AudioContext::new()
            .map_err(|err| WebError::NotAvailable(format!("AudioContext: {}", js_message(&err))))?;
        Ok(Self { context })
    }

    /// Wrap an existing context shared with other page code.
    pub fn from_context(context: AudioContext) -> Self {
        Self { context }
    }
}

#[async_trait(?Send)]
impl AudioContextHost for WebAudioContext {
    fn state(&self) -> AudioContextState {
        match self.context.state() {
            web_sys::AudioContextState::Suspended => AudioContextState::Suspended,
            web_sys::AudioContextState::Running => AudioContextState::Running,
            _ => AudioContextState::Closed,
        }
    }

    async fn resume(&self) -> BridgeResult<()> {
        let promise = self
            .context
            .resume()
            .map_err(|err| BridgeError::PlaybackRejected(js_message(&err)))?;
        JsFuture::from(promise)
            .await
            .map_err(|err| BridgeError::PlaybackRejected(js_message(&err)))?;

        debug!("Audio context resumed");
        Ok(())
    }
}
