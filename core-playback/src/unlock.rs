//! # Unlock Gate
//!
//! Hosts with an autoplay policy refuse programmatic playback until media has
//! been started from within a user gesture. The gate performs that one-time
//! unlock: it resumes a suspended audio context (when the host has one) and
//! plays then pauses a silent placeholder on a throwaway handle.
//!
//! `unlocked` flips from `false` to `true` at most once per gate and never
//! reverts. Concurrent callers are serialized, so the procedure succeeds at
//! most once. The gate also keeps a single-slot mailbox for a track that
//! should start as soon as the unlock happens.

use crate::error::{PlaybackError, Result};
use bridge_traits::{AudioContextHost, MediaHandle, MediaHost};
use core_async::sync::Mutex as AsyncMutex;
use core_runtime::config::CoreConfig;
use core_runtime::events::{CoreEvent, EventBus, UnlockEvent};
use core_runtime::logging::display_source;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

pub struct UnlockGate {
    media_host: Arc<dyn MediaHost>,
    audio_context: Option<Arc<dyn AudioContextHost>>,
    placeholder_source: String,
    events: EventBus,
    unlocked: AtomicBool,
    procedure: AsyncMutex<()>,
    pending_track: Mutex<Option<String>>,
}

impl UnlockGate {
    pub fn new(
        media_host: Arc<dyn MediaHost>,
        audio_context: Option<Arc<dyn AudioContextHost>>,
        placeholder_source: impl Into<String>,
        events: EventBus,
    ) -> Self {
        Self {
            media_host,
            audio_context,
            placeholder_source: placeholder_source.into(),
            events,
            unlocked: AtomicBool::new(false),
            procedure: AsyncMutex::new(()),
            pending_track: Mutex::new(None),
        }
    }

    pub fn from_config(config: &CoreConfig, events: EventBus) -> Self {
        Self::new(
            Arc::clone(&config.media_host),
            config.audio_context.clone(),
            config.audio.placeholder_source.clone(),
            events,
        )
    }

    /// Unlock audio output. Must be called from within a user gesture.
    ///
    /// Returns `true` once audio is unlocked. After the first success every
    /// call returns `true` without touching the host again. A failure leaves
    /// the gate locked so the next gesture can retry.
    #[instrument(skip(self))]
    pub async fn unlock(&self) -> bool {
        if self.is_unlocked() {
            return true;
        }

        let _procedure = self.procedure.lock().await;
        if self.is_unlocked() {
            return true;
        }

        match self.run_procedure().await {
            Ok(resumed_context) => {
                self.unlocked.store(true, Ordering::SeqCst);
                info!(resumed_context, "Audio unlocked");
                self.events
                    .emit(CoreEvent::Unlock(UnlockEvent::Unlocked { resumed_context }))
                    .ok();
                true
            }
            Err(err) => {
                let err = PlaybackError::UnlockFailed(err.to_string());
                error!(error = %err, "Failed to unlock audio");
                self.events
                    .emit(CoreEvent::Unlock(UnlockEvent::Failed {
                        message: err.to_string(),
                    }))
                    .ok();
                false
            }
        }
    }

    async fn run_procedure(&self) -> Result<bool> {
        let mut resumed_context = false;
        if let Some(context) = &self.audio_context {
            if context.state().needs_resume() {
                debug!("Resuming suspended audio context");
                context.resume().await?;
                resumed_context = true;
            }
        }

        let handle = self.media_host.create_handle()?;
        let outcome = self.play_placeholder(handle.as_ref()).await;
        if let Err(err) = handle.release() {
            debug!(error = %err, "Failed to release unlock handle");
        }
        outcome?;

        Ok(resumed_context)
    }

    async fn play_placeholder(&self, handle: &dyn MediaHandle) -> Result<()> {
        debug!(
            handle = %handle.id(),
            source = %display_source(&self.placeholder_source),
            "Playing silent placeholder"
        );
        handle.set_volume(0.0)?;
        handle.set_source(&self.placeholder_source)?;
        handle.play().await?;
        handle.pause()?;
        Ok(())
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked.load(Ordering::SeqCst)
    }

    /// Whether the host supplied an audio-processing context.
    pub fn has_audio_context(&self) -> bool {
        self.audio_context.is_some()
    }

    /// Remember a track to start once unlocked. Replaces any earlier one.
    pub fn set_pending_track(&self, track_id: impl Into<String>) {
        *self.pending_track.lock() = Some(track_id.into());
    }

    /// Take the pending track, clearing the slot.
    pub fn take_pending_track(&self) -> Option<String> {
        self.pending_track.lock().take()
    }
}

impl fmt::Debug for UnlockGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnlockGate")
            .field("unlocked", &self.is_unlocked())
            .field("has_audio_context", &self.has_audio_context())
            .field("pending_track", &*self.pending_track.lock())
            .finish()
    }
}
