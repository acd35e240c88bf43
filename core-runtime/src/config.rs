//! # Core Configuration Module
//!
//! Provides configuration management for the healing audio engine.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance that holds the host capabilities and the audio settings the engine
//! needs. It enforces fail-fast validation so that a missing capability is
//! reported at construction time instead of on the first `play()`.
//!
//! ## Required Dependencies
//!
//! - `MediaHost` - Constructs the playback handle (an `HTMLAudioElement` on
//!   the web)
//!
//! ## Optional Dependencies
//!
//! - `AudioContextHost` - Web Audio context resumed during unlock; when absent
//!   the unlock procedure skips the resume step
//! - `LoggerSink` - Mirrors engine logs into the host logging pipeline
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{AudioSettings, CoreConfig};
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .media_host(Arc::new(MyMediaHost))
//!     .audio_context(Arc::new(MyAudioContext))
//!     .audio(AudioSettings::default().with_default_volume(0.5))
//!     .build()?;
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::CoreConfig;
//!
//! // Panics with an actionable "Capability missing: MediaHost" message
//! let config = CoreConfig::builder()
//!     .build()
//!     .expect("Should fail - missing media host");
//! ```

use crate::error::{Error, Result};
use crate::logging::LoggingConfig;
use bridge_traits::{AudioContextHost, LoggerSink, MediaHost};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Inline 8-sample silent WAV used to satisfy autoplay policies without a
/// network fetch.
pub const SILENT_PLACEHOLDER_SOURCE: &str =
    "data:audio/wav;base64,UklGRiwAAABXQVZFZm10IBAAAAABAAEAQB8AAEAfAAABAAgAZGF0YQgAAACAgICAgICAgA==";

pub const DEFAULT_VOLUME: f32 = 0.7;
pub const DEFAULT_FADE_DURATION_MS: u64 = 2000;
pub const DEFAULT_FADE_STEPS: u32 = 60;
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

/// Core configuration for the healing audio engine.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Constructs playback handles (required)
    pub media_host: Arc<dyn MediaHost>,

    /// Audio-processing context resumed during unlock (optional)
    pub audio_context: Option<Arc<dyn AudioContextHost>>,

    /// Host logging pipeline (optional); installed through
    /// [`CoreConfig::logging_config`]
    pub logger_sink: Option<Arc<dyn LoggerSink>>,

    /// Engine tuning
    pub audio: AudioSettings,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("media_host", &"MediaHost { ... }")
            .field(
                "audio_context",
                &self
                    .audio_context
                    .as_ref()
                    .map(|_| "AudioContextHost { ... }"),
            )
            .field(
                "logger_sink",
                &self.logger_sink.as_ref().map(|_| "LoggerSink { ... }"),
            )
            .field("audio", &self.audio)
            .finish()
    }
}

/// Tunable audio behaviour.
///
/// Every field has a serde default so a partial JSON/TOML document from the
/// host fills in the rest:
///
/// ```
/// use core_runtime::config::AudioSettings;
///
/// let settings: AudioSettings = serde_json::from_str(r#"{ "default_volume": 0.4 }"#).unwrap();
/// assert_eq!(settings.default_volume, 0.4);
/// assert_eq!(settings.fade_steps, 60);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Initial engine volume and fade-in target, `0.0..=1.0`
    pub default_volume: f32,

    /// Default fade-in length in milliseconds
    pub fade_duration_ms: u64,

    /// Number of volume steps in a fade-in
    pub fade_steps: u32,

    /// Capacity of the event broadcast channel
    pub event_buffer_size: usize,

    /// Silent source played during unlock
    pub placeholder_source: String,

    /// Whether the engine starts muted
    pub start_muted: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            default_volume: DEFAULT_VOLUME,
            fade_duration_ms: DEFAULT_FADE_DURATION_MS,
            fade_steps: DEFAULT_FADE_STEPS,
            event_buffer_size: DEFAULT_EVENT_BUFFER_SIZE,
            placeholder_source: SILENT_PLACEHOLDER_SOURCE.to_string(),
            start_muted: false,
        }
    }
}

impl AudioSettings {
    pub fn with_default_volume(mut self, volume: f32) -> Self {
        self.default_volume = volume;
        self
    }

    pub fn with_fade_duration(mut self, duration: Duration) -> Self {
        self.fade_duration_ms = duration.as_millis() as u64;
        self
    }

    pub fn with_fade_steps(mut self, steps: u32) -> Self {
        self.fade_steps = steps;
        self
    }

    pub fn with_event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = size;
        self
    }

    pub fn with_placeholder_source(mut self, source: impl Into<String>) -> Self {
        self.placeholder_source = source.into();
        self
    }

    pub fn with_start_muted(mut self, muted: bool) -> Self {
        self.start_muted = muted;
        self
    }

    /// Default fade-in length as a [`Duration`].
    pub fn fade_duration(&self) -> Duration {
        Duration::from_millis(self.fade_duration_ms)
    }

    /// Validates the settings
    pub fn validate(&self) -> Result<()> {
        if !self.default_volume.is_finite() || !(0.0..=1.0).contains(&self.default_volume) {
            return Err(Error::Config(format!(
                "Default volume must be within 0.0..=1.0, got {}",
                self.default_volume
            )));
        }

        if self.fade_steps == 0 {
            return Err(Error::Config(
                "Fade steps must be greater than 0".to_string(),
            ));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        if self.placeholder_source.trim().is_empty() {
            return Err(Error::Config(
                "Placeholder source cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        self.audio.validate()
    }

    /// Returns `true` when the host supplied an audio-processing context.
    pub fn has_audio_context(&self) -> bool {
        self.audio_context.is_some()
    }

    /// Logging configuration that mirrors engine logs into the host's
    /// [`LoggerSink`], when one was supplied.
    ///
    /// ```ignore
    /// init_logging(config.logging_config().with_format(LogFormat::Compact))?;
    /// ```
    pub fn logging_config(&self) -> LoggingConfig {
        match &self.logger_sink {
            Some(sink) => LoggingConfig::default().with_logger_sink(Arc::clone(sink)),
            None => LoggingConfig::default(),
        }
    }
}

fn media_host_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "MediaHost".to_string(),
        message: "MediaHost implementation is required to construct playback handles. \
                 Web: enable the 'web' feature and inject bridge_web::WebMediaHost. \
                 Native/tests: inject a host-specific or in-memory MediaHost."
            .to_string(),
    }
}

/// Builder for constructing [`CoreConfig`] instances.
#[derive(Default)]
pub struct CoreConfigBuilder {
    media_host: Option<Arc<dyn MediaHost>>,
    audio_context: Option<Arc<dyn AudioContextHost>>,
    logger_sink: Option<Arc<dyn LoggerSink>>,
    audio: Option<AudioSettings>,
}

impl CoreConfigBuilder {
    /// Sets the media host implementation (required).
    pub fn media_host(mut self, host: Arc<dyn MediaHost>) -> Self {
        self.media_host = Some(host);
        self
    }

    /// Sets the audio-processing context (optional).
    ///
    /// Hosts whose audio output starts suspended until a user gesture (Web
    /// Audio) should provide it so the unlock procedure can resume it.
    pub fn audio_context(mut self, context: Arc<dyn AudioContextHost>) -> Self {
        self.audio_context = Some(context);
        self
    }

    /// Sets the logger sink used to mirror logs into the host (optional).
    pub fn logger_sink(mut self, sink: Arc<dyn LoggerSink>) -> Self {
        self.logger_sink = Some(sink);
        self
    }

    /// Sets all audio settings at once.
    pub fn audio(mut self, settings: AudioSettings) -> Self {
        self.audio = Some(settings);
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// # Errors
    ///
    /// - [`Error::CapabilityMissing`] when no `MediaHost` was provided
    /// - [`Error::Config`] when the audio settings are out of range
    pub fn build(self) -> Result<CoreConfig> {
        let media_host = self.media_host.ok_or_else(media_host_missing_error)?;

        let config = CoreConfig {
            media_host,
            audio_context: self.audio_context,
            logger_sink: self.logger_sink,
            audio: self.audio.unwrap_or_default(),
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::{AudioContextState, BridgeError, ConsoleLogger, MediaHandle};

    struct MockMediaHost;

    impl MediaHost for MockMediaHost {
        fn create_handle(&self) -> BridgeResult<Arc<dyn MediaHandle>> {
            Err(BridgeError::NotAvailable("test host".to_string()))
        }
    }

    struct MockAudioContext;

    #[async_trait]
    impl AudioContextHost for MockAudioContext {
        fn state(&self) -> AudioContextState {
            AudioContextState::Running
        }

        async fn resume(&self) -> BridgeResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_builder_requires_media_host() {
        let err = CoreConfig::builder().build().unwrap_err();
        assert!(err.is_capability_missing());
        assert!(err.to_string().contains("MediaHost"));
    }

    #[test]
    fn test_builder_with_defaults() {
        let config = CoreConfig::builder()
            .media_host(Arc::new(MockMediaHost))
            .build()
            .unwrap();

        assert!(!config.has_audio_context());
        assert!(config.logger_sink.is_none());
        assert_eq!(config.audio, AudioSettings::default());
        assert_eq!(config.audio.default_volume, 0.7);
        assert_eq!(config.audio.fade_duration(), Duration::from_millis(2000));
        assert_eq!(config.audio.fade_steps, 60);
    }

    #[test]
    fn test_builder_with_audio_context() {
        let config = CoreConfig::builder()
            .media_host(Arc::new(MockMediaHost))
            .audio_context(Arc::new(MockAudioContext))
            .build()
            .unwrap();

        assert!(config.has_audio_context());
    }

    #[test]
    fn test_logging_config_carries_logger_sink() {
        let without = CoreConfig::builder()
            .media_host(Arc::new(MockMediaHost))
            .build()
            .unwrap();
        assert!(without.logging_config().logger_sink.is_none());

        let sink: Arc<dyn LoggerSink> = Arc::new(ConsoleLogger::default());
        let with = CoreConfig::builder()
            .media_host(Arc::new(MockMediaHost))
            .logger_sink(Arc::clone(&sink))
            .build()
            .unwrap();

        let logging = with.logging_config();
        let installed = logging.logger_sink.expect("sink forwarded");
        assert!(Arc::ptr_eq(&installed, &sink));
    }

    #[test]
    fn test_builder_rejects_invalid_settings() {
        let result = CoreConfig::builder()
            .media_host(Arc::new(MockMediaHost))
            .audio(AudioSettings::default().with_default_volume(1.5))
            .build();

        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_settings_validation() {
        assert!(AudioSettings::default().validate().is_ok());
        assert!(AudioSettings::default()
            .with_default_volume(f32::NAN)
            .validate()
            .is_err());
        assert!(AudioSettings::default()
            .with_fade_steps(0)
            .validate()
            .is_err());
        assert!(AudioSettings::default()
            .with_event_buffer_size(0)
            .validate()
            .is_err());
        assert!(AudioSettings::default()
            .with_placeholder_source("  ")
            .validate()
            .is_err());
    }

    #[test]
    fn test_settings_builder_methods() {
        let settings = AudioSettings::default()
            .with_default_volume(0.4)
            .with_fade_duration(Duration::from_millis(500))
            .with_fade_steps(10)
            .with_start_muted(true);

        assert_eq!(settings.default_volume, 0.4);
        assert_eq!(settings.fade_duration_ms, 500);
        assert_eq!(settings.fade_steps, 10);
        assert!(settings.start_muted);
    }

    #[test]
    fn test_settings_partial_deserialization() {
        let settings: AudioSettings =
            serde_json::from_str(r#"{ "fade_duration_ms": 1000, "start_muted": true }"#).unwrap();

        assert_eq!(settings.fade_duration_ms, 1000);
        assert!(settings.start_muted);
        assert_eq!(settings.default_volume, DEFAULT_VOLUME);
        assert_eq!(settings.placeholder_source, SILENT_PLACEHOLDER_SOURCE);
    }

    #[test]
    fn test_debug_hides_capabilities() {
        let config = CoreConfig::builder()
            .media_host(Arc::new(MockMediaHost))
            .build()
            .unwrap();

        let debug = format!("{:?}", config);
        assert!(debug.contains("MediaHost { ... }"));
        assert!(debug.contains("default_volume"));
    }
}
