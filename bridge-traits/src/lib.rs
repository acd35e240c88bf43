//! # Host Bridge Traits
//!
//! Capability traits the host environment implements so the audio engine can
//! play sound without knowing whether it runs in a browser, a desktop shell or
//! a test harness.
//!
//! ## Traits
//!
//! ### Media
//! - [`MediaHost`](media::MediaHost) - Constructs playback handles
//! - [`MediaHandle`](media::MediaHandle) - One playable media instance: source,
//!   volume, mute, position, play/pause, progress and end-of-media events
//!
//! ### Audio processing
//! - [`AudioContextHost`](audio_context::AudioContextHost) - Optional audio
//!   context that may start suspended until a user gesture resumes it
//!
//! ### Utilities
//! - [`LoggerSink`](logging::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation | Status |
//! |----------|----------------|--------|
//! | Web      | `bridge-web` (`HTMLAudioElement`, Web Audio) | ✅ |
//! | Native   | Host supplied (tests use in-memory doubles)  | ✅ |
//!
//! ## Fail-Fast Strategy
//!
//! The core fails fast when a required capability is missing:
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//!
//! let config = CoreConfig::builder().build();
//! // Err(CapabilityMissing { capability: "MediaHost", .. })
//! ```
//!
//! The audio context is optional: when a host has none, the unlock procedure
//! skips the resume step.
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! should convert platform errors (a rejected `play()` promise, a media error
//! code) into the closest variant with an actionable message.
//!
//! ## Thread Safety
//!
//! On native targets every trait requires `Send + Sync`; on `wasm32` the
//! bounds are lifted because browser objects are single-threaded (see
//! [`platform`]).

pub mod audio_context;
pub mod error;
pub mod logging;
pub mod media;
pub mod platform;

pub use error::BridgeError;

// Re-export commonly used types
pub use audio_context::{AudioContextHost, AudioContextState};
pub use logging::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use media::{MediaEvent, MediaHandle, MediaHandleId, MediaHost, SourceKind};
pub use platform::{DynMediaEventStream, PlatformSendSync};
