//! Browser Bridge Implementations
//!
//! Implements the `bridge-traits` media capabilities on top of browser APIs
//! through `web-sys` and `wasm-bindgen`.
//!
//! # Platform Support
//!
//! This crate is designed exclusively for the `wasm32-unknown-unknown` target.
//! On native targets it compiles to an empty crate.
//!
//! # Implementations
//!
//! - `WebMediaHost` / `WebMediaHandle`: `HTMLAudioElement` playback
//! - `WebAudioContext`: Web Audio `AudioContext`, resumed during unlock
//!
//! # Examples
//!
//! ```ignore
//! use bridge_web::{WebAudioContext, WebMediaHost};
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .media_host(Arc::new(WebMediaHost::new()))
//!     .audio_context(Arc::new(WebAudioContext::new()?))
//!     .build()?;
//! ```

#![cfg(target_arch = "wasm32")]
#![warn(missing_docs)]

pub mod audio_context;
pub mod error;
pub mod media;

pub use audio_context::WebAudioContext;
pub use error::{WebError, WebResult};
pub use media::{WebMediaHandle, WebMediaHost};
