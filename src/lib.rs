//! Workspace facade crate.
//!
//! Host applications depend on `healing-audio` to reach the audio engine, its
//! configuration and the host bridge traits through a single dependency. The
//! `web` feature additionally pulls in the browser bridge on `wasm32` targets.

pub use bridge_traits;
pub use core_playback;
pub use core_runtime;

#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub use bridge_web;

pub use core_playback::{AudioEngine, Track, TrackCatalog};
pub use core_runtime::config::{AudioSettings, CoreConfig};
