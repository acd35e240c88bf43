//! Platform-specific helper abstractions used to keep trait bounds aligned with
//! the threading guarantees of each target.
//!
//! Native targets require `Send + Sync` so the engine can be shared across
//! async tasks. WebAssembly builds run entirely on the browser thread and
//! cannot satisfy those bounds because `web_sys` objects (audio elements,
//! audio contexts) are not thread-safe. The helper traits below make the
//! bounds conditional without duplicating every trait definition.

use crate::media::MediaEvent;
use futures::Stream;
use std::pin::Pin;

/// Marker trait that applies `Send + Sync` on native targets while becoming a
/// no-op on `wasm32`.
#[cfg(not(target_arch = "wasm32"))]
pub trait PlatformSendSync: Send + Sync {}

#[cfg(not(target_arch = "wasm32"))]
impl<T> PlatformSendSync for T where T: Send + Sync {}

#[cfg(target_arch = "wasm32")]
pub trait PlatformSendSync {}

#[cfg(target_arch = "wasm32")]
impl<T> PlatformSendSync for T {}

/// Stream of media events that enforces `Send` when available.
#[cfg(not(target_arch = "wasm32"))]
pub type DynMediaEventStream = Pin<Box<dyn Stream<Item = MediaEvent> + Send>>;

#[cfg(target_arch = "wasm32")]
pub type DynMediaEventStream = Pin<Box<dyn Stream<Item = MediaEvent>>>;
