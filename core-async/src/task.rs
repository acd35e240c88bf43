//! Task spawning abstractions.
//!
//! - On native platforms: `tokio::task::spawn`, may run on any worker thread
//! - On WASM: `wasm_bindgen_futures::spawn_local` on the browser event loop
//!
//! Callers that need to stop a spawned task wrap it in
//! [`futures::future::Abortable`]; that works identically on both targets, so
//! the spawn functions here do not hand back a join handle.
//!
//! # Examples
//!
//! ```rust
//! use core_async::task;
//!
//! async fn example() {
//!     task::spawn(async {
//!         // observe media events...
//!     });
//! }
//! ```

// ============================================================================
// Native Implementation (Tokio)
// ============================================================================

#[cfg(not(target_arch = "wasm32"))]
pub use tokio::task::yield_now;

#[cfg(not(target_arch = "wasm32"))]
/// Spawns a detached asynchronous task on the Tokio runtime.
///
/// # Panics
///
/// Panics when called outside of a Tokio runtime context.
pub fn spawn<F>(future: F)
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    tokio::task::spawn(future);
}

// ============================================================================
// WASM Implementation
// ============================================================================

#[cfg(target_arch = "wasm32")]
/// Spawns a detached asynchronous task on the browser event loop.
pub fn spawn<F>(future: F)
where
    F: std::future::Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(future);
}

#[cfg(target_arch = "wasm32")]
/// Yields execution back to the browser event loop once.
pub async fn yield_now() {
    crate::time::sleep(std::time::Duration::ZERO).await;
}
