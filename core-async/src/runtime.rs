//! Blocking entry points over the underlying async executor.
//!
//! Native targets build a current-thread Tokio runtime per call; this is what
//! `#[core_async::test]` and `#[core_async::main]` expand to. WebAssembly
//! cannot block the browser thread, so only `spawn_local` is offered there.

// ============================================================================
// Native Implementation (Tokio)
// ============================================================================

#[cfg(not(target_arch = "wasm32"))]
pub use tokio::runtime::{Builder, Handle, Runtime};

/// Runs the provided future to completion on a current-thread runtime.
#[cfg(not(target_arch = "wasm32"))]
pub fn block_on<F>(future: F) -> F::Output
where
    F: std::future::Future,
{
    Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("core_async::runtime::block_on: failed to build Tokio runtime")
        .block_on(future)
}

/// Runs the provided future on a current-thread runtime whose clock starts
/// paused.
///
/// Timers auto-advance whenever the runtime is idle, so a two second fade
/// completes instantly while still observing every step in order.
#[cfg(all(not(target_arch = "wasm32"), feature = "test-util"))]
pub fn block_on_paused<F>(future: F) -> F::Output
where
    F: std::future::Future,
{
    Builder::new_current_thread()
        .enable_all()
        .start_paused(true)
        .build()
        .expect("core_async::runtime::block_on_paused: failed to build Tokio runtime")
        .block_on(future)
}

// ============================================================================
// WASM Implementation
// ============================================================================

#[cfg(target_arch = "wasm32")]
pub use wasm_bindgen_futures::spawn_local;
