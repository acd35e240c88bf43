//! Runtime-agnostic async abstraction layer for the healing audio engine.
//!
//! The engine runs in two very different hosts:
//! - Native platforms (desktop, tests, demos): Tokio runtime
//! - WebAssembly: the browser event loop via `wasm-bindgen-futures`
//!
//! Every other crate in the workspace depends on this crate instead of Tokio
//! so that timers, task spawning and synchronization look identical on both
//! targets.
//!
//! # Modules
//!
//! - `task`: fire-and-forget task spawning
//! - `time`: sleeping and durations (fade steps are driven from here)
//! - `sync`: async-aware synchronization primitives and channels
//! - `runtime`: blocking entry points used by tests and demos
//!
//! # Examples
//!
//! ```rust
//! use core_async::task;
//! use core_async::time::{sleep, Duration};
//!
//! async fn example() {
//!     task::spawn(async {
//!         sleep(Duration::from_millis(30)).await;
//!     });
//! }
//! ```

// Re-export the async entry-point/test macros so downstream crates never need
// direct Tokio dependencies.
pub use core_async_macros::{main, test};

#[cfg(target_arch = "wasm32")]
pub mod test_support {
    pub use wasm_bindgen_test::wasm_bindgen_test;
}

pub mod runtime;
pub mod sync;
pub mod task;
pub mod time;

pub use task::spawn;
pub use time::{sleep, Duration, Instant};
