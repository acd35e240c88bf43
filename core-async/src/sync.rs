//! Synchronization primitives.
//!
//! Tokio's `sync` module does not depend on the Tokio runtime, so the same
//! types are used on native and WASM targets. On WASM they simply never
//! contend because everything runs on the browser's single thread.
//!
//! # Examples
//!
//! ```rust
//! use core_async::sync::Mutex;
//!
//! async fn example() {
//!     let unlock_in_flight = Mutex::new(());
//!     let _guard = unlock_in_flight.lock().await;
//! }
//! ```

pub use tokio::sync::{
    broadcast, mpsc, oneshot, watch, Mutex, MutexGuard, Notify, RwLock, RwLockReadGuard,
    RwLockWriteGuard,
};
