//! Time-related abstractions.
//!
//! - On native platforms: `tokio::time`
//! - On WASM: `gloo-timers` (browser `setTimeout`)
//!
//! Only the operations the audio engine needs are exposed: sleeping between
//! fade steps, bounding an operation with a timeout and measuring elapsed
//! time.
//!
//! # Examples
//!
//! ```rust
//! use core_async::time::{sleep, Duration, Instant};
//!
//! async fn example() {
//!     let start = Instant::now();
//!     sleep(Duration::from_millis(20)).await;
//!     assert!(start.elapsed() >= Duration::from_millis(20));
//! }
//! ```

// ============================================================================
// Native Implementation (Tokio)
// ============================================================================

#[cfg(not(target_arch = "wasm32"))]
pub use tokio::time::{sleep, timeout, Instant};

#[cfg(not(target_arch = "wasm32"))]
pub use tokio::time::error::Elapsed as TimeoutError;

pub use std::time::Duration;

// ============================================================================
// WASM Implementation
// ============================================================================

#[cfg(target_arch = "wasm32")]
pub use web_instant::Instant;

#[cfg(target_arch = "wasm32")]
/// Sleeps for the specified duration using the browser's `setTimeout`.
pub async fn sleep(duration: Duration) {
    gloo_timers::future::sleep(duration).await
}

#[cfg(target_arch = "wasm32")]
/// Requires a future to complete before `duration` has elapsed.
pub async fn timeout<F>(duration: Duration, future: F) -> Result<F::Output, TimeoutError>
where
    F: std::future::Future,
{
    let sleep_fut = sleep(duration);

    futures::pin_mut!(future);
    futures::pin_mut!(sleep_fut);

    match futures::future::select(future, sleep_fut).await {
        futures::future::Either::Left((output, _)) => Ok(output),
        futures::future::Either::Right(_) => Err(TimeoutError),
    }
}

#[cfg(target_arch = "wasm32")]
/// Error returned when a timeout expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutError;

#[cfg(target_arch = "wasm32")]
impl std::fmt::Display for TimeoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "operation timed out")
    }
}

#[cfg(target_arch = "wasm32")]
impl std::error::Error for TimeoutError {}

#[cfg(target_arch = "wasm32")]
mod web_instant {
    use super::Duration;

    /// Monotonic instant backed by `Date.now()` on the browser.
    #[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
    pub struct Instant {
        millis: f64,
    }

    impl Instant {
        pub fn now() -> Self {
            Self {
                millis: js_now(),
            }
        }

        pub fn elapsed(&self) -> Duration {
            Duration::from_secs_f64(((js_now() - self.millis) / 1000.0).max(0.0))
        }
    }

    fn js_now() -> f64 {
        js_sys::Date::now()
    }
}

// ============================================================================
// Common Utilities
// ============================================================================

/// Splits `total` into `steps` equal intervals.
///
/// Returns `Duration::ZERO` when `steps` is zero.
///
/// ```rust
/// use core_async::time::{step_interval, Duration};
///
/// assert_eq!(step_interval(Duration::from_millis(600), 60), Duration::from_millis(10));
/// ```
pub fn step_interval(total: Duration, steps: u32) -> Duration {
    if steps == 0 {
        return Duration::ZERO;
    }
    total / steps
}
